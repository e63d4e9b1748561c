use eyre::Result;
use log::info;

use casino_session::domain::amount::Amount;
use casino_session::domain::auth::RegisterRequest;
use casino_session::domain::state::ServiceEvent;
use casino_session::service::notify::next_event;
use casino_session::{Api, Config};

const DEMO_BET: Amount = Amount::from_units(5);

#[tokio::main]
async fn main() -> Result<()> {
    // setup log
    env_logger::init();
    let config = Config::from_env()?;
    info!("demo starts with {:?}", config);

    let api = Api::from_config(&config)?;
    let mut receiver = api.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(event) = next_event(&mut receiver).await {
            match event.data {
                ServiceEvent::Notice(notice) => {
                    println!("[{}] {}", notice.severity.as_ref(), notice.message)
                }
                ServiceEvent::Loading(Some(text)) => println!("... {text}"),
                ServiceEvent::Loading(None) => {}
                ServiceEvent::SessionChanged(Some(user)) => {
                    println!("{} | balance {}", user.username, user.balance)
                }
                ServiceEvent::SessionChanged(None) => println!("signed out"),
                ServiceEvent::RoundSettled(outcome) => println!(
                    "{}: bet {} -> payout {} ({:?})",
                    outcome.game_id, outcome.bet, outcome.payout, outcome.detail
                ),
            }
        }
    });

    for game in api.games() {
        println!(
            "{:<10} {:>6} - {:<8} {}",
            game.display_name,
            game.min_bet.to_string(),
            game.max_bet.to_string(),
            if game.is_demo() { "demo" } else { "sign-in" }
        );
    }

    if api.restore().await?.is_none() {
        api.register(RegisterRequest::new("player@example.com", "secret", "secret"))
            .await?;
    }

    api.load_game("slots").await?;
    for _ in 0..3 {
        // a rejected bet has already been reported
        if api.place_bet(DEMO_BET).await.is_ok() {
            api.settle().await?;
        }
    }

    api.load_game("crash").await?;
    if api.place_bet(DEMO_BET).await.is_ok() {
        api.settle().await?;
    }

    api.drift_balance().await?;
    api.logout().await?;

    drop(api);
    printer.await?;
    Ok(())
}
