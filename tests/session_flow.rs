use casino_session::domain::amount::Amount;
use casino_session::domain::auth::RegisterRequest;
use casino_session::domain::state::{ServiceEvent, Severity};
use casino_session::repository::sessions::{TOKEN_KEY, USER_KEY};
use casino_session::repository::store::{FileStore, KeyValueStore};
use casino_session::{Api, Config, Error};
use eyre::Result;

fn config(seed: u64) -> Config {
    let mut config = Config::instant();
    config.rng_seed = Some(seed);
    config
}

#[tokio::test]
async fn test_login_bet_settle_moves_balance_once() -> Result<()> {
    let api = Api::from_config(&config(21))?;
    let user = api.login("a@b.com", "secret").await?;
    assert_eq!(Amount::from_units(100), user.balance);

    let round = api.load_game("slots").await?;
    let min_bet = api.round_engine.catalog.get(round.game_id())?.min_bet;
    api.place_bet(min_bet).await?;
    let outcome = api.settle().await?;

    let balance = api.current_user().await.map(|user| user.balance);
    assert_eq!(Some(Amount::from_units(100) + outcome.balance_delta), balance);
    if outcome.win {
        assert_eq!(outcome.payout - min_bet, outcome.balance_delta);
    } else {
        assert_eq!(-min_bet, outcome.balance_delta);
    }

    let err = api.settle().await.unwrap_err();
    assert_eq!(Some(&Error::AlreadySettled), err.downcast_ref::<Error>());
    assert_eq!(balance, api.current_user().await.map(|user| user.balance));
    Ok(())
}

#[tokio::test]
async fn test_session_survives_restart_with_file_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = config(4);
    config.store_path = Some(dir.path().join("session.json"));

    let api = Api::from_config(&config)?;
    let registered = api
        .register(RegisterRequest::new("r@b.com", "secret", "secret").with_username("Rita"))
        .await?;
    api.load_game("roulette").await?;
    api.place_bet(Amount::from_units(5)).await?;
    api.settle().await?;
    let before_restart = api.current_user().await;

    let restarted = Api::from_config(&config)?;
    let restored = restarted.restore().await?;
    assert_eq!(before_restart, restored);
    assert_eq!(Some(registered.id), restored.map(|user| user.id));

    restarted.logout().await?;
    let store = FileStore::new(dir.path().join("session.json"));
    assert_eq!(None, store.get(TOKEN_KEY)?);
    assert_eq!(None, store.get(USER_KEY)?);
    assert_eq!(None, restarted.current_user().await);
    Ok(())
}

#[tokio::test]
async fn test_insufficient_funds_is_reported() -> Result<()> {
    let api = Api::from_config(&config(8))?;
    let mut receiver = api.subscribe();
    api.login("a@b.com", "secret").await?;
    api.load_game("poker").await?;
    let err = api.place_bet(Amount::from_units(500)).await.unwrap_err();
    assert_eq!(Some(&Error::InsufficientFunds), err.downcast_ref::<Error>());

    let mut saw_notice = false;
    while let Ok(event) = receiver.try_recv() {
        if let ServiceEvent::Notice(notice) = event.data {
            if notice.message == "Insufficient funds" {
                assert_eq!(Severity::Error, notice.severity);
                saw_notice = true;
            }
        }
    }
    assert!(saw_notice);
    Ok(())
}
