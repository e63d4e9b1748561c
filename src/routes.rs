use std::future::Future;
use std::sync::Arc;

use eyre::{ContextCompat, Report, Result};
use log::error;
use tokio::sync::{broadcast, Mutex};

use crate::config::Config;
use crate::domain::amount::Amount;
use crate::domain::auth::{LoginRequest, RegisterRequest};
use crate::domain::dice::Dice;
use crate::domain::game::GameDefinition;
use crate::domain::round::{RoundOutcome, RoundState};
use crate::domain::state::{Notification, ServiceEvent, Severity, Timestamped};
use crate::domain::user::UserProfile;
use crate::error::Error;
use crate::repository::games::GameCatalog;
use crate::repository::sessions::SessionRepository;
use crate::repository::store::{FileStore, KeyValueStore, MemoryStore};
use crate::service::auth::SessionService;
use crate::service::game::RoundEngine;
use crate::service::notify::Notifier;

/// Entry point for the presentation layer. Holds the round currently on screen.
#[derive(Clone)]
pub struct Api {
    pub session_service: SessionService,
    pub round_engine: RoundEngine,
    pub notifier: Notifier,
    round: Arc<Mutex<Option<RoundState>>>,
}

impl Api {
    pub fn new(
        session_service: SessionService,
        round_engine: RoundEngine,
        notifier: Notifier,
    ) -> Self {
        Api {
            session_service,
            round_engine,
            notifier,
            round: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.store_path {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };
        let dice = Dice::new(config.rng_seed);
        let session_service = SessionService::new(
            Arc::new(SessionRepository::new(store)),
            config,
            dice.clone(),
        );
        let round_engine = RoundEngine::new(
            Arc::new(GameCatalog::standard()?),
            session_service.clone(),
            config,
            dice,
        );
        Ok(Self::new(session_service, round_engine, Notifier::new()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Timestamped<ServiceEvent>> {
        self.notifier.subscribe()
    }

    pub fn games(&self) -> Vec<GameDefinition> {
        self.round_engine.catalog.list().to_vec()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.session_service.current_user().await
    }

    pub async fn current_round(&self) -> Option<RoundState> {
        self.round.lock().await.clone()
    }

    pub async fn restore(&self) -> Result<Option<UserProfile>> {
        let restored = self
            .loading("Checking session...", self.session_service.restore())
            .await
            .map_err(|e| self.report(e))?;
        let user = restored.map(|session| session.user);
        self.notifier.emit(ServiceEvent::SessionChanged(user.clone()));
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let session = self
            .loading(
                "Signing in...",
                self.session_service.login(LoginRequest::new(email, password)),
            )
            .await
            .map_err(|e| self.report(e))?;
        self.session_changed(Some(session.user.clone()));
        self.notifier.notify(Notification::success("Signed in"));
        Ok(session.user)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile> {
        let session = self
            .loading("Registering...", self.session_service.register(request))
            .await
            .map_err(|e| self.report(e))?;
        self.session_changed(Some(session.user.clone()));
        self.notifier
            .notify(Notification::success("Registration complete. Welcome!"));
        Ok(session.user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session_service
            .logout()
            .await
            .map_err(|e| self.report(e))?;
        self.session_changed(None);
        self.notifier.notify(Notification::info("Signed out"));
        Ok(())
    }

    /// Replaces the current round only when loading succeeds.
    pub async fn load_game(&self, game_id: &str) -> Result<RoundState> {
        let display_name = self
            .round_engine
            .catalog
            .get(game_id)
            .map(|game| game.display_name.clone())
            .map_err(|e| self.report(e))?;
        let round = self
            .loading(
                &format!("Loading {display_name}..."),
                self.round_engine.load_game(game_id),
            )
            .await
            .map_err(|e| self.report(e))?;
        *self.round.lock().await = Some(round.clone());
        self.notifier
            .notify(Notification::success(format!("{display_name} loaded!")));
        Ok(round)
    }

    /// Bets on the current round; a settled round is followed by a fresh one of the same game.
    pub async fn place_bet(&self, amount: Amount) -> Result<RoundState> {
        let mut current = self.round.lock().await;
        let result = async {
            let round = current.as_ref().wrap_err(Error::GameNotLoaded)?;
            let base = if round.is_settled() {
                RoundState::new(round.game_id())
            } else {
                round.clone()
            };
            self.round_engine.place_bet(&base, amount).await
        }
        .await;
        let round = result.map_err(|e| self.report(e))?;
        *current = Some(round.clone());
        Ok(round)
    }

    pub async fn settle(&self) -> Result<RoundOutcome> {
        let mut current = self.round.lock().await;
        let result = match current.as_mut() {
            Some(round) => self.round_engine.settle(round).await,
            None => Err(Report::new(Error::GameNotLoaded)),
        };
        let outcome = result.map_err(|e| self.report(e))?;
        drop(current);

        self.notifier.emit(ServiceEvent::RoundSettled(outcome.clone()));
        if let Some(user) = self.session_service.current_user().await {
            self.session_changed(Some(user));
        }
        let notice = if outcome.win {
            Notification::success(format!(
                "You won {} ({})",
                outcome.payout, outcome.multiplier
            ))
        } else {
            Notification::info(format!("No luck this time, lost {}", outcome.bet))
        };
        self.notifier.notify(notice);
        Ok(outcome)
    }

    pub async fn drift_balance(&self) -> Result<UserProfile> {
        let user = self
            .session_service
            .drift_balance()
            .await
            .map_err(|e| self.report(e))?;
        self.session_changed(Some(user.clone()));
        Ok(user)
    }

    async fn loading<T>(&self, text: &str, operation: impl Future<Output = T>) -> T {
        self.notifier.emit(ServiceEvent::Loading(Some(text.to_string())));
        let result = operation.await;
        self.notifier.emit(ServiceEvent::Loading(None));
        result
    }

    fn session_changed(&self, user: Option<UserProfile>) {
        self.notifier.emit(ServiceEvent::SessionChanged(user));
    }

    /// Tells the user about a failure and hands the report back to the caller.
    fn report(&self, e: Report) -> Report {
        let notification = match e.downcast_ref::<Error>() {
            Some(error) => error.clone().into_notification(),
            None => {
                error!("Error occurred: {:?}", e);
                Notification::new("Something went wrong", Severity::Error)
            }
        };
        self.notifier.notify(notification);
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn api() -> Result<Api> {
        let mut config = Config::instant();
        config.rng_seed = Some(3);
        Api::from_config(&config)
    }

    fn drain(receiver: &mut broadcast::Receiver<Timestamped<ServiceEvent>>) -> Vec<ServiceEvent> {
        let mut events = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(event) => events.push(event.data),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        events
    }

    fn notices(events: &[ServiceEvent]) -> Vec<Notification> {
        events
            .iter()
            .filter_map(|event| match event {
                ServiceEvent::Notice(notification) => Some(notification.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_login_events() -> Result<()> {
        let api = api()?;
        let mut receiver = api.subscribe();
        let user = api.login("a@b.com", "secret").await?;
        let events = drain(&mut receiver);
        assert_eq!(
            vec![
                ServiceEvent::Loading(Some("Signing in...".to_string())),
                ServiceEvent::Loading(None),
                ServiceEvent::SessionChanged(Some(user)),
                ServiceEvent::Notice(Notification::success("Signed in")),
            ],
            events
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failures_become_notices() -> Result<()> {
        let api = api()?;
        let mut receiver = api.subscribe();
        assert!(api.login("nope", "secret").await.is_err());
        assert!(api.load_game("poker").await.is_err());
        assert!(api.place_bet(Amount::from_units(1)).await.is_err());
        assert!(api.settle().await.is_err());
        let notices = notices(&drain(&mut receiver));
        assert_eq!(
            vec![
                Notification::new("Enter a valid email", Severity::Error),
                Notification::new("This game requires you to sign in", Severity::Warning),
                Notification::new("No game loaded", Severity::Warning),
                Notification::new("No game loaded", Severity::Warning),
            ],
            notices
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_load_keeps_current_round() -> Result<()> {
        let api = api()?;
        let round = api.load_game("slots").await?;
        assert!(api.load_game("blackjack").await.is_err());
        assert_eq!(Some(round), api.current_round().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_play_again_after_settlement() -> Result<()> {
        let api = api()?;
        api.login("a@b.com", "secret").await?;
        api.load_game("roulette").await?;
        api.place_bet(Amount::from_units(5)).await?;
        let first = api.settle().await?;
        let settled = api.current_round().await.unwrap();
        assert_eq!(Some(&first), settled.outcome());

        let next = api.place_bet(Amount::from_units(5)).await?;
        assert_ne!(settled.id(), next.id());
        assert_eq!("roulette", next.game_id());
        assert!(!next.is_settled());
        api.settle().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_settle_twice_fails() -> Result<()> {
        let api = api()?;
        api.login("a@b.com", "secret").await?;
        api.load_game("slots").await?;
        api.place_bet(Amount::from_units(1)).await?;
        api.settle().await?;
        let balance = api.current_user().await.map(|user| user.balance);
        let err = api.settle().await.unwrap_err();
        assert_eq!(Some(&Error::AlreadySettled), err.downcast_ref::<Error>());
        assert_eq!(balance, api.current_user().await.map(|user| user.balance));
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_clears_user() -> Result<()> {
        let api = api()?;
        api.register(RegisterRequest::new("r@b.com", "secret", "secret")).await?;
        api.logout().await?;
        assert_eq!(None, api.current_user().await);
        Ok(())
    }
}
