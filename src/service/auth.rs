use std::sync::Arc;

use eyre::{ensure, ContextCompat, Result};
use log::{debug, info, warn};
use tap::TapFallible;
use tokio::sync::RwLock;
use tokio::time::sleep;
use validator::Validate;

use crate::config::{Config, Latency};
use crate::domain::amount::Amount;
use crate::domain::auth::{validation_error, LoginRequest, RegisterRequest};
use crate::domain::dice::Dice;
use crate::domain::user::{Session, UserProfile};
use crate::error::Error;
use crate::repository::sessions::SessionRepository;

const DRIFT_UP_THRESHOLD: f64 = 0.5;
const DRIFT_MAX_GAIN: f64 = 10.0;
const DRIFT_MAX_LOSS: f64 = 5.0;

/// Owns the signed-in user. Every mutation persists before it becomes visible.
#[derive(Clone)]
pub struct SessionService {
    pub session_repository: Arc<SessionRepository>,
    current: Arc<RwLock<Option<Session>>>,
    dice: Dice,
    starting_balance: Amount,
    signup_bonus: Amount,
    latency: Latency,
}

impl SessionService {
    pub fn new(session_repository: Arc<SessionRepository>, config: &Config, dice: Dice) -> Self {
        SessionService {
            session_repository,
            current: Arc::new(RwLock::new(None)),
            dice,
            starting_balance: config.starting_balance(),
            signup_bonus: config.signup_bonus(),
            latency: config.latency.clone(),
        }
    }

    /// Picks up a session persisted by an earlier run. A corrupted store is wiped.
    pub async fn restore(&self) -> Result<Option<Session>> {
        sleep(self.latency.restore).await;
        let mut current = self.current.write().await;
        let restored = match self.session_repository.load() {
            Ok(session) => session,
            Err(e) if matches!(e.downcast_ref::<Error>(), Some(Error::CorruptedStore(_))) => {
                warn!("discarding stored session: {}", e);
                self.session_repository.clear()?;
                None
            }
            Err(e) => return Err(e),
        };
        if let Some(session) = &restored {
            info!("restored session for {}", session.user.email);
        }
        *current = restored.clone();
        Ok(restored)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<Session> {
        request.validate().map_err(validation_error)?;
        ensure!(!request.password.is_empty(), Error::InvalidCredentials);
        sleep(self.latency.login).await;

        let user = UserProfile::new(request.email, None, self.starting_balance);
        let session = self.replace(Session::open(user)).await?;
        info!("user {} logged in", session.user.email);
        Ok(session)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Session> {
        request.validate().map_err(validation_error)?;
        sleep(self.latency.register).await;

        let user = UserProfile::new(request.email, request.username, self.signup_bonus);
        let session = self.replace(Session::open(user)).await?;
        info!(
            "user {} registered with a bonus of {}",
            session.user.email, session.user.balance
        );
        Ok(session)
    }

    /// Safe to call without a session.
    pub async fn logout(&self) -> Result<()> {
        let mut current = self.current.write().await;
        self.session_repository
            .clear()
            .tap_err(|e| warn!("failed to clear stored session: {:?}", e))?;
        if let Some(session) = current.take() {
            info!("user {} logged out", session.user.email);
        }
        Ok(())
    }

    pub async fn adjust_balance(&self, delta: Amount) -> Result<UserProfile> {
        self.apply_if_active(delta)
            .await?
            .wrap_err(Error::NoActiveSession)
    }

    /// Read-modify-write of the balance under the session lock. `None` without a session.
    pub async fn apply_if_active(&self, delta: Amount) -> Result<Option<UserProfile>> {
        let mut current = self.current.write().await;
        let Some(session) = current.as_ref() else {
            return Ok(None);
        };
        let updated = Session {
            token: session.token.clone(),
            user: session.user.with_balance_delta(delta),
        };
        self.session_repository
            .save(updated.clone())
            .tap_err(|e| warn!("balance change of {} not persisted: {:?}", delta, e))?;
        debug!(
            "balance of {} moved by {} to {}",
            updated.user.id, delta, updated.user.balance
        );
        let user = updated.user.clone();
        *current = Some(updated);
        Ok(Some(user))
    }

    /// Random live-feed adjustment: up to +10.00 or down to -5.00.
    pub async fn drift_balance(&self) -> Result<UserProfile> {
        let r = self.dice.unit();
        let size = self.dice.unit();
        let delta = if r > DRIFT_UP_THRESHOLD {
            Amount::from_f64(size * DRIFT_MAX_GAIN)
        } else {
            -Amount::from_f64(size * DRIFT_MAX_LOSS)
        };
        self.adjust_balance(delta).await
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    async fn replace(&self, session: Session) -> Result<Session> {
        let mut current = self.current.write().await;
        self.session_repository.save(session.clone())?;
        *current = Some(session.clone());
        Ok(session)
    }
}
