use std::sync::Arc;

use eyre::{bail, Result};
use log::{debug, warn};

use crate::domain::user::{Session, UserProfile};
use crate::error::Error;
use crate::repository::store::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Persists the current session under the `token` and `user` keys.
#[cfg_attr(test, faux::create)]
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KeyValueStore>,
}

#[cfg_attr(test, faux::methods)]
impl SessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SessionRepository { store }
    }

    pub fn load(&self) -> Result<Option<Session>> {
        let token = self.store.get(TOKEN_KEY)?;
        let user = self.store.get(USER_KEY)?;
        match (token, user) {
            (Some(token), Some(user)) => {
                let user: UserProfile = match serde_json::from_str(&user) {
                    Ok(user) => user,
                    Err(e) => bail!(Error::CorruptedStore(e.to_string())),
                };
                Ok(Some(Session { token, user }))
            }
            (None, None) => Ok(None),
            _ => {
                warn!("found only one of the session keys, clearing both");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.store
            .set_all(&[(TOKEN_KEY, session.token), (USER_KEY, user)])?;
        debug!("session saved for user {}", session.user.id);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove_all(&[TOKEN_KEY, USER_KEY])
    }
}
