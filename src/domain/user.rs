use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::amount::Amount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub balance: Amount,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserProfile {
    pub fn new(email: String, username: Option<String>, balance: Amount) -> Self {
        let username = username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| local_part(&email).to_string());
        UserProfile {
            id: Uuid::new_v4(),
            email,
            username,
            balance: balance.clamp_non_negative(),
            avatar: None,
        }
    }

    /// Returns a copy with `delta` applied, floored at zero.
    pub fn with_balance_delta(&self, delta: Amount) -> Self {
        UserProfile {
            balance: (self.balance + delta).clamp_non_negative(),
            ..self.clone()
        }
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// An authenticated context. The token and the profile only ever exist together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn open(user: UserProfile) -> Self {
        Session {
            token: format!("session_{}", Uuid::new_v4().simple()),
            user,
        }
    }
}
