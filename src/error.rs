use thiserror::Error;

use crate::domain::amount::Amount;
use crate::domain::state::{Notification, Severity};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("No active session")]
    NoActiveSession,
    #[error("Game not found: {0}")]
    UnknownGame(String),
    #[error("This game requires you to sign in")]
    AuthRequired,
    #[error("Bet must be between {min} and {max}")]
    BetOutOfRange { min: Amount, max: Amount },
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Place a bet first")]
    NoBetPlaced,
    #[error("Round is already settled")]
    AlreadySettled,
    #[error("Round is still being settled")]
    SettlementPending,
    #[error("No game loaded")]
    GameNotLoaded,
    #[error("Stored session is corrupted: {0}")]
    CorruptedStore(String),
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::Validation(_) => Severity::Error,
            Error::InvalidCredentials => Severity::Error,
            Error::NoActiveSession => Severity::Warning,
            Error::UnknownGame(_) => Severity::Error,
            Error::AuthRequired => Severity::Warning,
            Error::BetOutOfRange { .. } => Severity::Warning,
            Error::InsufficientFunds => Severity::Error,
            Error::NoBetPlaced => Severity::Warning,
            Error::AlreadySettled => Severity::Warning,
            Error::SettlementPending => Severity::Warning,
            Error::GameNotLoaded => Severity::Warning,
            Error::CorruptedStore(_) => Severity::Error,
        }
    }

    pub fn into_notification(self) -> Notification {
        Notification::new(self.to_string(), self.severity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_out_of_range_message_uses_two_decimals() {
        let error = Error::BetOutOfRange {
            min: Amount::from_units(5),
            max: Amount::from_units(5000),
        };
        assert_eq!("Bet must be between 5.00 and 5000.00", error.to_string());
        assert_eq!(Severity::Warning, error.severity());
    }

    #[test]
    fn test_into_notification() {
        let notification = Error::InsufficientFunds.into_notification();
        assert_eq!("Insufficient funds", notification.message);
        assert_eq!(Severity::Error, notification.severity);
    }
}
