use eyre::{ensure, Result};
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;

use crate::domain::amount::Amount;

/// Picks the outcome rule a game settles with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameFamily {
    Generic,
    Slots,
    Crash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDefinition {
    pub id: String,
    pub display_name: String,
    pub min_bet: Amount,
    pub max_bet: Amount,
    pub requires_auth: bool,
    pub family: GameFamily,
}

impl GameDefinition {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        min_bet: Amount,
        max_bet: Amount,
        requires_auth: bool,
        family: GameFamily,
    ) -> Result<Self> {
        let id = id.into();
        ensure!(
            min_bet.is_positive() && min_bet <= max_bet,
            "game {} has invalid bet bounds [{}, {}]",
            id,
            min_bet,
            max_bet
        );
        Ok(GameDefinition {
            id,
            display_name: display_name.into(),
            min_bet,
            max_bet,
            requires_auth,
            family,
        })
    }

    pub fn accepts(&self, amount: Amount) -> bool {
        self.min_bet <= amount && amount <= self.max_bet
    }

    pub fn is_demo(&self) -> bool {
        !self.requires_auth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
pub enum Symbol {
    #[strum(serialize = "7")]
    #[serde(rename = "7")]
    Seven,
    #[strum(serialize = "BAR")]
    #[serde(rename = "BAR")]
    Bar,
    #[strum(serialize = "CHERRY")]
    #[serde(rename = "CHERRY")]
    Cherry,
    #[strum(serialize = "BELL")]
    #[serde(rename = "BELL")]
    Bell,
    #[strum(serialize = "DIAMOND")]
    #[serde(rename = "DIAMOND")]
    Diamond,
}

impl Symbol {
    pub const ALL: [Symbol; 5] = [
        Symbol::Seven,
        Symbol::Bar,
        Symbol::Cherry,
        Symbol::Bell,
        Symbol::Diamond,
    ];
}
