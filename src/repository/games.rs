use eyre::{ensure, ContextCompat, Result};

use crate::domain::amount::Amount;
use crate::domain::game::{GameDefinition, GameFamily};
use crate::error::Error;

/// Immutable registry of the playable games, in registration order.
#[derive(Debug, Clone)]
pub struct GameCatalog {
    games: Vec<GameDefinition>,
}

impl GameCatalog {
    pub fn new(games: Vec<GameDefinition>) -> Result<Self> {
        for (i, game) in games.iter().enumerate() {
            ensure!(
                games[..i].iter().all(|other| other.id != game.id),
                "duplicate game id {}",
                game.id
            );
        }
        Ok(GameCatalog { games })
    }

    pub fn standard() -> Result<Self> {
        Self::new(vec![
            GameDefinition::new(
                "slots",
                "Slots",
                Amount::from_units(1),
                Amount::from_units(1000),
                false,
                GameFamily::Slots,
            )?,
            GameDefinition::new(
                "roulette",
                "Roulette",
                Amount::from_units(5),
                Amount::from_units(5000),
                false,
                GameFamily::Generic,
            )?,
            GameDefinition::new(
                "blackjack",
                "Blackjack",
                Amount::from_units(10),
                Amount::from_units(10000),
                true,
                GameFamily::Generic,
            )?,
            GameDefinition::new(
                "poker",
                "Poker",
                Amount::from_units(20),
                Amount::from_units(20000),
                true,
                GameFamily::Generic,
            )?,
            GameDefinition::new(
                "crash",
                "Crash",
                Amount::from_units(1),
                Amount::from_units(5000),
                false,
                GameFamily::Crash,
            )?,
        ])
    }

    pub fn get(&self, game_id: &str) -> Result<&GameDefinition> {
        self.games
            .iter()
            .find(|game| game.id == game_id)
            .wrap_err(Error::UnknownGame(game_id.to_string()))
    }

    pub fn list(&self) -> &[GameDefinition] {
        &self.games
    }
}
