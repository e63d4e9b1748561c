use std::sync::Arc;

use eyre::{ensure, ContextCompat, Result};
use log::{debug, error, info};
use tap::TapFallible;
use tokio::time::sleep;

use crate::config::{Config, Latency};
use crate::domain::amount::{Amount, Multiplier};
use crate::domain::dice::Dice;
use crate::domain::round::{draw_outcome, RoundOutcome, RoundState};
use crate::error::Error;
use crate::repository::games::GameCatalog;
use crate::service::auth::SessionService;

#[derive(Clone)]
pub struct RoundEngine {
    pub catalog: Arc<GameCatalog>,
    pub session_service: SessionService,
    dice: Dice,
    cash_out: Multiplier,
    latency: Latency,
}

impl RoundEngine {
    pub fn new(
        catalog: Arc<GameCatalog>,
        session_service: SessionService,
        config: &Config,
        dice: Dice,
    ) -> Self {
        RoundEngine {
            catalog,
            session_service,
            dice,
            cash_out: config.crash_cash_out(),
            latency: config.latency.clone(),
        }
    }

    /// Starts a round with no bet. Paid games need a session.
    pub async fn load_game(&self, game_id: &str) -> Result<RoundState> {
        let game = self.catalog.get(game_id)?;
        ensure!(
            game.is_demo() || self.session_service.is_authenticated().await,
            Error::AuthRequired
        );
        sleep(self.latency.load_game).await;
        debug!("loaded game {}", game.id);
        Ok(RoundState::new(game.id.clone()))
    }

    /// Validates `amount` and returns the round with the bet set. The balance is untouched.
    /// A drawn outcome waiting on settlement locks the bet.
    pub async fn place_bet(&self, round: &RoundState, amount: Amount) -> Result<RoundState> {
        ensure!(!round.is_settled(), Error::AlreadySettled);
        ensure!(!round.is_pending(), Error::SettlementPending);
        let game = self.catalog.get(round.game_id())?;
        ensure!(
            game.accepts(amount),
            Error::BetOutOfRange {
                min: game.min_bet,
                max: game.max_bet,
            }
        );
        // demo play without a session skips the funds check
        if let Some(user) = self.session_service.current_user().await {
            ensure!(amount <= user.balance, Error::InsufficientFunds);
        }
        debug!("bet of {} placed on {}", amount, game.id);
        Ok(round.with_bet(amount))
    }

    /// Draws the outcome once and applies it to the balance if a session is active.
    /// A settled round refuses further settlement.
    pub async fn settle(&self, round: &mut RoundState) -> Result<RoundOutcome> {
        ensure!(!round.is_settled(), Error::AlreadySettled);
        let bet = round.bet().wrap_err(Error::NoBetPlaced)?;
        let game = self.catalog.get(round.game_id())?;
        let outcome = round.draw_once(|| draw_outcome(game, bet, &self.dice, self.cash_out));
        sleep(self.latency.settle).await;

        self.session_service
            .apply_if_active(outcome.balance_delta)
            .await
            .tap_err(|e| error!("settlement of round {} failed: {:?}", round.id(), e))?;
        round.record();
        info!(
            "round {} on {} settled: bet {}, {} at {}",
            round.id(),
            game.id,
            bet,
            if outcome.win { "win" } else { "loss" },
            outcome.multiplier
        );
        Ok(outcome)
    }
}
