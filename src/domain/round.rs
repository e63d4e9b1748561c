use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::amount::{Amount, Multiplier};
use crate::domain::dice::Dice;
use crate::domain::game::{GameDefinition, GameFamily, Symbol};

/// Probability threshold for generic games: a draw above it wins.
const GENERIC_LOSS_THRESHOLD: f64 = 0.4;
const GENERIC_SPREAD: f64 = 3.0;
const SLOTS_TRIPLE: Multiplier = Multiplier::whole(10);
const SLOTS_PAIR: Multiplier = Multiplier::whole(2);
/// Crash points are drawn from [1.00, 11.00).
const CRASH_SPAN_HUNDREDTHS: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeDetail {
    Generic,
    Slots { reels: [Symbol; 3] },
    Crash { crash_point: Multiplier, cash_out: Multiplier },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub game_id: String,
    pub bet: Amount,
    pub win: bool,
    pub multiplier: Multiplier,
    pub payout: Amount,
    /// What settlement adds to the balance: `payout - bet` on a win, `-bet` on a loss.
    pub balance_delta: Amount,
    pub detail: OutcomeDetail,
}

impl RoundOutcome {
    fn new(game_id: String, bet: Amount, multiplier: Multiplier, detail: OutcomeDetail) -> Self {
        let win = multiplier > Multiplier::ZERO;
        let payout = multiplier.apply(bet);
        let balance_delta = if win { payout - bet } else { -bet };
        RoundOutcome {
            game_id,
            bet,
            win,
            multiplier,
            payout,
            balance_delta,
            detail,
        }
    }
}

/// One bet-and-settle cycle. The bet and the outcome are each set at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    id: Uuid,
    game_id: String,
    bet: Option<Amount>,
    /// Drawn but not yet applied to the balance; a retried settlement reuses it.
    pending: Option<RoundOutcome>,
    outcome: Option<RoundOutcome>,
}

impl RoundState {
    pub fn new(game_id: impl Into<String>) -> Self {
        RoundState {
            id: Uuid::new_v4(),
            game_id: game_id.into(),
            bet: None,
            pending: None,
            outcome: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn bet(&self) -> Option<Amount> {
        self.bet
    }

    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    /// An outcome has been drawn but not yet applied.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn with_bet(&self, amount: Amount) -> Self {
        RoundState {
            bet: Some(amount),
            ..self.clone()
        }
    }

    pub(crate) fn draw_once(&mut self, draw: impl FnOnce() -> RoundOutcome) -> RoundOutcome {
        self.pending.get_or_insert_with(draw).clone()
    }

    pub(crate) fn record(&mut self) {
        if let Some(outcome) = self.pending.take() {
            self.outcome = Some(outcome);
        }
    }
}

pub fn generic_multiplier(r: f64, r_spread: f64) -> Multiplier {
    if r > GENERIC_LOSS_THRESHOLD {
        Multiplier::from_f64(1.0 + r_spread * GENERIC_SPREAD)
    } else {
        Multiplier::ZERO
    }
}

pub fn slots_multiplier(reels: &[Symbol; 3]) -> Multiplier {
    if reels.iter().all_equal() {
        SLOTS_TRIPLE
    } else if reels.iter().unique().count() == 2 {
        SLOTS_PAIR
    } else {
        Multiplier::ZERO
    }
}

/// The notional multiplier is the cash-out; reaching the crash point loses.
pub fn crash_multiplier(crash_point: Multiplier, cash_out: Multiplier) -> Multiplier {
    if cash_out >= crash_point {
        Multiplier::ZERO
    } else {
        crash_point
    }
}

pub fn crash_point_from_unit(r: f64) -> Multiplier {
    let offset = (r * CRASH_SPAN_HUNDREDTHS).floor() as u32;
    Multiplier::from_hundredths(Multiplier::ONE.hundredths() + offset)
}

/// Draws an outcome for `bet` on `game`.
pub fn draw_outcome(
    game: &GameDefinition,
    bet: Amount,
    dice: &Dice,
    cash_out: Multiplier,
) -> RoundOutcome {
    let (multiplier, detail) = match game.family {
        GameFamily::Generic => {
            let r = dice.unit();
            let r_spread = dice.unit();
            (generic_multiplier(r, r_spread), OutcomeDetail::Generic)
        }
        GameFamily::Slots => {
            let reels = [(); 3].map(|_| Symbol::ALL[dice.index(Symbol::ALL.len())]);
            (slots_multiplier(&reels), OutcomeDetail::Slots { reels })
        }
        GameFamily::Crash => {
            let crash_point = crash_point_from_unit(dice.unit());
            (
                crash_multiplier(crash_point, cash_out),
                OutcomeDetail::Crash {
                    crash_point,
                    cash_out,
                },
            )
        }
    };
    RoundOutcome::new(game.id.clone(), bet, multiplier, detail)
}
