//! Wager sessions: per-player state machines that escrow a wager, grow a
//! pot and settle it against the ledger.
//!
//! This module provides:
//! - [`HighCardGame`]: higher-or-lower card reveals with ties to the player
//! - [`DiceClimbGame`]: two-dice climb to 21 against a bank that wins ties
//! - [`GameSession`]: either game behind the shared [`WagerSession`] accessors
//!
//! Every reveal or roll is split into `begin_*` and `commit_*`. Between the
//! two the session is locked and mutating actions return `Ok(None)` (or
//! `Ok(false)`) without touching state.

use enum_dispatch::enum_dispatch;
use tokio::task::JoinHandle;

pub mod dice_climb;
pub mod errors;
pub mod high_card;
mod session;
pub mod streak;

pub use dice_climb::{
    DiceClimbGame, DiceLoss, DiceOutcome, DicePhase, DiceWin, PendingBankTurn, PendingRoll,
    RollOutcome,
};
pub use errors::{GameError, GameResult};
pub use high_card::{
    HighCardGame, HighCardPhase, PendingReveal, Prediction, RevealOutcome, RevealStart,
    RoundOutcome,
};
pub use session::{parse_wager, validate_wager};
pub use streak::StreakTracker;

use crate::ledger::{GameKind, PlayerId, Points};

/// Read-only view shared by every wager session.
#[enum_dispatch]
pub trait WagerSession {
    fn game(&self) -> GameKind;
    fn player_id(&self) -> PlayerId;
    fn wager(&self) -> Points;
    fn pot(&self) -> Points;
    fn streak(&self) -> u32;
    /// Balance as of the session's last ledger read or write.
    fn balance(&self) -> Points;
    /// True between a `begin_*` and its `commit_*`.
    fn is_locked(&self) -> bool;
    fn phase_name(&self) -> &'static str;
    /// A round is in play and would be forfeited by abandoning the session.
    fn is_round_active(&self) -> bool;
}

/// Either game, for callers that pick one at runtime.
#[enum_dispatch(WagerSession)]
pub enum GameSession {
    HighCard(HighCardGame),
    DiceClimb(DiceClimbGame),
}

impl GameSession {
    pub async fn refresh_balance(&mut self) -> GameResult<Points> {
        match self {
            GameSession::HighCard(game) => game.refresh_balance().await,
            GameSession::DiceClimb(game) => game.refresh_balance().await,
        }
    }

    pub fn abandon(self) -> Option<JoinHandle<()>> {
        match self {
            GameSession::HighCard(game) => game.abandon(),
            GameSession::DiceClimb(game) => game.abandon(),
        }
    }
}
