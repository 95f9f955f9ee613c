//! Push-your-luck dice game played to 21.
//!
//! The player rolls two dice at a time, adding to a running total. Landing
//! exactly on 21 wins outright and going over busts. Passing hands the dice
//! to the bank, which keeps rolling while it is strictly below the player:
//! a tie belongs to the bank. A won pot can be cashed out or doubled into a
//! fresh climb.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{
    WagerSession,
    errors::{GameError, GameResult},
    session::{SessionCore, TransitionId},
};
use crate::{
    entropy::{DiceRoll, DiceSource},
    ledger::{GameKind, Ledger, PlayerId, Points},
};

/// Winning total. Anything above busts.
pub const TARGET: u32 = 21;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceWin {
    TwentyOne,
    BankBust,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceLoss {
    Bust,
    /// Bank reached or passed the player without busting.
    BankReached,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceOutcome {
    Won(DiceWin),
    Lost(DiceLoss),
}

impl DiceOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, DiceOutcome::Won(_))
    }
}

impl fmt::Display for DiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DiceOutcome::Won(DiceWin::TwentyOne) => "won with 21",
            DiceOutcome::Won(DiceWin::BankBust) => "won, bank bust",
            DiceOutcome::Lost(DiceLoss::Bust) => "lost, bust",
            DiceOutcome::Lost(DiceLoss::BankReached) => "lost to the bank",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DicePhase {
    AwaitingBet,
    PlayerTurn,
    BankTurn,
    RoundEnd(DiceOutcome),
}

impl DicePhase {
    pub fn name(&self) -> &'static str {
        match self {
            DicePhase::AwaitingBet => "awaiting bet",
            DicePhase::PlayerTurn => "player turn",
            DicePhase::BankTurn => "bank turn",
            DicePhase::RoundEnd(DiceOutcome::Won(_)) => "round won",
            DicePhase::RoundEnd(DiceOutcome::Lost(_)) => "round lost",
        }
    }
}

/// A player roll waiting for both dice to settle.
#[derive(Debug)]
pub struct PendingRoll {
    id: TransitionId,
    roll: DiceRoll,
}

impl PendingRoll {
    /// First die settles before the second.
    pub fn roll(&self) -> DiceRoll {
        self.roll
    }
}

/// The bank's whole turn, rolled up front and revealed roll by roll.
#[derive(Debug)]
pub struct PendingBankTurn {
    id: TransitionId,
    rolls: Vec<DiceRoll>,
    total: u32,
}

impl PendingBankTurn {
    pub fn rolls(&self) -> &[DiceRoll] {
        &self.rolls
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollOutcome {
    pub roll: DiceRoll,
    pub player_total: u32,
    pub round_end: Option<DiceOutcome>,
}

pub struct DiceClimbGame {
    core: SessionCore,
    dice: Box<dyn DiceSource>,
    phase: DicePhase,
    wager: Points,
    pot: Points,
    player_total: u32,
    bank_total: u32,
    player_rolls: Vec<DiceRoll>,
    bank_rolls: Vec<DiceRoll>,
}

impl DiceClimbGame {
    pub fn new(player_id: PlayerId, ledger: Arc<dyn Ledger>, dice: Box<dyn DiceSource>) -> Self {
        Self {
            core: SessionCore::new(GameKind::DiceClimb, player_id, ledger),
            dice,
            phase: DicePhase::AwaitingBet,
            wager: 0,
            pot: 0,
            player_total: 0,
            bank_total: 0,
            player_rolls: Vec::new(),
            bank_rolls: Vec::new(),
        }
    }

    pub fn phase(&self) -> DicePhase {
        self.phase
    }

    pub fn player_total(&self) -> u32 {
        self.player_total
    }

    pub fn bank_total(&self) -> u32 {
        self.bank_total
    }

    pub fn player_rolls(&self) -> &[DiceRoll] {
        &self.player_rolls
    }

    pub fn bank_rolls(&self) -> &[DiceRoll] {
        &self.bank_rolls
    }

    pub fn best_streak(&self) -> u32 {
        self.core.streak.best()
    }

    pub async fn refresh_balance(&mut self) -> GameResult<Points> {
        self.core.refresh_balance().await
    }

    fn invalid(&self, action: &'static str) -> GameError {
        GameError::InvalidAction {
            action,
            phase: self.phase.name(),
        }
    }

    fn clear_climb(&mut self) {
        self.player_total = 0;
        self.bank_total = 0;
        self.player_rolls.clear();
        self.bank_rolls.clear();
    }

    /// Debit the wager and open the climb. The pot starts at twice the
    /// wager, or 1 for a free round.
    ///
    /// Returns the starting pot, or `Ok(None)` while the session is locked.
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidWager` - wager negative or above the balance
    /// * `GameError::PotOverflow` - doubled wager does not fit
    /// * `GameError::Ledger` - balance read or debit failed; nothing changed
    pub async fn confirm_bet(&mut self, wager: Points) -> GameResult<Option<Points>> {
        if self.core.is_locked() {
            debug!("Ignoring bet while locked");
            return Ok(None);
        }
        if self.phase != DicePhase::AwaitingBet {
            return Err(self.invalid("bet"));
        }
        let pot = if wager > 0 {
            wager.checked_mul(2).ok_or(GameError::PotOverflow)?
        } else {
            1
        };

        self.core.debit(wager).await?;
        self.wager = wager;
        self.pot = pot;
        self.clear_climb();
        self.phase = DicePhase::PlayerTurn;
        debug!(
            "Dice round for {} started: wager {wager}, pot {pot}",
            self.core.player_id
        );
        Ok(Some(pot))
    }

    /// Roll both dice and lock until the roll is committed with
    /// [`DiceClimbGame::commit_roll`] or dropped with
    /// [`DiceClimbGame::cancel_roll`]. Discarding it any other way leaves the
    /// session locked until it is abandoned.
    pub fn begin_roll(&mut self) -> GameResult<Option<PendingRoll>> {
        if self.core.is_locked() {
            debug!("Ignoring roll while locked");
            return Ok(None);
        }
        if self.phase != DicePhase::PlayerTurn {
            return Err(self.invalid("roll"));
        }
        let id = self.core.lock();
        let roll = self.dice.roll_dice();
        Ok(Some(PendingRoll { id, roll }))
    }

    /// Add a settled roll to the player's total. Returns `Ok(None)` for a
    /// roll that is not the one pending.
    pub async fn commit_roll(&mut self, pending: PendingRoll) -> GameResult<Option<RollOutcome>> {
        if !self.core.accept(pending.id) {
            return Ok(None);
        }
        let roll = pending.roll;
        self.player_rolls.push(roll);
        self.player_total += roll.total();

        let round_end = if self.player_total == TARGET {
            Some(self.win(DiceWin::TwentyOne))
        } else if self.player_total > TARGET {
            Some(self.lose(DiceLoss::Bust).await)
        } else {
            None
        };
        Ok(Some(RollOutcome {
            roll,
            player_total: self.player_total,
            round_end,
        }))
    }

    /// Pass to the bank. The bank rolls strictly while below the player's
    /// total; its rolls are revealed before [`DiceClimbGame::commit_stand`].
    /// [`DiceClimbGame::cancel_stand`] hands the turn back to the player.
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidAction` - not the player's turn, or nothing rolled yet
    pub fn begin_stand(&mut self) -> GameResult<Option<PendingBankTurn>> {
        if self.core.is_locked() {
            debug!("Ignoring pass while locked");
            return Ok(None);
        }
        if self.phase != DicePhase::PlayerTurn || self.player_total == 0 {
            return Err(self.invalid("pass"));
        }
        let id = self.core.lock();
        self.phase = DicePhase::BankTurn;

        let mut rolls = Vec::new();
        let mut total = 0;
        while total < self.player_total {
            let roll = self.dice.roll_dice();
            total += roll.total();
            rolls.push(roll);
        }
        Ok(Some(PendingBankTurn { id, rolls, total }))
    }

    pub async fn commit_stand(&mut self, pending: PendingBankTurn) -> GameResult<Option<DiceOutcome>> {
        if !self.core.accept(pending.id) {
            return Ok(None);
        }
        self.bank_total = pending.total;
        self.bank_rolls = pending.rolls;

        let outcome = if self.bank_total > TARGET {
            self.win(DiceWin::BankBust)
        } else {
            self.lose(DiceLoss::BankReached).await
        };
        Ok(Some(outcome))
    }

    /// Drop a roll without adding it. False for a roll that is not the one
    /// pending.
    pub fn cancel_roll(&mut self, pending: PendingRoll) -> bool {
        if !self.core.accept(pending.id) {
            return false;
        }
        debug!("Roll {} cancelled for {}", pending.roll, self.core.player_id);
        true
    }

    /// Discard the bank's rolls and give the turn back to the player.
    pub fn cancel_stand(&mut self, pending: PendingBankTurn) -> bool {
        if !self.core.accept(pending.id) {
            return false;
        }
        debug!("Bank turn cancelled for {}", self.core.player_id);
        self.phase = DicePhase::PlayerTurn;
        true
    }

    fn win(&mut self, how: DiceWin) -> DiceOutcome {
        let outcome = DiceOutcome::Won(how);
        let streak = self.core.streak.record_win();
        self.phase = DicePhase::RoundEnd(outcome);
        info!(
            "Dice round for {} {outcome} (pot {}, streak {streak})",
            self.core.player_id, self.pot
        );
        outcome
    }

    async fn lose(&mut self, how: DiceLoss) -> DiceOutcome {
        let outcome = DiceOutcome::Lost(how);
        let streak = self.core.streak.current();
        self.pot = 0;
        self.phase = DicePhase::RoundEnd(outcome);
        info!(
            "Dice round for {} {outcome} (player {}, bank {})",
            self.core.player_id, self.player_total, self.bank_total
        );
        self.core.record(0, streak).await;
        self.core.streak.record_loss();
        outcome
    }

    /// Credit a won pot and return to betting. The streak carries over.
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidAction` - no won round to cash
    /// * `GameError::Ledger` - credit failed; the won round is kept for a retry
    pub async fn cash_out(&mut self) -> GameResult<Option<Points>> {
        if self.core.is_locked() {
            debug!("Ignoring cash out while locked");
            return Ok(None);
        }
        if !matches!(self.phase, DicePhase::RoundEnd(DiceOutcome::Won(_))) {
            return Err(self.invalid("cash out"));
        }
        let payout = self.pot;
        self.core.credit(payout).await?;
        self.core.record(payout, self.core.streak.current()).await;

        self.pot = 0;
        self.wager = 0;
        self.clear_climb();
        self.phase = DicePhase::AwaitingBet;
        Ok(Some(payout))
    }

    /// Double a won pot and climb again from zero without a new debit.
    pub fn double_and_continue(&mut self) -> GameResult<bool> {
        if self.core.is_locked() {
            return Ok(false);
        }
        if !matches!(self.phase, DicePhase::RoundEnd(DiceOutcome::Won(_))) {
            return Err(self.invalid("double"));
        }
        self.pot = self.pot.checked_mul(2).ok_or(GameError::PotOverflow)?;
        self.clear_climb();
        self.phase = DicePhase::PlayerTurn;
        debug!("Dice pot for {} doubled to {}", self.core.player_id, self.pot);
        Ok(true)
    }

    /// Back to betting after a loss.
    pub fn new_bet(&mut self) -> GameResult<bool> {
        if self.core.is_locked() {
            return Ok(false);
        }
        if !matches!(self.phase, DicePhase::RoundEnd(DiceOutcome::Lost(_))) {
            return Err(self.invalid("start a new bet"));
        }
        self.wager = 0;
        self.pot = 0;
        self.clear_climb();
        self.phase = DicePhase::AwaitingBet;
        Ok(true)
    }

    /// Tear the session down. A round in play or a won pot not yet cashed
    /// is forfeited and its zero payout recorded in the background.
    pub fn abandon(mut self) -> Option<JoinHandle<()>> {
        if self.is_round_active() {
            self.core.forfeit_in_background()
        } else {
            None
        }
    }
}

impl WagerSession for DiceClimbGame {
    fn game(&self) -> GameKind {
        self.core.game
    }

    fn player_id(&self) -> PlayerId {
        self.core.player_id
    }

    fn wager(&self) -> Points {
        self.wager
    }

    fn pot(&self) -> Points {
        self.pot
    }

    fn streak(&self) -> u32 {
        self.core.streak.current()
    }

    fn balance(&self) -> Points {
        self.core.balance()
    }

    fn is_locked(&self) -> bool {
        self.core.is_locked()
    }

    fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    fn is_round_active(&self) -> bool {
        matches!(
            self.phase,
            DicePhase::PlayerTurn | DicePhase::BankTurn | DicePhase::RoundEnd(DiceOutcome::Won(_))
        )
    }
}
