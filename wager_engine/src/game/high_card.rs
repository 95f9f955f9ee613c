//! Higher-or-lower card game.
//!
//! The player stakes a wager, sees a reference card and predicts whether the
//! next card is higher or lower. Equal ranks always count for the player.
//! Every correct call grows the pot by a fixed increment; a wrong call
//! forfeits it. The pot can be cashed out at any point in the round, and an
//! exhausted deck pays it out automatically.
//!
//! Reveals are two-phase: [`HighCardGame::begin_reveal`] draws the card and
//! locks the session, [`HighCardGame::commit_reveal`] applies the result once
//! the reveal has settled.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tokio::task::JoinHandle;

use super::{
    WagerSession,
    errors::{GameError, GameResult},
    session::{SessionCore, TransitionId},
};
use crate::{
    entropy::{Card, DeckHandle, DeckSource, EntropyError},
    ledger::{GameKind, Ledger, PlayerId, Points},
};

/// Direction the player expects the next card to go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    Higher,
    Lower,
}

impl Prediction {
    /// Equal ranks win regardless of direction.
    pub fn wins(self, reference: Card, drawn: Card) -> bool {
        let (reference, drawn) = (reference.rank(), drawn.rank());
        drawn == reference
            || match self {
                Prediction::Higher => drawn > reference,
                Prediction::Lower => drawn < reference,
            }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Higher => write!(f, "higher"),
            Prediction::Lower => write!(f, "lower"),
        }
    }
}

/// How a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Lost,
    Retired { payout: Points },
    DeckExhausted { payout: Points },
}

impl RoundOutcome {
    pub fn payout(&self) -> Points {
        match self {
            RoundOutcome::Lost => 0,
            RoundOutcome::Retired { payout } | RoundOutcome::DeckExhausted { payout } => *payout,
        }
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundOutcome::Lost => write!(f, "lost"),
            RoundOutcome::Retired { payout } => write!(f, "retired with {payout}"),
            RoundOutcome::DeckExhausted { payout } => {
                write!(f, "deck exhausted, paid {payout}")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighCardPhase {
    AwaitingBet,
    InRound,
    /// A card has been drawn and is waiting to be committed.
    Resolving,
    RoundEnd(RoundOutcome),
    Ended,
}

impl HighCardPhase {
    pub fn name(&self) -> &'static str {
        match self {
            HighCardPhase::AwaitingBet => "awaiting bet",
            HighCardPhase::InRound => "in round",
            HighCardPhase::Resolving => "resolving",
            HighCardPhase::RoundEnd(_) => "round over",
            HighCardPhase::Ended => "ended",
        }
    }
}

/// A drawn card waiting for its reveal to settle.
#[derive(Debug)]
pub struct PendingReveal {
    id: TransitionId,
    prediction: Prediction,
    drawn: Card,
}

impl PendingReveal {
    pub fn prediction(&self) -> Prediction {
        self.prediction
    }

    pub fn drawn(&self) -> Card {
        self.drawn
    }
}

#[derive(Debug)]
pub enum RevealStart {
    Pending(PendingReveal),
    /// The deck ran out before a card could be drawn.
    RoundEnded(RoundOutcome),
}

/// Result of a committed reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealOutcome {
    pub drawn: Card,
    pub won: bool,
    pub pot: Points,
    /// Set when this reveal ended the round.
    pub round_end: Option<RoundOutcome>,
}

pub struct HighCardGame {
    core: SessionCore,
    deck_source: Arc<dyn DeckSource>,
    deck: Option<DeckHandle>,
    phase: HighCardPhase,
    wager: Points,
    increment: Points,
    pot: Points,
    reference: Option<Card>,
    /// Reference drawn by a start whose debit failed, reused on retry.
    staged_reference: Option<Card>,
}

impl HighCardGame {
    pub fn new(player_id: PlayerId, ledger: Arc<dyn Ledger>, deck_source: Arc<dyn DeckSource>) -> Self {
        Self {
            core: SessionCore::new(GameKind::HighCard, player_id, ledger),
            deck_source,
            deck: None,
            phase: HighCardPhase::AwaitingBet,
            wager: 0,
            increment: 1,
            pot: 0,
            reference: None,
            staged_reference: None,
        }
    }

    pub fn phase(&self) -> HighCardPhase {
        self.phase
    }

    pub fn reference(&self) -> Option<Card> {
        self.reference
    }

    /// Pot growth per correct call.
    pub fn increment(&self) -> Points {
        self.increment
    }

    pub fn deck(&self) -> Option<&DeckHandle> {
        self.deck.as_ref()
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

    fn deck_exhausted(&self) -> bool {
        self.deck.as_ref().is_none_or(DeckHandle::is_exhausted)
    }

    /// Open a deck when there is none or the current one is empty.
    async fn ensure_deck(&mut self) -> GameResult<()> {
        if self.deck_exhausted() {
            let deck = self.deck_source.open_deck().await?;
            debug!("Opened deck {} ({} cards)", deck.deck_id(), deck.remaining());
            self.deck = Some(deck);
        }
        Ok(())
    }

    async fn draw_one(&mut self) -> GameResult<Card> {
        let deck = self.deck.as_mut().ok_or(EntropyError::DeckExhausted {
            requested: 1,
            remaining: 0,
        })?;
        let cards = self.deck_source.draw(deck, 1).await?;
        cards.into_iter().next().ok_or_else(|| {
            EntropyError::SourceUnavailable("provider returned no card".to_string()).into()
        })
    }

    /// Place the wager and deal the reference card.
    ///
    /// The wager is debited even when the reference is the deck's last card;
    /// the next reveal then ends the round with nothing to pay.
    ///
    /// Returns `Ok(None)` while the session is locked.
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidWager` - wager negative or above the balance
    /// * `GameError::Entropy` - deck could not be opened or drawn from; nothing was debited
    /// * `GameError::Ledger` - balance read or debit failed; the dealt card is kept for the retry
    pub async fn start_round(&mut self, wager: Points) -> GameResult<Option<Card>> {
        if self.core.is_locked() {
            debug!("Ignoring start while locked");
            return Ok(None);
        }
        if self.phase != HighCardPhase::AwaitingBet {
            return Err(self.invalid("start a round"));
        }

        self.core.check_wager(wager).await?;
        let reference = match self.staged_reference.take() {
            Some(card) => card,
            None => {
                self.ensure_deck().await?;
                self.draw_one().await?
            }
        };
        if let Err(e) = self.core.debit(wager).await {
            self.staged_reference = Some(reference);
            return Err(e);
        }

        self.wager = wager;
        self.increment = if wager > 0 { wager } else { 1 };
        self.pot = 0;
        self.reference = Some(reference);
        self.phase = HighCardPhase::InRound;
        debug!(
            "High card round for {} started: wager {wager}, reference {reference}",
            self.core.player_id
        );
        Ok(Some(reference))
    }

    /// Draw the next card for `prediction` and lock the session until the
    /// reveal is committed. An exhausted deck ends the round instead.
    ///
    /// The returned reveal must be handed to [`HighCardGame::commit_reveal`]
    /// or [`HighCardGame::cancel_reveal`]; dropping it leaves the session
    /// locked until it is abandoned.
    ///
    /// Returns `Ok(None)` while the session is locked.
    pub async fn begin_reveal(&mut self, prediction: Prediction) -> GameResult<Option<RevealStart>> {
        if self.core.is_locked() {
            debug!("Ignoring reveal while locked");
            return Ok(None);
        }
        if self.phase != HighCardPhase::InRound {
            return Err(self.invalid("reveal"));
        }
        if self.deck_exhausted() {
            let outcome = self.settle_exhausted().await?;
            return Ok(Some(RevealStart::RoundEnded(outcome)));
        }

        let id = self.core.lock();
        self.phase = HighCardPhase::Resolving;
        match self.draw_one().await {
            Ok(drawn) => Ok(Some(RevealStart::Pending(PendingReveal {
                id,
                prediction,
                drawn,
            }))),
            Err(GameError::Entropy(EntropyError::DeckExhausted { .. })) => {
                self.core.release();
                self.phase = HighCardPhase::InRound;
                let outcome = self.settle_exhausted().await?;
                Ok(Some(RevealStart::RoundEnded(outcome)))
            }
            Err(e) => {
                self.core.release();
                self.phase = HighCardPhase::InRound;
                Err(e)
            }
        }
    }

    /// Apply a settled reveal. Returns `Ok(None)` for a reveal that is not
    /// the one pending.
    pub async fn commit_reveal(&mut self, pending: PendingReveal) -> GameResult<Option<RevealOutcome>> {
        if !self.core.accept(pending.id) {
            return Ok(None);
        }
        let PendingReveal {
            prediction, drawn, ..
        } = pending;
        // Resolving is only entered from a round with a reference.
        let won = self
            .reference
            .is_some_and(|reference| prediction.wins(reference, drawn));

        if !won {
            let streak = self.core.streak.current();
            self.pot = 0;
            self.reference = Some(drawn);
            self.phase = HighCardPhase::RoundEnd(RoundOutcome::Lost);
            info!(
                "High card round lost by {} ({prediction}, drew {drawn})",
                self.core.player_id
            );
            self.core.record(0, streak).await;
            self.core.streak.record_loss();
            return Ok(Some(RevealOutcome {
                drawn,
                won,
                pot: 0,
                round_end: Some(RoundOutcome::Lost),
            }));
        }

        self.reference = Some(drawn);
        self.phase = HighCardPhase::InRound;
        self.pot = self
            .pot
            .checked_add(self.increment)
            .ok_or(GameError::PotOverflow)?;
        let pot = self.pot;

        let round_end = if self.deck_exhausted() {
            Some(self.settle_exhausted().await?)
        } else {
            None
        };
        Ok(Some(RevealOutcome {
            drawn,
            won,
            pot,
            round_end,
        }))
    }

    /// Back out of a reveal without applying it. The drawn card is spent and
    /// the round continues from the same reference. False for a reveal that
    /// is not the one pending.
    pub fn cancel_reveal(&mut self, pending: PendingReveal) -> bool {
        if !self.core.accept(pending.id) {
            return false;
        }
        debug!(
            "Reveal of {} cancelled for {}",
            pending.drawn, self.core.player_id
        );
        self.phase = HighCardPhase::InRound;
        true
    }

    /// Cash out the pot.
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidAction` - not in a round, or the pot is empty
    /// * `GameError::Ledger` - credit failed; the round is unchanged
    pub async fn retire(&mut self) -> GameResult<Option<RoundOutcome>> {
        if self.core.is_locked() {
            debug!("Ignoring retire while locked");
            return Ok(None);
        }
        if self.phase != HighCardPhase::InRound || self.pot == 0 {
            return Err(self.invalid("retire"));
        }
        let payout = self.pot;
        self.pay_out(RoundOutcome::Retired { payout }).await.map(Some)
    }

    async fn settle_exhausted(&mut self) -> GameResult<RoundOutcome> {
        let payout = self.pot;
        if payout == 0 {
            let outcome = RoundOutcome::DeckExhausted { payout };
            self.phase = HighCardPhase::RoundEnd(outcome);
            debug!("Deck exhausted with an empty pot for {}", self.core.player_id);
            return Ok(outcome);
        }
        self.pay_out(RoundOutcome::DeckExhausted { payout }).await
    }

    /// Credit the pot. State only changes once the credit has landed.
    async fn pay_out(&mut self, outcome: RoundOutcome) -> GameResult<RoundOutcome> {
        let payout = outcome.payout();
        self.core.credit(payout).await?;
        self.pot = 0;
        self.phase = HighCardPhase::RoundEnd(outcome);
        let streak = self.core.streak.record_win();
        info!(
            "High card round for {} {outcome}, streak {streak}",
            self.core.player_id
        );
        self.core.record(payout, streak).await;
        Ok(outcome)
    }

    /// Back to betting after a round, keeping the current deck.
    ///
    /// Returns false while the session is locked.
    pub fn new_round(&mut self) -> GameResult<bool> {
        if self.core.is_locked() {
            return Ok(false);
        }
        if !matches!(self.phase, HighCardPhase::RoundEnd(_)) {
            return Err(self.invalid("start a new round"));
        }
        self.wager = 0;
        self.increment = 1;
        self.pot = 0;
        self.reference = None;
        self.phase = HighCardPhase::AwaitingBet;
        Ok(true)
    }

    /// Leave the game between rounds. The streak does not survive.
    pub fn exit(&mut self) -> GameResult<bool> {
        if self.core.is_locked() {
            return Ok(false);
        }
        if !matches!(
            self.phase,
            HighCardPhase::AwaitingBet | HighCardPhase::RoundEnd(_)
        ) {
            return Err(self.invalid("exit"));
        }
        self.core.streak.reset();
        self.phase = HighCardPhase::Ended;
        Ok(true)
    }

    /// Tear the session down. An active round is forfeited and its zero
    /// payout recorded in the background.
    pub fn abandon(mut self) -> Option<JoinHandle<()>> {
        if self.is_round_active() {
            self.core.forfeit_in_background()
        } else {
            None
        }
    }
}

impl WagerSession for HighCardGame {
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
            HighCardPhase::InRound | HighCardPhase::Resolving
        )
    }
}
