//! Deterministic entropy for replays and tests.
//!
//! [`FixedDeckSource`] deals a scripted card sequence and can be told to fail
//! the next opens or draws. [`FixedDice`] cycles through scripted faces.

use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use super::{
    Card, DeckHandle, DeckSource, check_draw,
    dice::{DIE_FACES, DiceSource},
    errors::{EntropyError, EntropyResult},
};

/// Deals scripted cards in order. Every opened deck holds whatever is left
/// of the script.
#[derive(Debug, Default)]
pub struct FixedDeckSource {
    script: Mutex<VecDeque<Card>>,
    opened: AtomicUsize,
    failing_opens: AtomicUsize,
    failing_draws: AtomicUsize,
}

impl FixedDeckSource {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            script: Mutex::new(cards.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Append cards to the script; decks opened afterwards will include them.
    pub fn push_cards(&self, cards: impl IntoIterator<Item = Card>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(cards);
    }

    /// Fail the next `n` calls to `open_deck` with `SourceUnavailable`.
    pub fn fail_next_opens(&self, n: usize) {
        self.failing_opens.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` valid draws with `SourceUnavailable`.
    pub fn fail_next_draws(&self, n: usize) {
        self.failing_draws.store(n, Ordering::SeqCst);
    }

    /// How many decks were successfully opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn cards_left(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl DeckSource for FixedDeckSource {
    async fn open_deck(&self) -> EntropyResult<DeckHandle> {
        if Self::take_failure(&self.failing_opens) {
            return Err(EntropyError::SourceUnavailable(
                "scripted open failure".to_string(),
            ));
        }
        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(DeckHandle::new(format!("fixed-{n}"), self.cards_left()))
    }

    async fn draw(&self, handle: &mut DeckHandle, count: usize) -> EntropyResult<Vec<Card>> {
        check_draw(handle, count)?;
        if Self::take_failure(&self.failing_draws) {
            return Err(EntropyError::SourceUnavailable(
                "scripted draw failure".to_string(),
            ));
        }

        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        if count > script.len() {
            return Err(EntropyError::DeckExhausted {
                requested: count,
                remaining: script.len(),
            });
        }
        let cards: Vec<Card> = script.drain(..count).collect();
        handle.set_remaining(handle.remaining() - count);
        Ok(cards)
    }
}

/// Dice that replay a fixed face sequence, wrapping around at the end.
/// Faces outside `1..=6` are clamped.
#[derive(Clone, Debug)]
pub struct FixedDice {
    faces: Vec<u8>,
    cursor: usize,
}

impl FixedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        let mut faces: Vec<u8> = faces
            .into_iter()
            .map(|f| f.clamp(1, DIE_FACES))
            .collect();
        if faces.is_empty() {
            faces.push(1);
        }
        Self { faces, cursor: 0 }
    }
}

impl DiceSource for FixedDice {
    fn roll_die(&mut self) -> u8 {
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        face
    }
}
