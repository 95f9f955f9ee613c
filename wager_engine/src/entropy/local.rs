//! In-process deck source for offline play.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    Card, DeckHandle, DeckSource, check_draw,
    errors::{EntropyError, EntropyResult},
};

/// Shuffles decks locally with the thread RNG. Each opened deck is kept
/// until its last card is drawn.
#[derive(Debug, Default)]
pub struct LocalDeckSource {
    decks: Mutex<HashMap<String, Vec<Card>>>,
}

impl LocalDeckSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of decks that still hold cards.
    pub async fn open_decks(&self) -> usize {
        self.decks.lock().await.len()
    }
}

#[async_trait]
impl DeckSource for LocalDeckSource {
    async fn open_deck(&self) -> EntropyResult<DeckHandle> {
        let mut cards = Card::full_deck().to_vec();
        cards.shuffle(&mut rand::rng());

        let deck_id = Uuid::new_v4().simple().to_string();
        let handle = DeckHandle::new(deck_id.clone(), cards.len());
        self.decks.lock().await.insert(deck_id, cards);
        Ok(handle)
    }

    async fn draw(&self, handle: &mut DeckHandle, count: usize) -> EntropyResult<Vec<Card>> {
        check_draw(handle, count)?;

        let mut decks = self.decks.lock().await;
        let deck = decks.get_mut(handle.deck_id()).ok_or_else(|| {
            EntropyError::SourceUnavailable(format!("unknown deck {}", handle.deck_id()))
        })?;
        if count > deck.len() {
            return Err(EntropyError::DeckExhausted {
                requested: count,
                remaining: deck.len(),
            });
        }

        let cards: Vec<Card> = deck.drain(..count).collect();
        let remaining = deck.len();
        if remaining == 0 {
            decks.remove(handle.deck_id());
        }
        handle.set_remaining(remaining);
        Ok(cards)
    }
}
