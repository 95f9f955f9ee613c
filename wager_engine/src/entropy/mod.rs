//! Entropy sources: shuffled decks (possibly remote) and local dice.
//!
//! Decks are handed out as [`DeckHandle`]s that track the remaining card
//! count. A draw is validated against the handle before the provider is
//! contacted, and the handle only changes when the draw succeeds, so a
//! failed draw never leaves the caller with a stale count.
//!
//! ## Example
//!
//! ```
//! use wager_engine::entropy::{DeckSource, LocalDeckSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = LocalDeckSource::new();
//!     let mut deck = source.open_deck().await?;
//!     let cards = source.draw(&mut deck, 2).await?;
//!     assert_eq!(cards.len(), 2);
//!     assert_eq!(deck.remaining(), 50);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod cards;
pub mod deck_api;
pub mod dice;
pub mod errors;
pub mod fixed;
pub mod local;

pub use cards::{Card, DECK_SIZE, Suit, Value};
pub use deck_api::DeckApiSource;
pub use dice::{DiceRoll, DiceSource, RandomDice};
pub use errors::{EntropyError, EntropyResult};
pub use fixed::{FixedDeckSource, FixedDice};
pub use local::LocalDeckSource;

/// A shuffled deck owned by one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckHandle {
    deck_id: String,
    remaining: usize,
}

impl DeckHandle {
    pub fn new(deck_id: impl Into<String>, remaining: usize) -> Self {
        Self {
            deck_id: deck_id.into(),
            remaining,
        }
    }

    pub fn deck_id(&self) -> &str {
        &self.deck_id
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Record a successful draw as reported by the provider.
    pub(crate) fn set_remaining(&mut self, remaining: usize) {
        self.remaining = remaining;
    }
}

/// Validate a draw request against a handle without touching it.
///
/// # Errors
///
/// * `EntropyError::InvalidDrawCount` - `count` outside `1..=52`
/// * `EntropyError::DeckExhausted` - `count` exceeds the remaining cards
pub fn check_draw(handle: &DeckHandle, count: usize) -> EntropyResult<()> {
    if !(1..=DECK_SIZE).contains(&count) {
        return Err(EntropyError::InvalidDrawCount(count));
    }
    if count > handle.remaining {
        return Err(EntropyError::DeckExhausted {
            requested: count,
            remaining: handle.remaining,
        });
    }
    Ok(())
}

/// Provider of shuffled 52-card decks.
///
/// Deck creation is never retried here; callers decide whether to try again.
#[async_trait]
pub trait DeckSource: Send + Sync {
    /// Request a freshly shuffled deck.
    async fn open_deck(&self) -> EntropyResult<DeckHandle>;

    /// Draw `count` cards, decrementing the handle's remaining count on success.
    async fn draw(&self, handle: &mut DeckHandle, count: usize) -> EntropyResult<Vec<Card>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_draw_bounds() {
        let handle = DeckHandle::new("d", 52);
        assert!(check_draw(&handle, 1).is_ok());
        assert!(check_draw(&handle, 52).is_ok());
        assert!(matches!(
            check_draw(&handle, 0),
            Err(EntropyError::InvalidDrawCount(0))
        ));
        assert!(matches!(
            check_draw(&handle, 53),
            Err(EntropyError::InvalidDrawCount(53))
        ));
    }

    #[test]
    fn test_check_draw_exhaustion() {
        let handle = DeckHandle::new("d", 1);
        assert!(matches!(
            check_draw(&handle, 2),
            Err(EntropyError::DeckExhausted {
                requested: 2,
                remaining: 1
            })
        ));
        assert_eq!(handle.remaining(), 1);
    }

    #[test]
    fn test_empty_handle_is_exhausted() {
        assert!(DeckHandle::new("d", 0).is_exhausted());
        assert!(!DeckHandle::new("d", 3).is_exhausted());
    }
}
