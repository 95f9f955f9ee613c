//! Wager session error types.

use thiserror::Error;

use crate::{
    entropy::EntropyError,
    ledger::{LedgerError, Points},
};

/// Errors returned by wager session operations.
///
/// Actions received while a session is locked are not errors; they are
/// ignored and reported as `Ok(None)` by the operation itself.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid wager {wager}: must be between 0 and {balance}")]
    InvalidWager { wager: Points, balance: Points },

    #[error("invalid wager input '{0}'")]
    UnparsableWager(String),

    #[error("can't {action} while {phase}")]
    InvalidAction {
        action: &'static str,
        phase: &'static str,
    },

    #[error("pot overflow")]
    PotOverflow,

    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl GameError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            GameError::Ledger(e) => e.client_message(),
            GameError::Entropy(e) if e.is_source_failure() => {
                "Card service unavailable, try again".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// A round-pausing failure of the deck provider or the ledger. Round
    /// state is untouched and the same action can be retried.
    pub fn is_source_unavailable(&self) -> bool {
        match self {
            GameError::Entropy(e) => e.is_source_failure(),
            GameError::Ledger(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Result type for wager session operations
pub type GameResult<T> = Result<T, GameError>;
