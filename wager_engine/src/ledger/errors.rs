//! Ledger error types.

use std::time::Duration;
use thiserror::Error;

use super::models::{PlayerId, Points};
use crate::db::timeouts::TimeoutError;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query did not finish in time
    #[error("Ledger operation timed out after {0:?}")]
    Timeout(Duration),

    /// No points row for the player
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// Attempted to write a negative balance
    #[error("Invalid balance: {0}")]
    InvalidBalance(Points),

    /// Store unreachable for a reason other than the database driver
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            LedgerError::Database(_) => "Internal server error".to_string(),
            LedgerError::PlayerNotFound(_) => "Player not found".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether a manual retry of the same action could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::Database(_) | LedgerError::Timeout(_) | LedgerError::Unavailable(_)
        )
    }
}

impl From<TimeoutError> for LedgerError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(after) => LedgerError::Timeout(after),
            TimeoutError::Database(e) => LedgerError::Database(e),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Reject negative balances before they reach the store.
pub(crate) fn ensure_non_negative(balance: Points) -> LedgerResult<()> {
    if balance < 0 {
        return Err(LedgerError::InvalidBalance(balance));
    }
    Ok(())
}
