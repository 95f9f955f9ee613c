//! Entropy source error types.

use thiserror::Error;

/// Entropy source errors
#[derive(Debug, Error)]
pub enum EntropyError {
    /// Remote provider failed or refused the request
    #[error("Entropy source unavailable: {0}")]
    SourceUnavailable(String),

    /// More cards requested than the deck still holds
    #[error("Deck exhausted: requested {requested}, remaining {remaining}")]
    DeckExhausted { requested: usize, remaining: usize },

    /// Draw count outside `1..=52`
    #[error("Invalid draw count {0}: must be between 1 and 52")]
    InvalidDrawCount(usize),

    /// Provider returned a card this engine can't interpret
    #[error("Malformed card from source: {value} of {suit}")]
    MalformedCard { value: String, suit: String },
}

impl EntropyError {
    /// Whether the failure came from the provider rather than from the request.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            EntropyError::SourceUnavailable(_) | EntropyError::MalformedCard { .. }
        )
    }
}

impl From<reqwest::Error> for EntropyError {
    fn from(err: reqwest::Error) -> Self {
        EntropyError::SourceUnavailable(err.to_string())
    }
}

/// Result type for entropy operations
pub type EntropyResult<T> = Result<T, EntropyError>;
