//! Engine configuration.
//!
//! Consolidates the environment variable reads for the entropy sources, the
//! settle signal timings and ledger defaults.

use std::time::Duration;

use crate::{entropy::deck_api::DEFAULT_DECK_API_URL, ledger::Points};

/// Engine configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Root of the remote deck service
    pub deck_api_url: String,
    /// Per-request timeout for the deck service
    pub deck_api_timeout: Duration,
    /// Settle time of a card reveal before it is committed
    pub reveal_settle: Duration,
    /// Settle time of a single die
    pub die_settle: Duration,
    /// Pause between the first die settling and the second starting
    pub die_gap: Duration,
    /// Per-query ledger timeout
    pub ledger_timeout: Duration,
    /// Balance given to players without an account
    pub starting_points: Points,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deck_api_url: DEFAULT_DECK_API_URL.to_string(),
            deck_api_timeout: Duration::from_secs(10),
            reveal_settle: Duration::from_millis(500),
            die_settle: Duration::from_millis(900),
            die_gap: Duration::from_millis(80),
            ledger_timeout: Duration::from_secs(5),
            starting_points: 0,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// - `DECK_API_URL` (default: public deck-of-cards service)
    /// - `DECK_API_TIMEOUT_SECS` (default: 10)
    /// - `REVEAL_SETTLE_MS` (default: 500)
    /// - `DIE_SETTLE_MS` (default: 900)
    /// - `DIE_GAP_MS` (default: 80)
    /// - `LEDGER_TIMEOUT_SECS` (default: 5)
    /// - `STARTING_POINTS` (default: 0)
    ///
    /// # Errors
    ///
    /// Returns error if a loaded value fails [`EngineConfig::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            deck_api_url: std::env::var("DECK_API_URL").unwrap_or(defaults.deck_api_url),
            deck_api_timeout: Duration::from_secs(parse_env_or("DECK_API_TIMEOUT_SECS", 10)),
            reveal_settle: Duration::from_millis(parse_env_or("REVEAL_SETTLE_MS", 500)),
            die_settle: Duration::from_millis(parse_env_or("DIE_SETTLE_MS", 900)),
            die_gap: Duration::from_millis(parse_env_or("DIE_GAP_MS", 80)),
            ledger_timeout: Duration::from_secs(parse_env_or("LEDGER_TIMEOUT_SECS", 5)),
            starting_points: parse_env_or("STARTING_POINTS", 0),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.deck_api_url.starts_with("http://") && !self.deck_api_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid {
                var: "DECK_API_URL".to_string(),
                reason: "Must be an http(s) URL".to_string(),
            });
        }

        if self.deck_api_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "DECK_API_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.ledger_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "LEDGER_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.starting_points < 0 {
            return Err(ConfigError::Invalid {
                var: "STARTING_POINTS".to_string(),
                reason: "Cannot be negative".to_string(),
            });
        }

        Ok(())
    }

    /// Full settle time of a two-dice roll: first die, gap, second die.
    pub fn roll_settle(&self) -> Duration {
        self.die_settle + self.die_gap + self.die_settle
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
pub fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
