//! Driver configuration management.
//!
//! Consolidates the environment variable reads for the driver and layers
//! command-line overrides on top of them.

use uuid::Uuid;
use wager_engine::{
    config::{ConfigError, EngineConfig, parse_env_or},
    db::DatabaseConfig,
    ledger::{GameKind, PlayerId, Points},
};

/// Where balances and results are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerBackend {
    Postgres(DatabaseConfig),
    /// Lost on exit
    Memory,
}

/// Values given on the command line; each wins over its environment variable
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub game: Option<GameKind>,
    pub player_id: Option<PlayerId>,
    pub database_url: Option<String>,
    pub memory: bool,
    pub starting_points: Option<Points>,
    pub local_deck: bool,
}

/// Complete driver configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub game: GameKind,
    pub player_id: PlayerId,
    pub ledger: LedgerBackend,
    /// Shuffle decks in-process instead of calling the deck service
    pub local_deck: bool,
    pub engine: EngineConfig,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// - `WAGER_GAME`: `high_card` or `dice_climb` (default: `high_card`)
    /// - `PLAYER_ID`: UUID of the player (default: a fresh one)
    /// - `DATABASE_URL`: Postgres ledger, required unless `--memory`
    /// - `LOCAL_DECK`: `true` to skip the deck service (default: false)
    /// - everything read by [`EngineConfig::from_env`]
    ///
    /// # Errors
    ///
    /// * `ConfigError::MissingRequired` - no database URL and no `--memory`
    /// * `ConfigError::Invalid` - a value failed to parse or validate
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let game = match overrides.game {
            Some(game) => game,
            None => match std::env::var("WAGER_GAME") {
                Ok(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                    var: "WAGER_GAME".to_string(),
                    reason,
                })?,
                Err(_) => GameKind::HighCard,
            },
        };

        let player_id = match overrides.player_id {
            Some(id) => id,
            None => match std::env::var("PLAYER_ID") {
                Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    var: "PLAYER_ID".to_string(),
                    reason: "Must be a UUID".to_string(),
                })?,
                Err(_) => Uuid::new_v4(),
            },
        };

        let ledger = if overrides.memory {
            LedgerBackend::Memory
        } else {
            let database = match overrides.database_url {
                Some(url) => DatabaseConfig::with_url(url),
                None => DatabaseConfig::from_env().map_err(|_| ConfigError::MissingRequired {
                    var: "DATABASE_URL".to_string(),
                    hint: "Set it, pass --db-url URL, or play offline with --memory".to_string(),
                })?,
            };
            LedgerBackend::Postgres(database)
        };

        let mut engine = EngineConfig::from_env()?;
        if let Some(points) = overrides.starting_points {
            engine.starting_points = points;
        }

        let config = Self {
            game,
            player_id,
            ledger,
            local_deck: overrides.local_deck || parse_env_or("LOCAL_DECK", false),
            engine,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if let LedgerBackend::Postgres(database) = &self.ledger {
            database.validate()?;
        }
        Ok(())
    }
}
