//! Ledger data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Player identity as issued by the external auth provider.
pub type PlayerId = Uuid;

/// Whole points. Balances, wagers and pots are never fractional.
pub type Points = i64;

/// Games that write to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    HighCard,
    DiceClimb,
}

impl GameKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GameKind::HighCard => "high_card",
            GameKind::DiceClimb => "dice_climb",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high_card" | "high-card" => Ok(GameKind::HighCard),
            "dice_climb" | "dice-climb" => Ok(GameKind::DiceClimb),
            other => Err(format!("unknown game '{other}'")),
        }
    }
}

/// One settled round (append-only result row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub game: GameKind,
    pub player_id: PlayerId,
    pub payout: Points,
    pub streak: u32,
    pub recorded_at: DateTime<Utc>,
}

impl ResultRecord {
    pub fn new(game: GameKind, player_id: PlayerId, payout: Points, streak: u32) -> Self {
        Self {
            game,
            player_id,
            payout,
            streak,
            recorded_at: Utc::now(),
        }
    }
}
