//! # Wager Engine
//!
//! Two betting mini-games that escrow a player's points, grow a pot from an
//! external entropy source and settle it against a persistent ledger.
//!
//! Each game is an explicit state machine owned by one player session:
//!
//! - **HighCard**: `AwaitingBet → InRound → Resolving → RoundEnd → (AwaitingBet | Ended)`
//! - **DiceClimb**: `AwaitingBet → PlayerTurn → BankTurn → RoundEnd`
//!
//! Reveals and rolls are two-phase. `begin_*` draws and locks the session,
//! `commit_*` applies the result after the caller's settle delay. Actions
//! that arrive in between are ignored.
//!
//! Balances are written as absolute values computed from a fresh read. A
//! failed result record is logged and never reverts a credit.
//!
//! ## Core Modules
//!
//! - [`game`]: the two games and the shared session view
//! - [`entropy`]: remote, local and scripted decks; dice
//! - [`ledger`]: the ledger contract with Postgres and in-memory backends
//! - [`db`]: connection pool, configuration and query timeouts
//! - [`config`]: engine settings from the environment
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use wager_engine::{
//!     DiceClimbGame, WagerSession,
//!     entropy::FixedDice,
//!     ledger::{InMemoryLedger, Ledger},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let player = Uuid::new_v4();
//!     let ledger = Arc::new(InMemoryLedger::new().with_account(player, 50));
//!     let mut game = DiceClimbGame::new(player, ledger.clone(), Box::new(FixedDice::new([5, 6, 4, 6])));
//!
//!     game.confirm_bet(0).await?;
//!     if let Some(roll) = game.begin_roll()? {
//!         game.commit_roll(roll).await?;
//!     }
//!     if let Some(roll) = game.begin_roll()? {
//!         game.commit_roll(roll).await?;
//!     }
//!     assert_eq!(game.player_total(), 21);
//!
//!     game.cash_out().await?;
//!     assert_eq!(ledger.get_balance(player).await?, 51);
//!     assert_eq!(game.streak(), 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod entropy;
pub mod game;
pub mod ledger;

pub use config::{ConfigError, EngineConfig};
pub use game::{
    DiceClimbGame, GameError, GameResult, GameSession, HighCardGame, Prediction, WagerSession,
    parse_wager,
};
pub use ledger::{GameKind, Ledger, PlayerId, Points};
