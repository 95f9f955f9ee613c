//! Points ledger: balances and append-only round results.
//!
//! This module implements:
//! - The [`Ledger`] trait every wager session is constructed with
//! - A PostgreSQL implementation with per-query timeouts
//! - An in-memory implementation with failure switches
//!
//! ## Example
//!
//! ```
//! use wager_engine::ledger::{GameKind, InMemoryLedger, Ledger, ResultRecord};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let player = Uuid::new_v4();
//!     let ledger = InMemoryLedger::new().with_account(player, 100);
//!
//!     let balance = ledger.get_balance(player).await?;
//!     ledger.set_balance(player, balance - 10).await?;
//!     ledger
//!         .record_result(&ResultRecord::new(GameKind::HighCard, player, 0, 0))
//!         .await?;
//!
//!     assert_eq!(ledger.get_balance(player).await?, 90);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use errors::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;
pub use models::{GameKind, PlayerId, Points, ResultRecord};
pub use postgres::PgLedger;
pub use repository::Ledger;
