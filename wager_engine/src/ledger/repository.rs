//! Ledger trait consumed by every wager session.

use async_trait::async_trait;

use super::{
    errors::LedgerResult,
    models::{PlayerId, Points, ResultRecord},
};

/// Authoritative store of point balances and round results.
///
/// Balances are written as absolute values. Callers read the current
/// balance, compute the new total locally, and write it back; the store
/// never receives deltas.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Get the balance, creating the account with `initial_points` if missing
    async fn ensure_account(&self, player_id: PlayerId, initial_points: Points)
    -> LedgerResult<Points>;

    /// Get the current balance
    async fn get_balance(&self, player_id: PlayerId) -> LedgerResult<Points>;

    /// Overwrite the balance with an already computed total
    async fn set_balance(&self, player_id: PlayerId, new_balance: Points) -> LedgerResult<()>;

    /// Append a settled round, returning its row id
    async fn record_result(&self, record: &ResultRecord) -> LedgerResult<i64>;

    /// Most recent results first
    async fn recent_results(&self, player_id: PlayerId, limit: i64)
    -> LedgerResult<Vec<ResultRecord>>;
}
