//! In-process ledger for offline play and tests.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tokio::sync::RwLock;

use super::{
    Ledger,
    errors::{LedgerError, LedgerResult, ensure_non_negative},
    models::{PlayerId, Points, ResultRecord},
};

/// Ledger held in memory, with switches to simulate an unreachable store.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: RwLock<HashMap<PlayerId, Points>>,
    results: RwLock<Vec<ResultRecord>>,
    fail_balance_reads: AtomicBool,
    fail_balance_writes: AtomicBool,
    fail_result_writes: AtomicBool,
    balance_writes: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account.
    pub fn with_account(mut self, player_id: PlayerId, points: Points) -> Self {
        self.balances.get_mut().insert(player_id, points);
        self
    }

    pub fn set_fail_balance_reads(&self, fail: bool) {
        self.fail_balance_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_balance_writes(&self, fail: bool) {
        self.fail_balance_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_result_writes(&self, fail: bool) {
        self.fail_result_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set_balance` calls.
    pub fn balance_writes(&self) -> usize {
        self.balance_writes.load(Ordering::SeqCst)
    }

    /// Every recorded result in insertion order.
    pub async fn results(&self) -> Vec<ResultRecord> {
        self.results.read().await.clone()
    }

    fn check(flag: &AtomicBool, what: &str) -> LedgerResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable(format!("{what} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn ensure_account(
        &self,
        player_id: PlayerId,
        initial_points: Points,
    ) -> LedgerResult<Points> {
        Self::check(&self.fail_balance_reads, "balance read")?;
        ensure_non_negative(initial_points)?;
        let mut balances = self.balances.write().await;
        Ok(*balances.entry(player_id).or_insert(initial_points))
    }

    async fn get_balance(&self, player_id: PlayerId) -> LedgerResult<Points> {
        Self::check(&self.fail_balance_reads, "balance read")?;
        self.balances
            .read()
            .await
            .get(&player_id)
            .copied()
            .ok_or(LedgerError::PlayerNotFound(player_id))
    }

    async fn set_balance(&self, player_id: PlayerId, new_balance: Points) -> LedgerResult<()> {
        Self::check(&self.fail_balance_writes, "balance write")?;
        ensure_non_negative(new_balance)?;
        let mut balances = self.balances.write().await;
        let slot = balances
            .get_mut(&player_id)
            .ok_or(LedgerError::PlayerNotFound(player_id))?;
        *slot = new_balance;
        self.balance_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn record_result(&self, record: &ResultRecord) -> LedgerResult<i64> {
        Self::check(&self.fail_result_writes, "result write")?;
        let mut results = self.results.write().await;
        results.push(record.clone());
        Ok(results.len() as i64)
    }

    async fn recent_results(
        &self,
        player_id: PlayerId,
        limit: i64,
    ) -> LedgerResult<Vec<ResultRecord>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .results
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| r.player_id == player_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
