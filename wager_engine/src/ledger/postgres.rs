//! PostgreSQL ledger.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::time::Duration;

use super::{
    Ledger,
    errors::{LedgerError, LedgerResult, ensure_non_negative},
    models::{GameKind, PlayerId, Points, ResultRecord},
};
use crate::db::timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout};

/// Ledger over the `player_points` and `game_results` tables
/// (see `migrations/`).
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
    timeout: Duration,
}

impl PgLedger {
    /// Create a new ledger
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-query timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn ensure_account(
        &self,
        player_id: PlayerId,
        initial_points: Points,
    ) -> LedgerResult<Points> {
        ensure_non_negative(initial_points)?;

        // Insert-or-keep, then read back whatever is stored
        let row = with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO player_points (player_id, points)
                VALUES ($1, $2)
                ON CONFLICT (player_id) DO UPDATE SET player_id = EXCLUDED.player_id
                RETURNING points
                "#,
            )
            .bind(player_id)
            .bind(initial_points)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.get("points"))
    }

    async fn get_balance(&self, player_id: PlayerId) -> LedgerResult<Points> {
        let row = with_timeout(
            self.timeout,
            sqlx::query("SELECT points FROM player_points WHERE player_id = $1")
                .bind(player_id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(LedgerError::PlayerNotFound(player_id))?;

        Ok(row.get("points"))
    }

    async fn set_balance(&self, player_id: PlayerId, new_balance: Points) -> LedgerResult<()> {
        ensure_non_negative(new_balance)?;

        let result = with_timeout(
            self.timeout,
            sqlx::query(
                "UPDATE player_points
                 SET points = $1, updated_at = NOW()
                 WHERE player_id = $2",
            )
            .bind(new_balance)
            .bind(player_id)
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::PlayerNotFound(player_id));
        }
        Ok(())
    }

    async fn record_result(&self, record: &ResultRecord) -> LedgerResult<i64> {
        let streak = i32::try_from(record.streak).unwrap_or(i32::MAX);
        let row = with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO game_results (game, player_id, payout, streak, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(record.game.as_str())
            .bind(record.player_id)
            .bind(record.payout)
            .bind(streak)
            .bind(record.recorded_at.naive_utc())
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.get("id"))
    }

    async fn recent_results(
        &self,
        player_id: PlayerId,
        limit: i64,
    ) -> LedgerResult<Vec<ResultRecord>> {
        let rows = with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                SELECT game, player_id, payout, streak, created_at
                FROM game_results
                WHERE player_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
                "#,
            )
            .bind(player_id)
            .bind(limit)
            .fetch_all(&self.pool),
        )
        .await?;

        // Rows written by other games sharing the table are skipped
        let records = rows
            .into_iter()
            .filter_map(|row| {
                let game = row.get::<String, _>("game").parse::<GameKind>().ok()?;
                Some(ResultRecord {
                    game,
                    player_id: row.get("player_id"),
                    payout: row.get("payout"),
                    streak: u32::try_from(row.get::<i32, _>("streak")).unwrap_or(0),
                    recorded_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
                })
            })
            .collect();

        Ok(records)
    }
}
