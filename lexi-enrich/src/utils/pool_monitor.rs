//! Monitored transactions
//!
//! Logs connection acquisition wait and hold time for the enrichment cache
//! transactions. Held transactions must never span a source call, so a long
//! hold time is worth a warning.

use lexi_common::{Error, Result};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::time::Instant;

const SLOW_ACQUIRE_MS: u128 = 1000;
const LONG_HOLD_MS: u128 = 2000;

/// Transaction wrapper that logs how long its connection was held
pub struct MonitoredTransaction<'c> {
    tx: Option<Transaction<'c, Sqlite>>,
    caller: &'static str,
    acquired_at: Instant,
}

impl<'c> MonitoredTransaction<'c> {
    /// Connection to run statements on
    pub fn conn(&mut self) -> Result<&mut SqliteConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| Error::Internal(format!("{}: transaction already finished", self.caller)))
    }

    pub async fn commit(mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            self.log_release("commit");
        }
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            self.log_release("rollback");
        }
        Ok(())
    }

    fn log_release(&self, how: &'static str) {
        let held_ms = self.acquired_at.elapsed().as_millis();
        if held_ms > LONG_HOLD_MS {
            tracing::warn!(
                caller = self.caller,
                held_ms = held_ms as u64,
                how,
                "Long transaction held a cache connection"
            );
        } else {
            tracing::debug!(
                caller = self.caller,
                held_ms = held_ms as u64,
                how,
                "Connection released"
            );
        }
    }
}

impl Drop for MonitoredTransaction<'_> {
    fn drop(&mut self) {
        if self.tx.is_some() {
            // Dropped without commit: sqlx rolls back
            self.log_release("drop");
        }
    }
}

/// Begin a transaction and log how long acquisition took
pub async fn begin_monitored<'c>(
    pool: &'c SqlitePool,
    caller: &'static str,
) -> Result<MonitoredTransaction<'c>> {
    let start = Instant::now();
    let tx = pool.begin().await?;

    let wait_ms = start.elapsed().as_millis();
    if wait_ms > SLOW_ACQUIRE_MS {
        tracing::warn!(
            caller,
            wait_ms = wait_ms as u64,
            "Slow connection acquisition, pool may be saturated"
        );
    } else {
        tracing::debug!(caller, wait_ms = wait_ms as u64, "Connection acquired");
    }

    Ok(MonitoredTransaction {
        tx: Some(tx),
        caller,
        acquired_at: Instant::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_persists() {
        let pool = lexi_common::db::init_in_memory().await.unwrap();

        let mut tx = begin_monitored(&pool, "test::commit").await.unwrap();
        sqlx::query("INSERT INTO words (id, user_id, value) VALUES ('w1', 'u1', 'run')")
            .execute(tx.conn().unwrap())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let pool = lexi_common::db::init_in_memory().await.unwrap();

        {
            let mut tx = begin_monitored(&pool, "test::drop").await.unwrap();
            sqlx::query("INSERT INTO words (id, user_id, value) VALUES ('w1', 'u1', 'run')")
                .execute(tx.conn().unwrap())
                .await
                .unwrap();
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
