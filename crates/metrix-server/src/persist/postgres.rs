//! PostgreSQL snapshot backend.
//!
//! Two tables, one row per metric name. Counters are stored as the `bigint`
//! bit pattern of the `u64` total, so values above `i64::MAX` survive a
//! round trip unchanged.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use metrix_core::error::{MetrixError, Result};
use metrix_core::retry::{retry_if, RetryPolicy};
use metrix_core::Snapshot;

use super::{Backend, BackendKind};

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_COUNTERS: &str = "CREATE TABLE IF NOT EXISTS counters (
    name  VARCHAR(255) PRIMARY KEY,
    value BIGINT NOT NULL
)";

const CREATE_GAUGES: &str = "CREATE TABLE IF NOT EXISTS gauges (
    name  VARCHAR(255) PRIMARY KEY,
    value DOUBLE PRECISION NOT NULL
)";

const UPSERT_COUNTER: &str = "INSERT INTO counters (name, value) VALUES ($1, $2)
    ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value";

const UPSERT_GAUGE: &str = "INSERT INTO gauges (name, value) VALUES ($1, $2)
    ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value";

pub struct PostgresBackend {
    pool: PgPool,
    policy: RetryPolicy,
}

impl PostgresBackend {
    /// Connect and make sure both tables exist.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(dsn)
            .await
            .map_err(|e| MetrixError::BackendUnreachable(format!("connect postgres: {e}")))?;

        let backend = Self {
            pool,
            policy: RetryPolicy::default(),
        };
        backend.migrate().await?;
        tracing::info!("postgres backend ready");
        Ok(backend)
    }

    async fn migrate(&self) -> Result<()> {
        for ddl in [CREATE_COUNTERS, CREATE_GAUGES] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| MetrixError::BackendUnreachable(format!("create tables: {e}")))?;
        }
        Ok(())
    }

    async fn upsert_all(&self, snapshot: &Snapshot) -> std::result::Result<(), sqlx::Error> {
        for (name, value) in &snapshot.counter {
            let res = sqlx::query(UPSERT_COUNTER)
                .bind(name)
                .bind(*value as i64)
                .execute(&self.pool)
                .await;
            ignore_unique_violation(res)?;
        }
        for (name, value) in &snapshot.gauge {
            let res = sqlx::query(UPSERT_GAUGE)
                .bind(name)
                .bind(*value)
                .execute(&self.pool)
                .await;
            ignore_unique_violation(res)?;
        }
        Ok(())
    }

    async fn select_all(&self) -> std::result::Result<Snapshot, sqlx::Error> {
        let counters: Vec<(String, i64)> = sqlx::query_as("SELECT name, value FROM counters")
            .fetch_all(&self.pool)
            .await?;
        let gauges: Vec<(String, f64)> = sqlx::query_as("SELECT name, value FROM gauges")
            .fetch_all(&self.pool)
            .await?;

        Ok(Snapshot {
            counter: counters.into_iter().map(|(n, v)| (n, v as u64)).collect(),
            gauge: gauges.into_iter().collect(),
        })
    }
}

/// A concurrent insert of the same name is treated as success.
fn ignore_unique_violation<T>(
    res: std::result::Result<T, sqlx::Error>,
) -> std::result::Result<(), sqlx::Error> {
    match res {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Connection-level failures are worth another attempt; SQL errors are not.
fn is_transient(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Protocol(_) => true,
        // SQLSTATE class 08: connection exception.
        sqlx::Error::Database(db) => db.code().is_some_and(|c| c.starts_with("08")),
        _ => false,
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Database
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        retry_if(&self.policy, move |_| self.upsert_all(snapshot), is_transient)
            .await
            .map_err(|e| MetrixError::PersistenceWriteFailed(format!("postgres upsert: {e}")))?;
        tracing::debug!(metrics = snapshot.len(), "snapshot saved to postgres");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let snapshot = retry_if(&self.policy, move |_| self.select_all(), is_transient)
            .await
            .map_err(|e| MetrixError::PersistenceReadFailed(format!("postgres select: {e}")))?;
        Ok((!snapshot.is_empty()).then_some(snapshot))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| MetrixError::BackendUnreachable(format!("postgres ping: {e}")))
    }
}
