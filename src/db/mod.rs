use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::future::Future;
use std::time::Duration;

use crate::{
    config::Config,
    error::StoreError,
    models::{UserState, UserStateRow},
};

#[cfg(test)]
pub mod memory;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence capability for per-wallet state. Implementations must make
/// `upsert` a single atomic write so concurrent writers never merge.
#[async_trait]
pub trait UserStateStore: Send + Sync {
    /// Exact-match lookup on the wallet key. `None` means nothing is persisted.
    async fn get(&self, wallet: &str) -> StoreResult<Option<UserState>>;

    /// Inserts the row or replaces both mutable fields.
    async fn upsert(&self, wallet: &str, credits: Decimal, pending_tbt: &str) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    query_timeout: Duration,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        tracing::info!(
            max_connections = config.database_max_connections,
            "Connecting to database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.database_url)
            .await?;

        Ok(Self::from_pool(pool, config.query_timeout()))
    }

    pub fn from_pool(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Creates the `user_state` table if it does not exist yet.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        tracing::info!("Closing database connection pool");
        self.pool.close().await;
    }
}

// ==================== USER STATE QUERIES ====================
#[async_trait]
impl UserStateStore for Database {
    async fn get(&self, wallet: &str) -> StoreResult<Option<UserState>> {
        let row = with_timeout(
            "get user state",
            self.query_timeout,
            sqlx::query_as::<_, UserStateRow>(
                "SELECT wallet, credits, pendingtbt AS pending_tbt
                 FROM user_state WHERE wallet = $1",
            )
            .bind(wallet)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(UserState::from))
    }

    async fn upsert(&self, wallet: &str, credits: Decimal, pending_tbt: &str) -> StoreResult<()> {
        with_timeout(
            "upsert user state",
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO user_state (wallet, credits, pendingTBT)
                VALUES ($1, $2, $3)
                ON CONFLICT (wallet) DO UPDATE
                SET credits    = EXCLUDED.credits,
                    pendingTBT = EXCLUDED.pendingTBT
                "#,
            )
            .bind(wallet)
            .bind(credits)
            .bind(pending_tbt)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        with_timeout(
            "ping",
            self.query_timeout,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}

/// Bounds a query so a stalled connection surfaces as a retryable error.
async fn with_timeout<T, F>(operation: &'static str, limit: Duration, query: F) -> StoreResult<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, query).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(StoreError::Timeout {
            operation,
            after: limit,
        }),
    }
}
