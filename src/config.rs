use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CORS_ALLOWED_ORIGINS, DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS,
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_QUERY_TIMEOUT_SECS,
};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout_secs: u64,
    pub database_query_timeout_secs: u64,

    // Write policy
    pub require_signature: bool,
    pub normalize_wallet_case: bool,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_DATABASE_MAX_CONNECTIONS))?,
            database_acquire_timeout_secs: env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS))?,
            database_query_timeout_secs: env::var("DATABASE_QUERY_TIMEOUT_SECS")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_DATABASE_QUERY_TIMEOUT_SECS))?,

            require_signature: env_flag("REQUIRE_SIGNATURE"),
            normalize_wallet_case: env_flag("NORMALIZE_WALLET_CASE"),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGINS.to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.database_max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be > 0");
        }
        if self.database_acquire_timeout_secs == 0 || self.database_query_timeout_secs == 0 {
            anyhow::bail!("Database timeouts must be > 0");
        }

        if !self.require_signature {
            tracing::warn!(
                "REQUIRE_SIGNATURE is off; unsigned writes are accepted without ownership proof"
            );
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; falling back to permissive CORS");
        }

        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.database_acquire_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.database_query_timeout_secs)
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 4000,
        environment: "test".to_string(),
        database_url: "postgres://localhost/wallet_state_test".to_string(),
        database_max_connections: 1,
        database_acquire_timeout_secs: 1,
        database_query_timeout_secs: 1,
        require_signature: false,
        normalize_wallet_case: false,
        cors_allowed_origins: "*".to_string(),
    }
}
