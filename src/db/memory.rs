//! In-process stores used by handler tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use super::{StoreResult, UserStateStore};
use crate::{error::StoreError, models::UserState};

#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<String, UserState>>,
}

impl MemoryStore {
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn wallets(&self) -> Vec<String> {
        let mut wallets: Vec<String> = self.rows.read().await.keys().cloned().collect();
        wallets.sort();
        wallets
    }
}

#[async_trait]
impl UserStateStore for MemoryStore {
    async fn get(&self, wallet: &str) -> StoreResult<Option<UserState>> {
        Ok(self.rows.read().await.get(wallet).cloned())
    }

    async fn upsert(&self, wallet: &str, credits: Decimal, pending_tbt: &str) -> StoreResult<()> {
        // Single write under one guard, same visibility as ON CONFLICT DO UPDATE.
        self.rows.write().await.insert(
            wallet.to_string(),
            UserState {
                wallet: wallet.to_string(),
                credits,
                pending_tbt: pending_tbt.to_string(),
            },
        );
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Store that fails every call.
pub enum BrokenStore {
    Unreachable,
    Stalled,
}

impl BrokenStore {
    fn error(&self) -> StoreError {
        match self {
            BrokenStore::Unreachable => StoreError::Database(sqlx::Error::PoolTimedOut),
            BrokenStore::Stalled => StoreError::Timeout {
                operation: "upsert user state",
                after: Duration::from_secs(1),
            },
        }
    }
}

#[async_trait]
impl UserStateStore for BrokenStore {
    async fn get(&self, _wallet: &str) -> StoreResult<Option<UserState>> {
        Err(self.error())
    }

    async fn upsert(&self, _wallet: &str, _credits: Decimal, _pending_tbt: &str) -> StoreResult<()> {
        Err(self.error())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn upsert_replaces_both_fields() {
        let store = MemoryStore::default();
        store.upsert("0xabc", Decimal::new(10, 0), "5").await.unwrap();
        store.upsert("0xabc", Decimal::new(20, 0), "0").await.unwrap();

        let state = store.get("0xabc").await.unwrap().unwrap();
        assert_eq!(state.credits, Decimal::new(20, 0));
        assert_eq!(state.pending_tbt, "0");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_writers_leave_one_write() {
        let store = Arc::new(MemoryStore::default());
        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.upsert("0xabc", Decimal::new(1, 0), "1").await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.upsert("0xabc", Decimal::new(2, 0), "2").await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let state = store.get("0xabc").await.unwrap().unwrap();
        let pair = (state.credits, state.pending_tbt.as_str());
        assert!(pair == (Decimal::new(1, 0), "1") || pair == (Decimal::new(2, 0), "2"));
    }
}
