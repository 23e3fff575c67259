// src/api/mod.rs

pub mod health;
pub mod user_state;

use std::sync::Arc;

use crate::config::Config;
use crate::db::UserStateStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStateStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStateStore>, config: Config) -> Self {
        Self { store, config }
    }

    /// Key the store is addressed with. Lowercased only when the
    /// deployment opts into case normalization.
    pub fn storage_key(&self, wallet: &str) -> String {
        if self.config.normalize_wallet_case {
            wallet.to_ascii_lowercase()
        } else {
            wallet.to_string()
        }
    }
}
