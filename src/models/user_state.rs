use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::constants::DEFAULT_PENDING_TBT;

// ==================== USER STATE ====================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserState {
    pub wallet: String,
    pub credits: Decimal,
    #[serde(rename = "pendingTBT")]
    pub pending_tbt: String,
}

impl UserState {
    /// View returned for a wallet that has never been written.
    pub fn zero(wallet: impl Into<String>) -> Self {
        Self {
            wallet: wallet.into(),
            credits: Decimal::ZERO,
            pending_tbt: DEFAULT_PENDING_TBT.to_string(),
        }
    }
}

/// Raw row as stored. Both mutable columns are nullable in the table.
#[derive(Debug, Clone, FromRow)]
pub struct UserStateRow {
    pub wallet: String,
    pub credits: Option<Decimal>,
    pub pending_tbt: Option<String>,
}

impl From<UserStateRow> for UserState {
    fn from(row: UserStateRow) -> Self {
        Self {
            wallet: row.wallet,
            credits: row.credits.unwrap_or(Decimal::ZERO),
            pending_tbt: row
                .pending_tbt
                .unwrap_or_else(|| DEFAULT_PENDING_TBT.to_string()),
        }
    }
}

// ==================== REQUEST/RESPONSE TYPES ====================

/// Untrusted write body. Fields stay loosely typed so the handler can apply
/// its own coercion rules.
#[derive(Debug, Default, Deserialize)]
pub struct SaveUserStateRequest {
    #[serde(default)]
    pub wallet: Option<Value>,
    #[serde(default)]
    pub credits: Option<Value>,
    #[serde(default, rename = "pendingTBT")]
    pub pending_tbt: Option<Value>,
    #[serde(default)]
    pub signature: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SaveUserStateResponse {
    pub success: bool,
}
