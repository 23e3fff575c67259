use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::{
    constants::DEFAULT_PENDING_TBT,
    crypto::signature::SignatureVerifier,
    error::{AuthorizationError, Result, ValidationError},
    models::{SaveUserStateRequest, SaveUserStateResponse, UserState},
};

use super::AppState;

/// Write request after shape checks and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWrite {
    pub wallet: String,
    pub credits: Decimal,
    pub pending_tbt: String,
    pub signature: Option<String>,
}

// ==================== HANDLERS ====================

/// GET /api/user/{wallet}
pub async fn get_user_state(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<Json<UserState>> {
    let key = state.storage_key(&wallet);
    let user = state.store.get(&key).await?;

    if user.is_none() {
        tracing::debug!("No stored state for {}, returning defaults", key);
    }

    // Echo the wallet as requested, not the normalized storage key.
    Ok(Json(user.unwrap_or_else(|| UserState::zero(wallet))))
}

/// POST /api/user/save
pub async fn save_user_state(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<SaveUserStateResponse>> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("Rejected save body: {}", rejection);
        ValidationError::MalformedBody
    })?;
    let req = parse_save_request(body)?;

    let write = validate_save_request(req)?;

    tracing::info!(
        wallet = %write.wallet,
        credits = %write.credits,
        pending_tbt = %write.pending_tbt,
        signed = write.signature.is_some(),
        "Save request received"
    );

    authorize(&write, state.config.require_signature)?;

    let key = state.storage_key(&write.wallet);
    state
        .store
        .upsert(&key, write.credits, &write.pending_tbt)
        .await?;

    Ok(Json(SaveUserStateResponse { success: true }))
}

// ==================== HELPER FUNCTIONS ====================

/// Only a JSON object is a write request. Arrays and scalars are rejected
/// before any field is looked at.
fn parse_save_request(body: Value) -> std::result::Result<SaveUserStateRequest, ValidationError> {
    match body {
        Value::Object(map) => serde_json::from_value(Value::Object(map)).map_err(|e| {
            tracing::debug!("Rejected save body: {}", e);
            ValidationError::MalformedBody
        }),
        other => {
            tracing::debug!("Rejected non-object save body: {}", other);
            Err(ValidationError::MalformedBody)
        }
    }
}

/// Applies the write validation rules in order, stopping at the first failure.
pub fn validate_save_request(
    req: SaveUserStateRequest,
) -> std::result::Result<ValidatedWrite, ValidationError> {
    let wallet = match req.wallet {
        Some(Value::String(wallet)) if !wallet.trim().is_empty() => wallet,
        _ => return Err(ValidationError::MissingWallet),
    };

    let credits = match req.credits.as_ref() {
        Some(raw) => coerce_credits(raw)?,
        None => return Err(ValidationError::InvalidCredits),
    };

    let pending_tbt = normalize_pending_tbt(req.pending_tbt.as_ref());

    let signature = match req.signature {
        Some(Value::String(signature)) if !signature.is_empty() => Some(signature),
        _ => None,
    };

    Ok(ValidatedWrite {
        wallet,
        credits,
        pending_tbt,
        signature,
    })
}

/// Checks ownership when a signature was supplied. Unsigned writes pass
/// unless the deployment requires signatures.
pub fn authorize(
    write: &ValidatedWrite,
    require_signature: bool,
) -> std::result::Result<(), AuthorizationError> {
    match write.signature.as_deref() {
        Some(signature) => SignatureVerifier::verify(&write.wallet, signature).map_err(|e| {
            tracing::warn!("Rejected update for {}: {}", write.wallet, e);
            AuthorizationError::from(e)
        }),
        None if require_signature => {
            tracing::warn!("Rejected unsigned update for {}", write.wallet);
            Err(AuthorizationError::SignatureRequired)
        }
        None => Ok(()),
    }
}

// Numbers and numeric strings both count; anything non-finite or negative does not.
fn coerce_credits(raw: &Value) -> std::result::Result<Decimal, ValidationError> {
    let credits = match raw {
        Value::Number(n) => parse_decimal(&n.to_string())?,
        Value::String(s) => parse_decimal(s)?,
        _ => return Err(ValidationError::InvalidCredits),
    };

    if credits < Decimal::ZERO {
        return Err(ValidationError::InvalidCredits);
    }
    Ok(credits)
}

fn parse_decimal(raw: &str) -> std::result::Result<Decimal, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::InvalidCredits);
    }
    if let Ok(value) = Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        return Ok(value);
    }

    // Not representable as a Decimal. Tell overflow apart from garbage.
    match raw.parse::<f64>() {
        Ok(value) if !value.is_finite() || value < 0.0 => Err(ValidationError::InvalidCredits),
        Ok(value) if value < 1.0 => Ok(Decimal::ZERO),
        Ok(_) => Err(ValidationError::CreditsOutOfRange),
        Err(_) => Err(ValidationError::InvalidCredits),
    }
}

fn normalize_pending_tbt(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) if is_decimal_quantity(s.trim()) => s.trim().to_string(),
        _ => DEFAULT_PENDING_TBT.to_string(),
    }
}

// Plain non-negative decimal: digits with at most one fractional part.
fn is_decimal_quantity(s: &str) -> bool {
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    match s.split_once('.') {
        Some((int_part, frac_part)) => {
            !frac_part.is_empty() && all_digits(int_part) && all_digits(frac_part)
        }
        None => !s.is_empty() && all_digits(s),
    }
}
