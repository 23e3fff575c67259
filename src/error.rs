use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::crypto::signature::VerificationError;

/// Bad input shape or type. The caller can fix the request and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    MalformedBody,

    #[error("Wallet is required")]
    MissingWallet,

    #[error("Credits must be a non-negative number")]
    InvalidCredits,

    #[error("Credits are outside the supported range")]
    CreditsOutOfRange,
}

/// Ownership proof is missing or does not match the wallet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Invalid signature")]
    InvalidSignatureFormat,

    #[error("Signature does not match wallet")]
    WalletMismatch,

    #[error("Signature is required")]
    SignatureRequired,
}

impl From<VerificationError> for AuthorizationError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::InvalidSignatureFormat(_) => Self::InvalidSignatureFormat,
            VerificationError::WalletMismatch { .. } => Self::WalletMismatch,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        AppError::Unauthorized(err.into())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(ref e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Unauthorized(ref e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            AppError::Persistence(StoreError::Timeout { .. }) => {
                tracing::error!("Storage unavailable: {}", self);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage temporarily unavailable, please retry".to_string(),
                )
            }
            AppError::Persistence(ref e) => {
                tracing::error!("Storage failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to access user data".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
