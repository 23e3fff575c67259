use ethers::types::{Address, Signature};
use ethers::utils::to_checksum;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::UPDATE_MESSAGE_PREFIX;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("Recovered signer {recovered} does not match claimed wallet")]
    WalletMismatch { recovered: String },
}

/// Verifies EIP-191 personal-message signatures over the wallet update template.
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Message a wallet owner signs to authorize an update. The wallet is
    /// interpolated exactly as the caller sent it.
    pub fn update_message(wallet: &str) -> String {
        format!("{UPDATE_MESSAGE_PREFIX}{wallet}")
    }

    /// Recovers the address that produced `signature` over `message`.
    /// Accepts 65-byte `r || s || v` hex with or without a `0x` prefix.
    pub fn recover_signer(message: &str, signature: &str) -> Result<Address, VerificationError> {
        let signature = Signature::from_str(signature)
            .map_err(|e| VerificationError::InvalidSignatureFormat(e.to_string()))?;

        // ethers folds any other v onto a valid parity, so reject it before recovery.
        if !is_valid_recovery_id(signature.v) {
            return Err(VerificationError::InvalidSignatureFormat(format!(
                "invalid recovery id {}",
                signature.v
            )));
        }

        signature
            .recover(message)
            .map_err(|e| VerificationError::InvalidSignatureFormat(e.to_string()))
    }

    /// Checks that `signature` was produced by `claimed_wallet` over its
    /// update message. Address comparison ignores case.
    pub fn verify(claimed_wallet: &str, signature: &str) -> Result<(), VerificationError> {
        let message = Self::update_message(claimed_wallet);
        let recovered = to_checksum(&Self::recover_signer(&message, signature)?, None);

        tracing::debug!("Recovered signer {} for wallet {}", recovered, claimed_wallet);

        if !recovered.eq_ignore_ascii_case(claimed_wallet) {
            return Err(VerificationError::WalletMismatch { recovered });
        }

        Ok(())
    }
}

/// Raw parity (0/1), legacy Ethereum (27/28) or EIP-155 (>= 35).
fn is_valid_recovery_id(v: u64) -> bool {
    matches!(v, 0 | 1 | 27 | 28) || v >= 35
}
