//! # Error Mapping
//!
//! Crypto failures seen while verifying never surface as anything but an
//! invalid signature.

use shared_crypto::CryptoError;
use shared_types::SecurityError;

/// Map a verification-time crypto failure.
pub fn verification_failure(error: CryptoError) -> SecurityError {
    match error {
        CryptoError::UnsupportedAlgorithm(uri) => {
            SecurityError::Unsupported(format!("signature algorithm {uri}"))
        }
        other => SecurityError::signature_invalid(other.to_string()),
    }
}

/// Map a signing-time crypto failure.
pub fn signing_failure(error: CryptoError) -> SecurityError {
    match error {
        CryptoError::UnsupportedAlgorithm(uri) => {
            SecurityError::Unsupported(format!("signature algorithm {uri}"))
        }
        other => SecurityError::signature_invalid(format!("signing failed: {other}")),
    }
}
