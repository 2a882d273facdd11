//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Algorithm URI not implemented by this crate
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key used with an algorithm it does not implement
    #[error("Algorithm mismatch: key implements {actual}, requested {expected}")]
    AlgorithmMismatch {
        /// Requested algorithm URI
        expected: String,
        /// Algorithm URI the key implements
        actual: String,
    },

    /// Invalid key length
    #[error("Invalid key length: expected at least {expected}, got {actual}")]
    InvalidKeyLength {
        /// Minimum key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,
}
