//! Signing and verification seams.
//!
//! The signature engine never names a concrete key type: it signs with a
//! [`MessageSigner`] and checks with a [`MessageVerifier`], and the key
//! resolver decides which implementation backs each.

use crate::{CryptoError, SignatureAlgorithm};

/// Produces signature values over canonical bytes.
pub trait MessageSigner: Send + Sync {
    /// Algorithm written into `SignatureMethod`.
    fn algorithm(&self) -> SignatureAlgorithm;

    /// Sign data.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Checks signature values over canonical bytes.
pub trait MessageVerifier: Send + Sync {
    /// Algorithm this key verifies.
    fn algorithm(&self) -> SignatureAlgorithm;

    /// Verify `signature` over `data`.
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), CryptoError>;

    /// Verify with an algorithm read off the wire, rejecting a mismatch
    /// with the key before any cryptography runs.
    fn verify_with(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        if algorithm != self.algorithm() {
            return Err(CryptoError::AlgorithmMismatch {
                expected: algorithm.uri().to_owned(),
                actual: self.algorithm().uri().to_owned(),
            });
        }
        self.verify(data, signature)
    }
}
