//! # Symmetric Signing Keys
//!
//! Shared-secret keys for HMAC signatures. The same key signs and verifies;
//! verification compares in constant time.

use crate::hashing::{IncrementalHash, KeyedHash};
use crate::signing::{MessageSigner, MessageVerifier};
use crate::{CryptoError, SignatureAlgorithm};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum accepted secret length in bytes.
pub const MIN_KEY_LEN: usize = 16;

/// HMAC secret key (zeroized on drop).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HmacKey {
    bytes: Vec<u8>,
    #[zeroize(skip)]
    algorithm: SignatureAlgorithm,
}

impl HmacKey {
    /// Create a key for an HMAC algorithm.
    pub fn new(algorithm: SignatureAlgorithm, bytes: &[u8]) -> Result<Self, CryptoError> {
        if !algorithm.is_symmetric() {
            return Err(CryptoError::UnsupportedAlgorithm(algorithm.uri().to_owned()));
        }
        if bytes.len() < MIN_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: MIN_KEY_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes.to_vec(),
            algorithm,
        })
    }

    /// Generate a random 32-byte key.
    pub fn generate(algorithm: SignatureAlgorithm) -> Result<Self, CryptoError> {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let key = Self::new(algorithm, &bytes);
        bytes.zeroize();
        key
    }

    /// Incremental MAC keyed with this secret, for hash-stream signing.
    pub fn keyed_hash(&self) -> Result<KeyedHash, CryptoError> {
        KeyedHash::new(self.algorithm, &self.bytes)
    }

    fn mac(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut mac = self.keyed_hash()?;
        mac.update(data);
        Ok(mac.finalize_reset())
    }
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacKey")
            .field("algorithm", &self.algorithm)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl MessageSigner for HmacKey {
    fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.mac(data)
    }
}

impl MessageVerifier for HmacKey {
    fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let expected = self.mac(data)?;
        if expected.len() != signature.len() {
            return Err(CryptoError::InvalidSignatureFormat);
        }
        if bool::from(expected.ct_eq(signature)) {
            Ok(())
        } else {
            Err(CryptoError::SignatureVerificationFailed)
        }
    }
}
