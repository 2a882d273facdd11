//! # ECDSA Signatures (secp256k1)
//!
//! ECDSA over secp256k1 with SHA-256 message hashing. Signature values are
//! the fixed 64-byte `r || s` encoding used by XML-DSig ECDSA.
//!
//! - RFC 6979 deterministic nonces
//! - Low-S normalized on signing

use crate::signing::{MessageSigner, MessageVerifier};
use crate::{CryptoError, SignatureAlgorithm};
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use zeroize::Zeroize;

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Secp256k1PublicKey([u8; 33]);

impl Secp256k1PublicKey {
    /// Create from compressed bytes (33 bytes, starting with 0x02 or 0x03).
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Create from any SEC1 encoding, normalizing to compressed form.
    pub fn from_sec1(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self::from_verifying_key(&key))
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }
}

impl MessageVerifier for Secp256k1PublicKey {
    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::EcdsaSha256
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig =
            Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignatureFormat)?;

        verifying_key
            .verify(data, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }
}

impl MessageSigner for Secp256k1KeyPair {
    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::EcdsaSha256
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let sig: Signature = self.signing_key.sign(data);
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(sig.to_bytes().to_vec())
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}
