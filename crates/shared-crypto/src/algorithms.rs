//! # Algorithm Identifiers
//!
//! Digest and signature algorithms, keyed by their XML-DSig URIs.

use crate::hashing::{Digester, IncrementalHash};
use crate::CryptoError;
use shared_types::namespaces::algorithm;

/// Reference digest algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DigestAlgorithm {
    /// SHA-1 (legacy interop only)
    Sha1,
    /// SHA-256
    #[default]
    Sha256,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    /// XML-DSig URI.
    pub fn uri(self) -> &'static str {
        match self {
            Self::Sha1 => algorithm::SHA1,
            Self::Sha256 => algorithm::SHA256,
            Self::Sha512 => algorithm::SHA512,
        }
    }

    /// Resolve from an XML-DSig URI.
    pub fn from_uri(uri: &str) -> Result<Self, CryptoError> {
        match uri {
            algorithm::SHA1 => Ok(Self::Sha1),
            algorithm::SHA256 => Ok(Self::Sha256),
            algorithm::SHA512 => Ok(Self::Sha512),
            _ => Err(CryptoError::UnsupportedAlgorithm(uri.to_owned())),
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// A fresh unkeyed hash for this algorithm.
    pub fn new_hash(self) -> Box<dyn IncrementalHash> {
        Box::new(Digester::new(self))
    }
}

/// Signature algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1 over a shared secret
    HmacSha1,
    /// HMAC-SHA256 over a shared secret
    HmacSha256,
    /// ECDSA on secp256k1 with SHA-256
    EcdsaSha256,
    /// Ed25519 (pure, no prehash)
    Ed25519,
}

impl SignatureAlgorithm {
    /// XML-DSig URI.
    pub fn uri(self) -> &'static str {
        match self {
            Self::HmacSha1 => algorithm::HMAC_SHA1,
            Self::HmacSha256 => algorithm::HMAC_SHA256,
            Self::EcdsaSha256 => algorithm::ECDSA_SHA256,
            Self::Ed25519 => algorithm::ED25519,
        }
    }

    /// Resolve from an XML-DSig URI.
    pub fn from_uri(uri: &str) -> Result<Self, CryptoError> {
        match uri {
            algorithm::HMAC_SHA1 => Ok(Self::HmacSha1),
            algorithm::HMAC_SHA256 => Ok(Self::HmacSha256),
            algorithm::ECDSA_SHA256 => Ok(Self::EcdsaSha256),
            algorithm::ED25519 => Ok(Self::Ed25519),
            _ => Err(CryptoError::UnsupportedAlgorithm(uri.to_owned())),
        }
    }

    /// True for shared-secret algorithms, where signing and verifying use
    /// the same key.
    pub fn is_symmetric(self) -> bool {
        matches!(self, Self::HmacSha1 | Self::HmacSha256)
    }
}
