//! # Incremental Hashing
//!
//! Keyed and unkeyed hash accumulators behind one object-safe trait, so a
//! hash stream can feed canonical bytes into either without knowing which.

use crate::algorithms::{DigestAlgorithm, SignatureAlgorithm};
use crate::CryptoError;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

/// An incremental hash or MAC.
pub trait IncrementalHash: Send {
    /// XML-DSig URI of the algorithm.
    fn algorithm_uri(&self) -> &'static str;

    /// Absorb data.
    fn update(&mut self, data: &[u8]);

    /// Return the value and reset to the initial (keyed) state.
    fn finalize_reset(&mut self) -> Vec<u8>;

    /// Output length in bytes.
    fn output_len(&self) -> usize;
}

// =============================================================================
// UNKEYED
// =============================================================================

/// Unkeyed SHA-family hash.
#[derive(Clone)]
pub enum Digester {
    /// SHA-1
    Sha1(Sha1),
    /// SHA-256
    Sha256(Sha256),
    /// SHA-512
    Sha512(Sha512),
}

impl Digester {
    /// Create new hasher.
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    /// The algorithm this hasher implements.
    pub fn algorithm(&self) -> DigestAlgorithm {
        match self {
            Self::Sha1(_) => DigestAlgorithm::Sha1,
            Self::Sha256(_) => DigestAlgorithm::Sha256,
            Self::Sha512(_) => DigestAlgorithm::Sha512,
        }
    }
}

impl IncrementalHash for Digester {
    fn algorithm_uri(&self) -> &'static str {
        self.algorithm().uri()
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => Digest::update(h, data),
            Self::Sha256(h) => Digest::update(h, data),
            Self::Sha512(h) => Digest::update(h, data),
        }
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        match self {
            Self::Sha1(h) => Digest::finalize_reset(h).to_vec(),
            Self::Sha256(h) => Digest::finalize_reset(h).to_vec(),
            Self::Sha512(h) => Digest::finalize_reset(h).to_vec(),
        }
    }

    fn output_len(&self) -> usize {
        self.algorithm().output_len()
    }
}

/// Hash data (one-shot).
pub fn digest(algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    let mut hasher = Digester::new(algorithm);
    hasher.update(data);
    hasher.finalize_reset()
}

/// SHA-1 of a DER certificate: its thumbprint.
pub fn thumbprint(der: &[u8]) -> [u8; 20] {
    Sha1::digest(der).into()
}

// =============================================================================
// KEYED
// =============================================================================

#[derive(Clone)]
enum MacState {
    Sha1(Hmac<Sha1>),
    Sha256(Hmac<Sha256>),
}

/// HMAC accumulator.
///
/// A pristine keyed state is kept so that finalization can reset without
/// holding the raw key.
#[derive(Clone)]
pub struct KeyedHash {
    pristine: MacState,
    state: MacState,
}

impl KeyedHash {
    /// Create keyed hasher for an HMAC signature algorithm.
    pub fn new(algorithm: SignatureAlgorithm, key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| CryptoError::InvalidKeyLength {
            expected: 1,
            actual: key.len(),
        };
        let pristine = match algorithm {
            SignatureAlgorithm::HmacSha1 => {
                MacState::Sha1(<Hmac<Sha1> as Mac>::new_from_slice(key).map_err(invalid)?)
            }
            SignatureAlgorithm::HmacSha256 => {
                MacState::Sha256(<Hmac<Sha256> as Mac>::new_from_slice(key).map_err(invalid)?)
            }
            other => return Err(CryptoError::UnsupportedAlgorithm(other.uri().to_owned())),
        };
        Ok(Self {
            state: pristine.clone(),
            pristine,
        })
    }

    /// The signature algorithm this MAC implements.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self.pristine {
            MacState::Sha1(_) => SignatureAlgorithm::HmacSha1,
            MacState::Sha256(_) => SignatureAlgorithm::HmacSha256,
        }
    }
}

impl IncrementalHash for KeyedHash {
    fn algorithm_uri(&self) -> &'static str {
        self.algorithm().uri()
    }

    fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            MacState::Sha1(m) => Mac::update(m, data),
            MacState::Sha256(m) => Mac::update(m, data),
        }
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        let finished = std::mem::replace(&mut self.state, self.pristine.clone());
        match finished {
            MacState::Sha1(m) => m.finalize().into_bytes().to_vec(),
            MacState::Sha256(m) => m.finalize().into_bytes().to_vec(),
        }
    }

    fn output_len(&self) -> usize {
        match self.pristine {
            MacState::Sha1(_) => 20,
            MacState::Sha256(_) => 32,
        }
    }
}
