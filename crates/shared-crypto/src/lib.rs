//! # Shared Crypto - Message Security Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-1, SHA-256, SHA-512, HMAC | Reference digests, hash streams |
//! | `symmetric` | HMAC-SHA1, HMAC-SHA256 | Shared-secret signatures |
//! | `signatures` | Ed25519 | Asymmetric signatures |
//! | `ecdsa` | secp256k1 + SHA-256 | Asymmetric signatures |
//!
//! Every algorithm is addressed by its XML-DSig URI through
//! [`DigestAlgorithm`] and [`SignatureAlgorithm`]. RSA is not implemented;
//! its URI resolves to [`CryptoError::UnsupportedAlgorithm`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod signatures;
pub mod signing;
pub mod symmetric;

// Re-exports
pub use algorithms::{DigestAlgorithm, SignatureAlgorithm};
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey};
pub use errors::CryptoError;
pub use hashing::{digest, thumbprint, Digester, IncrementalHash, KeyedHash};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey};
pub use signing::{MessageSigner, MessageVerifier};
pub use symmetric::HmacKey;
