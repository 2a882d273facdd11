//! # WS-01 Canonicalization
//!
//! Turns signed XML content into the exact bytes that get hashed.
//!
//! - [`c14n`]: exclusive canonicalization of an owned infoset into the
//!   canonical character sequence
//! - [`canonical_form`]: final byte emission of that sequence (UTF-8, no BOM)
//! - [`hash_stream`]: a write-only sink that folds emitted bytes into a
//!   digest or MAC
//!
//! ## Usage Example
//!
//! ```ignore
//! use shared_crypto::DigestAlgorithm;
//! use ws_01_canonicalization::{ExclusiveCanonicalizer, HashStream};
//!
//! let mut hash = DigestAlgorithm::Sha256.new_hash();
//! let mut stream = HashStream::new(hash.as_mut());
//! ExclusiveCanonicalizer::new().canonicalize_to(&body, &mut stream)?;
//! let digest = stream.flush_hash_and_get_value(None);
//! ```
//!
//! ## Invariants
//!
//! Output for logically identical infosets is byte-identical, whatever
//! serialization they were parsed from.

pub mod c14n;
pub mod canonical_form;
pub mod hash_stream;

pub use c14n::{canonical_bytes, ExclusiveCanonicalizer};
pub use canonical_form::CanonicalFormWriter;
pub use hash_stream::HashStream;
