//! # WS-04 Signature Engine
//!
//! XML-DSig signatures over exclusively canonicalized references.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): entities, id resolution and the signing
//!   and verification engine. Pure computation over in-memory XML.
//! - **Ports Layer** (`ports/`): `SignatureApi` (inbound) and `KeyResolver`
//!   (outbound; key material is supplied by the caller)
//! - **Adapters Layer** (`adapters/`): an in-memory `KeyRing` resolver
//! - **Service Layer** (`service.rs`): wires the engine to a resolver and
//!   verifies independent messages in parallel
//!
//! ## Security Notes
//!
//! - Every reference digest is recomputed and compared in constant time
//!   before the signature value is checked. Any mismatch is
//!   `SecurityError::SignatureInvalid`.
//! - Documents with duplicate `Id`/`wsu:Id` values are rejected before any
//!   reference is resolved, so a reference cannot be redirected to a
//!   wrapped copy of the signed element.
//! - Only same-document references (`#id`) and exclusive C14N are accepted.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::key_ring::KeyRing;
pub use domain::engine::SignatureEngine;
pub use domain::entities::{
    BatchVerificationResult, KeyIdentifier, Reference, Signature, SignatureValueElement,
    SignedInfo, VerifiedSignature,
};
pub use domain::resolution::{find_security_signature, IdIndex};
pub use ports::inbound::SignatureApi;
pub use ports::outbound::KeyResolver;
pub use service::SignatureService;
