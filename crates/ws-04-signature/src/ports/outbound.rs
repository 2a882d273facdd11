//! # Outbound Ports (Driven Ports / SPI)
//!
//! Key material is never owned by the engine. It asks a resolver for the
//! verifier that matches a signature's `KeyInfo`.

use crate::domain::entities::KeyIdentifier;
use shared_crypto::{MessageVerifier, SignatureAlgorithm};
use shared_types::SecurityError;
use std::sync::Arc;

/// Source of verification keys.
pub trait KeyResolver: Send + Sync {
    /// Verifier for `key`, or for the default key when the signature
    /// carries no `KeyInfo`.
    ///
    /// # Errors
    /// * `SignatureInvalid` - no key is known for the identifier
    fn resolve_verifier(
        &self,
        key: Option<&KeyIdentifier>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Arc<dyn MessageVerifier>, SecurityError>;
}

impl<R: KeyResolver + ?Sized> KeyResolver for Arc<R> {
    fn resolve_verifier(
        &self,
        key: Option<&KeyIdentifier>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Arc<dyn MessageVerifier>, SecurityError> {
        (**self).resolve_verifier(key, algorithm)
    }
}
