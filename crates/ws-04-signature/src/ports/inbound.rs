//! # Inbound Ports (Driving Ports / API)
//!
//! The public signing and verification API.

use crate::domain::entities::{BatchVerificationResult, KeyIdentifier, Signature, VerifiedSignature};
use shared_crypto::MessageSigner;
use shared_types::{SecurityError, XmlElement};

/// Primary signature API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SignatureApi: Send + Sync {
    /// Sign the elements of `document` carrying the given ids.
    ///
    /// # Errors
    /// * `MalformedWireData` - an id is missing or appears twice
    fn sign(
        &self,
        document: &XmlElement,
        ids: &[&str],
        signer: &dyn MessageSigner,
        key_info: Option<KeyIdentifier>,
    ) -> Result<Signature, SecurityError>;

    /// Verify `signature` over `document`, resolving the key from its
    /// `KeyInfo`.
    fn verify(
        &self,
        document: &XmlElement,
        signature: &Signature,
    ) -> Result<VerifiedSignature, SecurityError>;

    /// Verify the `wsse:Security` signature of a SOAP envelope.
    fn verify_envelope(&self, envelope: &XmlElement) -> Result<VerifiedSignature, SecurityError>;

    /// Verify independent envelopes in parallel.
    fn batch_verify(&self, envelopes: &[XmlElement]) -> BatchVerificationResult;
}
