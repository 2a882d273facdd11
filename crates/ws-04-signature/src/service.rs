//! # Signature Service
//!
//! Application service layer that implements the `SignatureApi` trait.
//!
//! ## Architecture
//!
//! - Implements the inbound port (`SignatureApi`)
//! - Uses the outbound port (`KeyResolver`) to find verification keys
//! - Delegates canonicalization, digests and signature checks to the
//!   domain engine

use crate::domain::engine::SignatureEngine;
use crate::domain::entities::{
    BatchVerificationResult, KeyIdentifier, Signature, VerifiedSignature,
};
use crate::domain::resolution::find_security_signature;
use crate::ports::inbound::SignatureApi;
use crate::ports::outbound::KeyResolver;
use rayon::prelude::*;
use shared_crypto::MessageSigner;
use shared_types::{SecurityError, XmlElement};
use tracing::{debug, warn};

/// Signature service over an engine and a key resolver.
pub struct SignatureService<R: KeyResolver> {
    engine: SignatureEngine,
    resolver: R,
}

impl<R: KeyResolver> SignatureService<R> {
    pub fn new(engine: SignatureEngine, resolver: R) -> Self {
        Self { engine, resolver }
    }

    pub fn engine(&self) -> &SignatureEngine {
        &self.engine
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

impl<R: KeyResolver> SignatureApi for SignatureService<R> {
    fn sign(
        &self,
        document: &XmlElement,
        ids: &[&str],
        signer: &dyn MessageSigner,
        key_info: Option<KeyIdentifier>,
    ) -> Result<Signature, SecurityError> {
        self.engine.sign(document, ids, signer, key_info)
    }

    fn verify(
        &self,
        document: &XmlElement,
        signature: &Signature,
    ) -> Result<VerifiedSignature, SecurityError> {
        let algorithm = signature.signed_info().signature_algorithm();
        let verifier = self
            .resolver
            .resolve_verifier(signature.key_info(), algorithm)?;
        self.engine.verify(document, signature, verifier.as_ref())
    }

    fn verify_envelope(&self, envelope: &XmlElement) -> Result<VerifiedSignature, SecurityError> {
        let signature = Signature::read_from(find_security_signature(envelope)?)?;
        self.verify(envelope, &signature)
    }

    fn batch_verify(&self, envelopes: &[XmlElement]) -> BatchVerificationResult {
        let results: Vec<_> = envelopes
            .par_iter()
            .map(|envelope| self.verify_envelope(envelope))
            .collect();
        let batch = BatchVerificationResult::from_results(results);

        if batch.all_valid {
            debug!(count = batch.valid_count, "batch verified");
        } else {
            warn!(
                valid = batch.valid_count,
                invalid = batch.invalid_count,
                "batch verification rejected messages"
            );
        }
        batch
    }
}
