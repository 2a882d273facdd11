//! # Signature Engine
//!
//! Signs and verifies `ds:Signature` elements over same-document
//! references.
//!
//! ## Signing
//!
//! 1. Canonicalize each referenced element into a [`HashStream`]
//! 2. Record the digest in a `Reference`
//! 3. Canonicalize `SignedInfo` and sign it with caller key material
//!
//! ## Verification
//!
//! 1. Reject anything but `#id` references and exclusive C14N
//! 2. Recompute every reference digest; compare in constant time
//! 3. Check the signature value over the received `SignedInfo`
//!
//! Any mismatch is `SecurityError::SignatureInvalid`.

use crate::domain::entities::{
    KeyIdentifier, Reference, Signature, SignatureValueElement, SignedInfo, VerifiedSignature,
};
use crate::domain::errors::{signing_failure, verification_failure};
use crate::domain::resolution::IdIndex;
use shared_crypto::{DigestAlgorithm, IncrementalHash, MessageSigner, MessageVerifier};
use shared_types::namespaces::{algorithm, name, ns};
use shared_types::security::{generate_xml_id, match_buffers};
use shared_types::{SecurityError, XmlElement};
use std::io::Write;
use tracing::{debug, info, warn};
use ws_01_canonicalization::{canonical_bytes, ExclusiveCanonicalizer, HashStream};

/// Stateless signing and verification over in-memory documents.
#[derive(Debug, Clone, Copy)]
pub struct SignatureEngine {
    digest_algorithm: DigestAlgorithm,
    diagnostics: bool,
}

impl Default for SignatureEngine {
    fn default() -> Self {
        Self::new(DigestAlgorithm::default())
    }
}

impl SignatureEngine {
    /// Engine that digests new references with `digest_algorithm`.
    pub fn new(digest_algorithm: DigestAlgorithm) -> Self {
        Self {
            digest_algorithm,
            diagnostics: false,
        }
    }

    /// Emit canonical bytes on the digest trace.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.digest_algorithm
    }

    fn stream<'h>(&self, hash: &'h mut dyn IncrementalHash) -> HashStream<'h> {
        if self.diagnostics {
            HashStream::with_diagnostics(hash)
        } else {
            HashStream::new(hash)
        }
    }

    fn pre_canonical(&self, element: &XmlElement) -> Option<Vec<u8>> {
        self.diagnostics.then(|| element.to_xml_string().into_bytes())
    }

    // =========================================================================
    // SIGNING
    // =========================================================================

    /// Sign the elements of `root` carrying the given ids.
    pub fn sign(
        &self,
        root: &XmlElement,
        ids: &[&str],
        signer: &dyn MessageSigner,
        key_info: Option<KeyIdentifier>,
    ) -> Result<Signature, SecurityError> {
        let index = IdIndex::build(root)?;
        let mut hash = self.digest_algorithm.new_hash();
        let mut stream = self.stream(hash.as_mut());
        let mut canonicalizer = ExclusiveCanonicalizer::new();

        let mut references = Vec::with_capacity(ids.len());
        for id in ids {
            let target = index.get(id).ok_or_else(|| {
                SecurityError::malformed(
                    &root.local_name,
                    &root.namespace,
                    format!("no element with Id '{id}'"),
                )
            })?;
            stream.reset_in_place();
            canonicalizer.canonicalize_to(target, &mut stream)?;
            let pre = self.pre_canonical(target);
            let value = stream.flush_hash_and_get_value(pre.as_deref());
            debug!(reference = %id, element = %target.qualified_name(), "reference digested");
            references.push(Reference::new(id, self.digest_algorithm, value));
        }

        self.finish_signature(references, signer, key_info)
    }

    /// Sign parts that are already canonical, as `(id, bytes)` pairs.
    pub fn sign_canonical(
        &self,
        parts: &[(&str, &[u8])],
        signer: &dyn MessageSigner,
        key_info: Option<KeyIdentifier>,
    ) -> Result<Signature, SecurityError> {
        let mut hash = self.digest_algorithm.new_hash();
        let mut stream = self.stream(hash.as_mut());

        let mut references = Vec::with_capacity(parts.len());
        for (id, bytes) in parts {
            stream.reset_in_place();
            stream.write_all(bytes)?;
            let value = stream.flush_hash_and_get_value(None);
            debug!(reference = %id, length = bytes.len(), "reference digested");
            references.push(Reference::new(id, self.digest_algorithm, value));
        }

        self.finish_signature(references, signer, key_info)
    }

    fn finish_signature(
        &self,
        references: Vec<Reference>,
        signer: &dyn MessageSigner,
        key_info: Option<KeyIdentifier>,
    ) -> Result<Signature, SecurityError> {
        if references.is_empty() {
            return Err(SecurityError::malformed(
                name::SIGNED_INFO,
                ns::DSIG,
                "nothing to sign",
            ));
        }
        let signed_info = SignedInfo::new(signer.algorithm(), references);
        let canonical = canonical_bytes(&signed_info.to_element());
        let value = signer.sign(&canonical).map_err(signing_failure)?;

        debug!(
            algorithm = signer.algorithm().uri(),
            references = signed_info.references().len(),
            "signed info signed"
        );
        Ok(Signature::new(
            Some(generate_xml_id()),
            signed_info,
            value,
            key_info,
        ))
    }

    // =========================================================================
    // VERIFICATION
    // =========================================================================

    /// Verify `signature` against the elements of `root`.
    pub fn verify(
        &self,
        root: &XmlElement,
        signature: &Signature,
        verifier: &dyn MessageVerifier,
    ) -> Result<VerifiedSignature, SecurityError> {
        let index = IdIndex::build(root)?;
        let mut canonicalizer = ExclusiveCanonicalizer::new();
        self.verify_with_targets(signature, verifier, |id, stream| {
            let Some(target) = index.get(id) else {
                return Ok(false);
            };
            canonicalizer.canonicalize_to(target, stream)?;
            Ok(true)
        })
    }

    /// Verify `signature` against parts that are already canonical.
    pub fn verify_canonical(
        &self,
        signature: &Signature,
        parts: &[(&str, &[u8])],
        verifier: &dyn MessageVerifier,
    ) -> Result<VerifiedSignature, SecurityError> {
        self.verify_with_targets(signature, verifier, |id, stream| {
            let Some((_, bytes)) = parts.iter().find(|(part, _)| *part == id) else {
                return Ok(false);
            };
            stream.write_all(bytes)?;
            Ok(true)
        })
    }

    /// `write_target` writes the canonical bytes of the target with the
    /// given id, or returns false when there is none.
    fn verify_with_targets<F>(
        &self,
        signature: &Signature,
        verifier: &dyn MessageVerifier,
        mut write_target: F,
    ) -> Result<VerifiedSignature, SecurityError>
    where
        F: FnMut(&str, &mut HashStream<'_>) -> Result<bool, SecurityError>,
    {
        let signed_info = signature.signed_info();
        if signed_info.canonicalization_method() != algorithm::EXC_C14N {
            return Err(SecurityError::Unsupported(format!(
                "canonicalization method {}",
                signed_info.canonicalization_method()
            )));
        }

        let mut referenced_ids = Vec::with_capacity(signed_info.references().len());
        for reference in signed_info.references() {
            let id = reference.target_id().ok_or_else(|| {
                SecurityError::Unsupported(format!("reference URI '{}'", reference.uri()))
            })?;
            if !reference.uses_exclusive_c14n() {
                return Err(SecurityError::Unsupported(format!(
                    "transforms {:?} on reference '#{id}'",
                    reference.transforms()
                )));
            }

            let mut hash = reference.digest_algorithm().new_hash();
            let mut stream = self.stream(hash.as_mut());
            if !write_target(id, &mut stream)? {
                warn!(reference = %id, "signed reference not found");
                return Err(SecurityError::signature_invalid(format!(
                    "reference '#{id}' not found"
                )));
            }
            let computed = stream.flush_hash_and_get_value(None);
            if !match_buffers(&computed, reference.digest_value()) {
                warn!(reference = %id, "digest mismatch");
                return Err(SecurityError::signature_invalid(format!(
                    "digest mismatch for reference '#{id}'"
                )));
            }
            debug!(reference = %id, "reference digest matched");
            referenced_ids.push(id.to_owned());
        }

        let algorithm = signed_info.signature_algorithm();
        let canonical = canonical_bytes(signature.signed_info_element());
        verifier
            .verify_with(algorithm, &canonical, signature.signature_value())
            .map_err(|e| {
                warn!(algorithm = algorithm.uri(), error = %e, "signature value rejected");
                verification_failure(e)
            })?;

        info!(
            algorithm = algorithm.uri(),
            references = referenced_ids.len(),
            "signature verified"
        );
        Ok(VerifiedSignature {
            signature_algorithm: algorithm,
            referenced_ids,
            key_info: signature.key_info().cloned(),
        })
    }
}
