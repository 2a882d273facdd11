//! # Pipeline Flows
//!
//! 1. **Principal token, text encoding**: sign, emit canonical bytes, verify
//! 2. **Binary encoding**: the same flow over the dictionary codec
//! 3. **Certificate token**: chain claim sets come from the identity cache
//! 4. **Parallel inbound**: one pipeline shared by many verifying threads

#[cfg(test)]
mod tests {
    use crate::fixtures::{alice, certificate_chain, envelope, pipeline, signed_message};
    use chrono::Utc;
    use rayon::prelude::*;
    use security_runtime::{DigestSetting, MessageEncoding, SecurityConfig, SecurityToken};
    use shared_crypto::{Ed25519KeyPair, HmacKey, SignatureAlgorithm};
    use shared_types::namespaces::{name, ns, prefix};
    use shared_types::{XmlAttribute, XmlElement};
    use std::sync::Arc;
    use ws_02_claims::{claim_types, rights, Claim};
    use ws_03_endpoint_identity::EndpointIdentity;
    use ws_04_signature::{find_security_signature, KeyIdentifier, Signature, SignatureEngine};
    use ws_05_authorization::{ContextKind, PropertyValue, IDENTITIES_PROPERTY};

    // =============================================================================
    // PRINCIPAL TOKENS
    // =============================================================================

    #[test]
    fn test_principal_roundtrip_text() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let bytes = signed_message(&pipeline, &key, Some(KeyIdentifier::KeyName("alice".into())));

        let security = pipeline.authenticate(&bytes, &token).unwrap();
        assert_eq!(security.authorization_context().kind(), ContextKind::Default);
        assert_eq!(
            security.primary_identity(),
            Some(&EndpointIdentity::dns("alice.example"))
        );
        assert!(!security.is_expired(Utc::now()));

        let claims = &security.claim_sets()[0];
        let identity = Claim::create_dns_claim("alice.example").with_right(rights::IDENTITY);
        assert!(claims.contains_claim(&identity).unwrap());
        assert!(matches!(
            security.authorization_context().property(IDENTITIES_PROPERTY),
            Some(PropertyValue::Identities(ids)) if ids.len() == 1
        ));
    }

    #[test]
    fn test_binary_roundtrip_with_sha1_digests() {
        let config = SecurityConfig::default()
            .with_encoding(MessageEncoding::Binary)
            .with_digest(DigestSetting::Sha1);
        let pipeline = pipeline(config);
        let (key, token) = alice();
        let bytes = signed_message(&pipeline, &key, None);

        // Binary records are not XML text.
        assert!(XmlElement::from_bytes(&bytes).is_err());
        let context = pipeline.authenticate_and_authorize(&bytes, &token).unwrap();
        assert_eq!(context.identities(), &[EndpointIdentity::dns("alice.example")]);
    }

    #[test]
    fn test_canonical_output_is_stable_across_reparse() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, _) = alice();
        let bytes = signed_message(&pipeline, &key, None);

        let reparsed = pipeline.decode(&bytes).unwrap();
        assert_eq!(pipeline.encode(&reparsed), bytes);
    }

    #[test]
    fn test_extra_header_reference_is_signed() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut message = envelope();
        let to = XmlElement::new(Some("a"), "To", "http://www.w3.org/2005/08/addressing")
            .with_attribute(XmlAttribute::qualified(prefix::WSU, name::ID, ns::WSU, "to"))
            .with_text("https://bank.example/transfer");
        message.children.insert(
            0,
            shared_types::XmlNode::Element(
                XmlElement::new(Some("s"), name::HEADER, ns::SOAP12).with_child(to),
            ),
        );

        let bytes = pipeline
            .secure_outbound(&mut message, &key, None, &["to"])
            .unwrap();
        assert!(pipeline.authenticate_and_authorize(&bytes, &token).is_ok());

        let received = pipeline.decode(&bytes).unwrap();
        let signature = Signature::read_from(find_security_signature(&received).unwrap()).unwrap();
        let verified = SignatureEngine::default()
            .verify(&received, &signature, &key.public_key())
            .unwrap();
        assert!(verified.covers("to"));
        assert_eq!(verified.referenced_ids.len(), 2);
    }

    // =============================================================================
    // CERTIFICATE TOKENS
    // =============================================================================

    #[test]
    fn test_certificate_chain_claims_through_cache() {
        let pipeline = pipeline(SecurityConfig::default());
        let chain = certificate_chain(9);
        let secret = [0x5Au8; 32];
        let signer = HmacKey::new(SignatureAlgorithm::HmacSha256, &secret).unwrap();
        let token = SecurityToken::x509(
            chain.clone(),
            Arc::new(HmacKey::new(SignatureAlgorithm::HmacSha256, &secret).unwrap()),
        );

        let mut first = None;
        for _ in 0..3 {
            let bytes = signed_message(&pipeline, &signer, Some(KeyIdentifier::X509(chain.clone())));
            let context = pipeline.authenticate_and_authorize(&bytes, &token).unwrap();
            let set = context.claim_sets()[0].clone();
            assert!(!set.is_self_issued());
            assert!(set.issuer().is_self_issued());
            assert_eq!(
                set.find_claims(Some(claim_types::THUMBPRINT), Some(rights::IDENTITY))
                    .count(),
                1
            );
            assert_eq!(context.identities(), &[EndpointIdentity::x509(chain.clone())]);

            // Cached claim sets are shared, not rebuilt.
            match &first {
                None => first = Some(set),
                Some(previous) => assert_eq!(previous, &set),
            }
        }
        assert_eq!(pipeline.identity_cache().len(), 1);
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[test]
    fn test_parallel_inbound_on_shared_pipeline() {
        let pipeline = pipeline(SecurityConfig::default());
        let senders: Vec<(Ed25519KeyPair, SecurityToken)> = (0..8).map(|_| alice()).collect();
        let messages: Vec<Vec<u8>> = senders
            .iter()
            .map(|(key, _)| signed_message(&pipeline, key, None))
            .collect();

        let results: Vec<bool> = messages
            .par_iter()
            .zip(senders.par_iter())
            .map(|(bytes, (_, token))| pipeline.authenticate_and_authorize(bytes, token).is_ok())
            .collect();
        assert!(results.into_iter().all(|ok| ok));

        // Crossed keys fail.
        let crossed = pipeline.authenticate_and_authorize(&messages[0], &senders[1].1);
        assert!(crossed.unwrap_err().is_integrity_failure());
    }
}
