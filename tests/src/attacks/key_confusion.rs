//! # Key and Algorithm Confusion
//!
//! A signature is only worth the key it was checked with. These messages
//! name the right key but were signed with another, or name another
//! algorithm than the token's key speaks.

#[cfg(test)]
mod tests {
    use crate::fixtures::{alice, certificate_chain, pipeline, signed_message};
    use security_runtime::{SecurityConfig, SecurityToken};
    use shared_crypto::{Ed25519KeyPair, HmacKey, Secp256k1KeyPair, SignatureAlgorithm};
    use shared_types::SecurityError;
    use std::sync::Arc;
    use ws_04_signature::KeyIdentifier;

    #[test]
    fn test_impostor_key_under_victim_name() {
        let pipeline = pipeline(SecurityConfig::default());
        let (_, alice_token) = alice();
        let mallory = Ed25519KeyPair::generate();
        let forged = signed_message(
            &pipeline,
            &mallory,
            Some(KeyIdentifier::KeyName("alice".into())),
        );

        let err = pipeline
            .authenticate_and_authorize(&forged, &alice_token)
            .unwrap_err();
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn test_hmac_signature_against_asymmetric_token() {
        let pipeline = pipeline(SecurityConfig::default());
        let (_, token) = alice();
        // A shared-secret MAC must never be accepted where a public key is
        // expected.
        let mac = HmacKey::new(SignatureAlgorithm::HmacSha256, &[0x11; 32]).unwrap();
        let forged = signed_message(&pipeline, &mac, None);

        let err = pipeline.authenticate_and_authorize(&forged, &token).unwrap_err();
        assert!(matches!(err, SecurityError::SignatureInvalid { .. }));
    }

    #[test]
    fn test_ecdsa_signature_against_ed25519_token() {
        let pipeline = pipeline(SecurityConfig::default());
        let (_, token) = alice();
        let forged = signed_message(&pipeline, &Secp256k1KeyPair::generate(), None);
        assert!(pipeline
            .authenticate_and_authorize(&forged, &token)
            .unwrap_err()
            .is_integrity_failure());
    }

    #[test]
    fn test_certificate_swap_detected_before_verification() {
        let pipeline = pipeline(SecurityConfig::default());
        let secret = [0x22u8; 32];
        let signer = HmacKey::new(SignatureAlgorithm::HmacSha256, &secret).unwrap();
        let token = SecurityToken::x509(
            certificate_chain(1),
            Arc::new(HmacKey::new(SignatureAlgorithm::HmacSha256, &secret).unwrap()),
        );
        let other = signed_message(&pipeline, &signer, Some(KeyIdentifier::X509(certificate_chain(2))));

        let err = pipeline.authenticate_and_authorize(&other, &token).unwrap_err();
        assert!(err.is_integrity_failure());
        // Rejected before the identity was ever cached.
        assert!(pipeline.identity_cache().is_empty());
    }

    #[test]
    fn test_truncated_signature_value() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let text = String::from_utf8(signed_message(&pipeline, &key, None)).unwrap();
        let start = text.find("SignatureValue>").unwrap() + "SignatureValue>".len();
        let mut tampered = text.clone();
        // Drop four base64 characters from the value.
        tampered.replace_range(start..start + 4, "");

        let err = pipeline
            .authenticate_and_authorize(tampered.as_bytes(), &token)
            .unwrap_err();
        assert!(matches!(
            err,
            SecurityError::SignatureInvalid { .. } | SecurityError::MalformedWireData { .. }
        ));
    }
}
