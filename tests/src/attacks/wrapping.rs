//! # Signature Wrapping
//!
//! The attacker keeps the signed Body somewhere the reference still finds
//! it and puts their own Body where the dispatcher reads it, or adds a
//! second Body next to the signed one. The same goes for the Timestamp
//! that bounds the context's lifetime.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        alice, pipeline, replace_body, signed_message, signed_message_with_timestamp,
    };
    use security_runtime::SecurityConfig;
    use shared_types::namespaces::{name, ns, prefix};
    use shared_types::{SecurityError, XmlAttribute, XmlElement, XmlNode};
    use ws_01_canonicalization::canonical_bytes;

    fn forged_body(id: Option<&str>) -> XmlElement {
        let body = XmlElement::new(Some("s"), name::BODY, ns::SOAP12).with_child(
            XmlElement::new(None, "Transfer", "urn:bank")
                .with_child(XmlElement::new(None, "Amount", "urn:bank").with_text("1000000"))
                .with_child(XmlElement::new(None, "To", "urn:bank").with_text("mallory")),
        );
        match id {
            Some(id) => body.with_attribute(XmlAttribute::qualified(prefix::WSU, name::ID, ns::WSU, id)),
            None => body,
        }
    }

    /// Replace the Body with `forged` and stash the signed one in a header.
    fn wrap(bytes: &[u8], forged: impl FnOnce(&str) -> XmlElement) -> Vec<u8> {
        let mut envelope = XmlElement::from_bytes(bytes).unwrap();
        let signed_id = crate::fixtures::envelope_body_id(&envelope);
        let original = replace_body(&mut envelope, forged(&signed_id));
        envelope
            .child_mut(name::HEADER, ns::SOAP12)
            .unwrap()
            .push_child(XmlElement::new(None, "Wrapper", "urn:attacker").with_child(original));
        canonical_bytes(&envelope)
    }

    #[test]
    fn test_moved_body_fails_signed_body_check() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let attack = wrap(&signed_message(&pipeline, &key, None), |_| forged_body(None));

        let err = pipeline.authenticate_and_authorize(&attack, &token).unwrap_err();
        assert!(matches!(err, SecurityError::SignatureInvalid { ref reason } if reason.contains("Body")));
    }

    #[test]
    fn test_duplicate_id_rejected_as_malformed() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let attack = wrap(&signed_message(&pipeline, &key, None), |id| forged_body(Some(id)));

        assert!(matches!(
            pipeline.authenticate_and_authorize(&attack, &token),
            Err(SecurityError::MalformedWireData { .. })
        ));
    }

    #[test]
    fn test_stripped_signature_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut envelope =
            XmlElement::from_bytes(&signed_message(&pipeline, &key, None)).unwrap();
        envelope
            .child_mut(name::HEADER, ns::SOAP12)
            .and_then(|h| h.child_mut(name::SECURITY, ns::WSSE))
            .unwrap()
            .children
            .clear();

        assert!(matches!(
            pipeline.authenticate_and_authorize(&canonical_bytes(&envelope), &token),
            Err(SecurityError::MalformedWireData { .. })
        ));
    }

    #[test]
    fn test_second_signature_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut envelope =
            XmlElement::from_bytes(&signed_message(&pipeline, &key, None)).unwrap();
        let security = envelope
            .child_mut(name::HEADER, ns::SOAP12)
            .and_then(|h| h.child_mut(name::SECURITY, ns::WSSE))
            .unwrap();
        let copy = security.child(name::SIGNATURE, ns::DSIG).unwrap().clone();
        security.push_child(copy);

        assert!(matches!(
            pipeline.authenticate_and_authorize(&canonical_bytes(&envelope), &token),
            Err(SecurityError::MalformedWireData { .. })
        ));
    }

    #[test]
    fn test_duplicate_body_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut envelope =
            XmlElement::from_bytes(&signed_message(&pipeline, &key, None)).unwrap();
        envelope.push_child(forged_body(None));

        let err = pipeline
            .authenticate_and_authorize(&canonical_bytes(&envelope), &token)
            .unwrap_err();
        assert!(matches!(err, SecurityError::MalformedWireData { ref reason, .. } if reason.contains("more than one Body")));
    }

    #[test]
    fn test_foreign_namespace_body_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut envelope =
            XmlElement::from_bytes(&signed_message(&pipeline, &key, None)).unwrap();
        // A SOAP 1.1 Body inside a SOAP 1.2 envelope.
        let mut foreign = forged_body(None);
        foreign.prefix = Some("soap11".into());
        foreign.namespace = ns::SOAP11.into();
        envelope.push_child(foreign);

        let err = pipeline
            .authenticate_and_authorize(&canonical_bytes(&envelope), &token)
            .unwrap_err();
        assert!(matches!(err, SecurityError::MalformedWireData { ref namespace, .. } if namespace == ns::SOAP11));
    }

    #[test]
    fn test_tampered_timestamp_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let bytes = signed_message_with_timestamp(&pipeline, &key, "2030-01-01T00:00:00Z");
        let extended = String::from_utf8(bytes)
            .unwrap()
            .replace("2030-01-01T00:00:00Z", "2099-01-01T00:00:00Z");

        let err = pipeline
            .authenticate_and_authorize(extended.as_bytes(), &token)
            .unwrap_err();
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn test_removed_timestamp_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut envelope = XmlElement::from_bytes(&signed_message_with_timestamp(
            &pipeline,
            &key,
            "2030-01-01T00:00:00Z",
        ))
        .unwrap();
        envelope
            .child_mut(name::HEADER, ns::SOAP12)
            .and_then(|h| h.child_mut(name::SECURITY, ns::WSSE))
            .unwrap()
            .children
            .retain(|node| !matches!(node, XmlNode::Element(e) if e.is(name::TIMESTAMP, ns::WSU)));

        // The signature still references the Timestamp, so dropping it to
        // lift the expiry breaks verification.
        let err = pipeline
            .authenticate_and_authorize(&canonical_bytes(&envelope), &token)
            .unwrap_err();
        assert!(matches!(err, SecurityError::SignatureInvalid { ref reason } if reason.contains("not found")));
    }
}
