//! Shared test fixtures.

use security_runtime::{SecurityConfig, SecurityPipeline, SecurityToken};
use shared_crypto::{Ed25519KeyPair, MessageSigner};
use shared_types::namespaces::{name, ns, prefix};
use shared_types::{XmlElement, XmlNode};
use std::sync::Arc;
use ws_02_claims::WellKnownClaimSets;
use ws_03_endpoint_identity::{EndpointIdentity, X509Certificate, X509CertificateChain};
use ws_04_signature::KeyIdentifier;

pub const ENVELOPE: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><Transfer xmlns="urn:bank"><Amount>100</Amount><To>bob</To></Transfer></s:Body></s:Envelope>"#;

pub fn envelope() -> XmlElement {
    XmlElement::parse(ENVELOPE).expect("fixture envelope parses")
}

pub fn pipeline(config: SecurityConfig) -> SecurityPipeline {
    SecurityPipeline::new(config, Arc::new(WellKnownClaimSets::new()))
}

/// Alice's key and a token naming it `alice`.
pub fn alice() -> (Ed25519KeyPair, SecurityToken) {
    let key = Ed25519KeyPair::generate();
    let token = SecurityToken::principal(
        EndpointIdentity::dns("alice.example"),
        Some("alice".into()),
        Arc::new(key.public_key()),
    );
    (key, token)
}

/// A chain of opaque DER blobs; only their thumbprints matter here.
pub fn certificate_chain(seed: u8) -> X509CertificateChain {
    let certificate = |tag: u8| X509Certificate::from_der(vec![0x30, 0x03, seed, tag, 0x00]);
    X509CertificateChain::with_supporting(
        certificate(0).expect("non-empty DER"),
        vec![certificate(1).expect("non-empty DER")],
    )
}

/// A freshly secured copy of [`ENVELOPE`].
pub fn signed_message(
    pipeline: &SecurityPipeline,
    signer: &dyn MessageSigner,
    key_info: Option<KeyIdentifier>,
) -> Vec<u8> {
    let mut envelope = envelope();
    pipeline
        .secure_outbound(&mut envelope, signer, key_info, &[])
        .expect("outbound signing succeeds")
}

/// A secured copy of [`ENVELOPE`] carrying a `wsu:Timestamp` that
/// expires at `expires`.
pub fn signed_message_with_timestamp(
    pipeline: &SecurityPipeline,
    signer: &dyn MessageSigner,
    expires: &str,
) -> Vec<u8> {
    let mut envelope = envelope();
    let timestamp = XmlElement::new(Some(prefix::WSU), name::TIMESTAMP, ns::WSU)
        .with_child(XmlElement::new(Some(prefix::WSU), name::EXPIRES, ns::WSU).with_text(expires));
    let header = XmlElement::new(Some("s"), name::HEADER, ns::SOAP12).with_child(
        XmlElement::new(Some(prefix::WSSE), name::SECURITY, ns::WSSE).with_child(timestamp),
    );
    envelope.children.insert(0, XmlNode::Element(header));
    pipeline
        .secure_outbound(&mut envelope, signer, None, &[])
        .expect("outbound signing succeeds")
}

/// Position of the SOAP Body among the envelope's children.
pub fn body_position(envelope: &XmlElement) -> usize {
    envelope
        .children
        .iter()
        .position(|node| matches!(node, XmlNode::Element(e) if e.is(name::BODY, ns::SOAP12)))
        .expect("envelope has a Body")
}

/// Swap the Body for `replacement`, returning the original.
pub fn replace_body(envelope: &mut XmlElement, replacement: XmlElement) -> XmlElement {
    let position = body_position(envelope);
    match std::mem::replace(&mut envelope.children[position], XmlNode::Element(replacement)) {
        XmlNode::Element(original) => original,
        XmlNode::Text(_) => unreachable!("body_position only matches elements"),
    }
}

/// The `wsu:Id` the pipeline gave the Body.
pub fn envelope_body_id(envelope: &XmlElement) -> String {
    envelope
        .child(name::BODY, ns::SOAP12)
        .and_then(|body| body.id())
        .expect("signed Body carries an id")
        .to_owned()
}
