//! # Security Pipeline
//!
//! The two operations the dispatcher sees.
//!
//! ## Inbound
//!
//! ```text
//! bytes ─→ decode ─→ ds:Signature ─→ verify (token key) ─→ identity
//!                                                             │
//!      AuthorizationContext ←─ policies ←─ claim set ←────────┘
//! ```
//!
//! The Body and any `wsu:Timestamp` must both be covered by the verified
//! signature. An unsigned Timestamp is rejected rather than trusted for
//! the context's expiration time.
//!
//! ## Outbound
//!
//! ```text
//! envelope ─→ Body/Timestamp wsu:Id ─→ sign ─→ wsse:Security/ds:Signature ─→ bytes
//! ```

use crate::config::{MessageEncoding, SecurityConfig};
use crate::token::SecurityToken;
use chrono::{DateTime, Duration, Utc};
use shared_crypto::MessageSigner;
use shared_types::namespaces::{name, ns, prefix};
use shared_types::security::{generate_unique_id, generate_xml_id};
use shared_types::{DictionaryManager, SecurityError, XmlAttribute, XmlElement, XmlNode};
use std::sync::Arc;
use tracing::{debug, info, warn};
use ws_01_canonicalization::canonical_bytes;
use ws_02_claims::{rights, ClaimSet, WellKnownClaimSets};
use ws_03_endpoint_identity::{EndpointIdentity, IdentityCache};
use ws_04_signature::domain::resolution::soap_parts;
use ws_04_signature::{
    find_security_signature, KeyIdentifier, Signature, SignatureEngine, VerifiedSignature,
};
use ws_05_authorization::{
    AuthorizationContext, AuthorizationPolicy, EvaluationContext, PolicyEvaluator, PolicyState,
    PropertyValue, UnconditionalPolicy, IDENTITIES_PROPERTY,
};

// =============================================================================
// TOKEN POLICY
// =============================================================================

/// Grants the authenticated token's claim set and names its identity.
struct TokenPolicy {
    id: String,
    issuance: ClaimSet,
    identity: EndpointIdentity,
    expiration_time: DateTime<Utc>,
}

impl AuthorizationPolicy for TokenPolicy {
    fn id(&self) -> &str {
        &self.id
    }

    fn issuer(&self) -> &ClaimSet {
        self.issuance.issuer()
    }

    fn evaluate(
        &self,
        context: &mut EvaluationContext,
        state: PolicyState,
    ) -> Result<(PolicyState, bool), SecurityError> {
        context.add_claim_set(self, self.issuance.clone());
        context.record_expiration_time(self.expiration_time);
        context.set_property(
            IDENTITIES_PROPERTY,
            PropertyValue::Identities(vec![self.identity.clone()]),
        );
        Ok((state, true))
    }
}

// =============================================================================
// SERVICE SECURITY CONTEXT
// =============================================================================

/// What the dispatcher sees of an authorized message.
#[derive(Debug, Clone)]
pub struct ServiceSecurityContext {
    authorization: AuthorizationContext,
}

impl ServiceSecurityContext {
    pub fn new(authorization: AuthorizationContext) -> Self {
        Self { authorization }
    }

    /// Context for a caller that presented no token.
    pub fn anonymous() -> Self {
        Self::new(AuthorizationContext::empty())
    }

    pub fn authorization_context(&self) -> &AuthorizationContext {
        &self.authorization
    }

    pub fn claim_sets(&self) -> &[ClaimSet] {
        self.authorization.claim_sets()
    }

    pub fn identities(&self) -> &[EndpointIdentity] {
        self.authorization.identities()
    }

    /// The first identity that took part in the decision.
    pub fn primary_identity(&self) -> Option<&EndpointIdentity> {
        self.identities().first()
    }

    pub fn is_anonymous(&self) -> bool {
        self.primary_identity().is_none()
    }

    pub fn expiration_time(&self) -> DateTime<Utc> {
        self.authorization.expiration_time()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.authorization.is_expired(now)
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

pub struct SecurityPipeline {
    config: SecurityConfig,
    engine: SignatureEngine,
    evaluator: PolicyEvaluator,
    well_known: Arc<WellKnownClaimSets>,
    identity_cache: Arc<IdentityCache>,
    dictionary: DictionaryManager,
    policies: Vec<Arc<dyn AuthorizationPolicy>>,
}

impl SecurityPipeline {
    pub fn new(config: SecurityConfig, well_known: Arc<WellKnownClaimSets>) -> Self {
        let engine = SignatureEngine::new(config.digest.algorithm())
            .with_diagnostics(config.canonical_diagnostics);
        let evaluator = match config.max_evaluation_passes {
            Some(passes) => PolicyEvaluator::with_max_passes(passes),
            None => PolicyEvaluator::new(),
        };
        let identity_cache = Arc::new(IdentityCache::new(config.identity_cache_capacity));
        Self {
            config,
            engine,
            evaluator,
            well_known,
            identity_cache,
            dictionary: DictionaryManager::ws_security(),
            policies: Vec::new(),
        }
    }

    /// Share an identity cache with other pipelines.
    pub fn with_identity_cache(mut self, cache: Arc<IdentityCache>) -> Self {
        self.identity_cache = cache;
        self
    }

    /// Add a policy evaluated after the token policy on every message.
    pub fn with_policy(mut self, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    pub fn identity_cache(&self) -> &IdentityCache {
        &self.identity_cache
    }

    /// Verify an inbound message against `token` and evaluate policies
    /// over the token's claims.
    pub fn authenticate_and_authorize(
        &self,
        raw_message: &[u8],
        token: &SecurityToken,
    ) -> Result<AuthorizationContext, SecurityError> {
        let envelope = self.decode(raw_message)?;
        let (header, body) = soap_parts(&envelope)?;
        let signature = Signature::read_from(find_security_signature(&envelope)?)?;
        if !token.matches(signature.key_info()) {
            warn!("signature key does not match the security token");
            return Err(SecurityError::signature_invalid(
                "signature key does not match the security token",
            ));
        }

        let verified = self.engine.verify(&envelope, &signature, token.verifier())?;
        self.check_body_signed(body, &verified)?;
        let timestamp = message_timestamp(header)?;
        check_timestamp_signed(timestamp, &verified)?;
        let expiration_time = self.message_expiration(timestamp)?;

        let (identity, claim_set) = self.token_claims(token)?;
        let mut policies: Vec<Arc<dyn AuthorizationPolicy>> =
            Vec::with_capacity(self.policies.len() + 1);
        policies.push(Arc::new(TokenPolicy {
            id: generate_unique_id(),
            issuance: claim_set,
            identity: identity.clone(),
            expiration_time,
        }));
        policies.extend(self.policies.iter().cloned());

        let context = self.evaluator.evaluate(&policies)?;
        info!(
            identity = %identity,
            claim_sets = context.claim_sets().len(),
            "message authorized"
        );
        Ok(context)
    }

    /// [`authenticate_and_authorize`](Self::authenticate_and_authorize),
    /// wrapped for the dispatcher.
    pub fn authenticate(
        &self,
        raw_message: &[u8],
        token: &SecurityToken,
    ) -> Result<ServiceSecurityContext, SecurityError> {
        self.authenticate_and_authorize(raw_message, token)
            .map(ServiceSecurityContext::new)
    }

    /// Authorization for an unauthenticated caller: the anonymous claim
    /// set plus the configured policies.
    pub fn authorize_anonymous(&self) -> Result<AuthorizationContext, SecurityError> {
        let mut policies: Vec<Arc<dyn AuthorizationPolicy>> = vec![Arc::new(
            UnconditionalPolicy::new(self.well_known.anonymous().clone(), DateTime::<Utc>::MAX_UTC),
        )];
        policies.extend(self.policies.iter().cloned());
        self.evaluator.evaluate(&policies)
    }

    /// Sign the Body, any `wsu:Timestamp` and `extra_ids` of `envelope`,
    /// place the signature in `wsse:Security`, and encode the result.
    ///
    /// A Body or Timestamp without an id is given a fresh `wsu:Id`.
    pub fn secure_outbound(
        &self,
        envelope: &mut XmlElement,
        signer: &dyn MessageSigner,
        key_info: Option<KeyIdentifier>,
        extra_ids: &[&str],
    ) -> Result<Vec<u8>, SecurityError> {
        let body_id = ensure_body_id(envelope)?;
        let timestamp_id = ensure_timestamp_id(envelope)?;
        let mut ids = Vec::with_capacity(extra_ids.len() + 2);
        ids.push(body_id.as_str());
        ids.extend(timestamp_id.as_deref());
        for &id in extra_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let signature = self.engine.sign(envelope, &ids, signer, key_info)?;
        security_header(envelope)?.push_child(signature.to_element());
        debug!(references = ids.len(), "outbound message signed");
        Ok(self.encode(envelope))
    }

    pub fn decode(&self, raw_message: &[u8]) -> Result<XmlElement, SecurityError> {
        match self.config.encoding {
            MessageEncoding::Text => XmlElement::from_bytes(raw_message),
            MessageEncoding::Binary => self.dictionary.decode(raw_message),
        }
    }

    pub fn encode(&self, envelope: &XmlElement) -> Vec<u8> {
        match self.config.encoding {
            MessageEncoding::Text => canonical_bytes(envelope),
            MessageEncoding::Binary => self.dictionary.encode(envelope),
        }
    }

    fn check_body_signed(
        &self,
        body: &XmlElement,
        verified: &VerifiedSignature,
    ) -> Result<(), SecurityError> {
        if !self.config.require_signed_body {
            return Ok(());
        }
        if body.id().is_some_and(|id| verified.covers(id)) {
            Ok(())
        } else {
            warn!("message body is not signed");
            Err(SecurityError::signature_invalid(
                "Body is not covered by the signature",
            ))
        }
    }

    /// `wsu:Timestamp/wsu:Expires` plus the allowed skew, or no limit.
    fn message_expiration(
        &self,
        timestamp: Option<&XmlElement>,
    ) -> Result<DateTime<Utc>, SecurityError> {
        let Some(expires) = timestamp.and_then(|t| t.child(name::EXPIRES, ns::WSU)) else {
            return Ok(DateTime::<Utc>::MAX_UTC);
        };

        let text = expires.text();
        let parsed = DateTime::parse_from_rfc3339(text.trim()).map_err(|e| {
            SecurityError::malformed(name::EXPIRES, ns::WSU, format!("invalid timestamp: {e}"))
        })?;
        let skew = Duration::seconds(self.config.clock_skew_secs as i64);
        Ok(parsed
            .with_timezone(&Utc)
            .checked_add_signed(skew)
            .unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// Identity and claim set for the token. Certificate tokens go through
    /// the identity cache.
    fn token_claims(
        &self,
        token: &SecurityToken,
    ) -> Result<(EndpointIdentity, ClaimSet), SecurityError> {
        match token {
            SecurityToken::X509 { chain, .. } => {
                let cached = self.identity_cache.get_or_insert(chain)?;
                Ok((cached.identity.clone(), cached.claim_set.clone()))
            }
            SecurityToken::Principal { identity, .. } => {
                let claim = identity.identity_claim();
                let claim_set =
                    ClaimSet::self_issued(vec![claim.clone().with_right(rights::IDENTITY), claim]);
                Ok((identity.clone(), claim_set))
            }
        }
    }
}

impl std::fmt::Debug for SecurityPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityPipeline")
            .field("config", &self.config)
            .field("policies", &self.policies.len())
            .finish()
    }
}

// =============================================================================
// ENVELOPE HELPERS
// =============================================================================

/// The `wsu:Timestamp` in `Header/wsse:Security`. At most one is accepted.
fn message_timestamp(header: Option<&XmlElement>) -> Result<Option<&XmlElement>, SecurityError> {
    let Some(security) = header.and_then(|h| h.child(name::SECURITY, ns::WSSE)) else {
        return Ok(None);
    };
    let mut timestamps = security
        .child_elements()
        .filter(|c| c.is(name::TIMESTAMP, ns::WSU));
    let timestamp = timestamps.next();
    if timestamps.next().is_some() {
        return Err(SecurityError::malformed(
            name::SECURITY,
            ns::WSSE,
            "more than one wsu:Timestamp",
        ));
    }
    Ok(timestamp)
}

fn check_timestamp_signed(
    timestamp: Option<&XmlElement>,
    verified: &VerifiedSignature,
) -> Result<(), SecurityError> {
    match timestamp {
        Some(ts) if !ts.id().is_some_and(|id| verified.covers(id)) => {
            warn!("message timestamp is not signed");
            Err(SecurityError::signature_invalid(
                "Timestamp is not covered by the signature",
            ))
        }
        _ => Ok(()),
    }
}

fn soap_namespace(envelope: &XmlElement) -> Result<String, SecurityError> {
    if envelope.is(name::ENVELOPE, ns::SOAP12) || envelope.is(name::ENVELOPE, ns::SOAP11) {
        Ok(envelope.namespace.clone())
    } else {
        Err(SecurityError::malformed(
            &envelope.local_name,
            &envelope.namespace,
            "expected a SOAP Envelope",
        ))
    }
}

/// Id of the Body, adding a `wsu:Id` when it has none.
fn ensure_body_id(envelope: &mut XmlElement) -> Result<String, SecurityError> {
    let soap = soap_namespace(envelope)?;
    let body = envelope
        .child_mut(name::BODY, &soap)
        .ok_or_else(|| SecurityError::malformed(name::ENVELOPE, &soap, "missing Body"))?;
    Ok(ensure_id(body))
}

/// Id of the `wsu:Timestamp` in `wsse:Security`, added when it has none.
fn ensure_timestamp_id(envelope: &mut XmlElement) -> Result<Option<String>, SecurityError> {
    let soap = soap_namespace(envelope)?;
    let timestamp = envelope
        .child_mut(name::HEADER, &soap)
        .and_then(|h| h.child_mut(name::SECURITY, ns::WSSE))
        .and_then(|s| s.child_mut(name::TIMESTAMP, ns::WSU));
    Ok(timestamp.map(ensure_id))
}

fn ensure_id(element: &mut XmlElement) -> String {
    if let Some(id) = element.id() {
        return id.to_owned();
    }
    let id = generate_xml_id();
    element
        .attributes
        .push(XmlAttribute::qualified(prefix::WSU, name::ID, ns::WSU, id.as_str()));
    id
}

/// The `wsse:Security` header, created along with the Header if absent.
fn security_header(envelope: &mut XmlElement) -> Result<&mut XmlElement, SecurityError> {
    let soap = soap_namespace(envelope)?;
    if envelope.child(name::HEADER, &soap).is_none() {
        let header = XmlElement::new(envelope.prefix.as_deref(), name::HEADER, &soap);
        envelope.children.insert(0, XmlNode::Element(header));
    }
    let header = envelope
        .child_mut(name::HEADER, &soap)
        .ok_or_else(|| SecurityError::malformed(name::ENVELOPE, &soap, "missing Header"))?;
    if header.child(name::SECURITY, ns::WSSE).is_none() {
        header.push_child(XmlElement::new(Some(prefix::WSSE), name::SECURITY, ns::WSSE));
    }
    header
        .child_mut(name::SECURITY, ns::WSSE)
        .ok_or_else(|| SecurityError::malformed(name::HEADER, &soap, "missing wsse:Security"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DigestSetting;
    use shared_crypto::{Ed25519KeyPair, HmacKey, SignatureAlgorithm};
    use ws_02_claims::{claim_types, Claim};
    use ws_03_endpoint_identity::{X509Certificate, X509CertificateChain};
    use ws_05_authorization::ContextKind;

    const ENVELOPE: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><Echo xmlns="urn:echo">ping</Echo></s:Body></s:Envelope>"#;

    fn pipeline(config: SecurityConfig) -> SecurityPipeline {
        SecurityPipeline::new(config, Arc::new(WellKnownClaimSets::new()))
    }

    fn alice() -> (Ed25519KeyPair, SecurityToken) {
        let key = Ed25519KeyPair::generate();
        let token = SecurityToken::principal(
            EndpointIdentity::dns("alice.example"),
            Some("alice".into()),
            Arc::new(key.public_key()),
        );
        (key, token)
    }

    fn outbound(
        pipeline: &SecurityPipeline,
        signer: &dyn MessageSigner,
        key: Option<KeyIdentifier>,
    ) -> Vec<u8> {
        let mut envelope = XmlElement::parse(ENVELOPE).unwrap();
        pipeline.secure_outbound(&mut envelope, signer, key, &[]).unwrap()
    }

    #[test]
    fn test_roundtrip_text_encoding() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let bytes = outbound(&pipeline, &key, Some(KeyIdentifier::KeyName("alice".into())));

        let context = pipeline.authenticate_and_authorize(&bytes, &token).unwrap();
        assert_eq!(context.kind(), ContextKind::Default);
        assert_eq!(context.identities(), &[EndpointIdentity::dns("alice.example")]);
        assert_eq!(context.expiration_time(), DateTime::<Utc>::MAX_UTC);

        let set = &context.claim_sets()[0];
        assert!(set.is_self_issued());
        let dns = Claim::create_dns_claim("ALICE.example").with_right(rights::IDENTITY);
        assert!(set.contains_claim(&dns).unwrap());
    }

    #[test]
    fn test_roundtrip_binary_encoding() {
        let config = SecurityConfig::default()
            .with_encoding(MessageEncoding::Binary)
            .with_digest(DigestSetting::Sha512);
        let pipeline = pipeline(config);
        let (key, token) = alice();
        let bytes = outbound(&pipeline, &key, None);

        let security = pipeline.authenticate(&bytes, &token).unwrap();
        assert_eq!(security.primary_identity(), Some(&EndpointIdentity::dns("alice.example")));
        assert!(!security.is_anonymous());
    }

    #[test]
    fn test_tampered_message_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let bytes = outbound(&pipeline, &key, None);
        let tampered = String::from_utf8(bytes).unwrap().replace(">ping<", ">pong<");

        let err = pipeline
            .authenticate_and_authorize(tampered.as_bytes(), &token)
            .unwrap_err();
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn test_token_key_mismatch_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let bytes = outbound(&pipeline, &key, Some(KeyIdentifier::KeyName("mallory".into())));
        assert!(pipeline
            .authenticate_and_authorize(&bytes, &token)
            .unwrap_err()
            .is_integrity_failure());
    }

    #[test]
    fn test_unsigned_body_rejected_when_required() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();

        // Sign only a header element, leaving the Body uncovered.
        let mut envelope = XmlElement::parse(
            r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:u="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd"><s:Header><To u:Id="to" xmlns="urn:a">svc</To></s:Header><s:Body>unsigned</s:Body></s:Envelope>"#,
        )
        .unwrap();
        let signature = pipeline.engine.sign(&envelope, &["to"], &key, None).unwrap();
        security_header(&mut envelope).unwrap().push_child(signature.to_element());
        let bytes = pipeline.encode(&envelope);

        let err = pipeline.authenticate_and_authorize(&bytes, &token).unwrap_err();
        assert!(matches!(err, SecurityError::SignatureInvalid { ref reason } if reason.contains("Body")));

        let lenient = SecurityPipeline::new(
            SecurityConfig::default().with_require_signed_body(false),
            Arc::new(WellKnownClaimSets::new()),
        );
        assert!(lenient.authenticate_and_authorize(&bytes, &token).is_ok());
    }

    #[test]
    fn test_timestamp_sets_expiration() {
        let pipeline = pipeline(SecurityConfig::default().with_clock_skew_secs(60));
        let (key, token) = alice();
        let mut envelope = with_timestamp("2030-01-01T00:00:00Z");
        let bytes = pipeline.secure_outbound(&mut envelope, &key, None, &[]).unwrap();

        let context = pipeline.authenticate_and_authorize(&bytes, &token).unwrap();
        let expected = DateTime::parse_from_rfc3339("2030-01-01T00:01:00Z").unwrap();
        assert_eq!(context.expiration_time(), expected.with_timezone(&Utc));
    }

    fn with_timestamp(expires: &str) -> XmlElement {
        let mut envelope = XmlElement::parse(ENVELOPE).unwrap();
        let timestamp = XmlElement::new(Some(prefix::WSU), name::TIMESTAMP, ns::WSU)
            .with_child(XmlElement::new(Some(prefix::WSU), name::EXPIRES, ns::WSU).with_text(expires));
        security_header(&mut envelope).unwrap().push_child(timestamp);
        envelope
    }

    #[test]
    fn test_timestamp_is_signed_outbound() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, _) = alice();
        let mut envelope = with_timestamp("2030-01-01T00:00:00Z");
        let bytes = pipeline.secure_outbound(&mut envelope, &key, None, &[]).unwrap();

        let received = pipeline.decode(&bytes).unwrap();
        let signature = Signature::read_from(find_security_signature(&received).unwrap()).unwrap();
        let verified = pipeline.engine.verify(&received, &signature, &key.public_key()).unwrap();
        assert_eq!(verified.referenced_ids.len(), 2);
    }

    #[test]
    fn test_tampered_expires_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut envelope = with_timestamp("2030-01-01T00:00:00Z");
        let bytes = pipeline.secure_outbound(&mut envelope, &key, None, &[]).unwrap();
        let tampered = String::from_utf8(bytes)
            .unwrap()
            .replace("2030-01-01T00:00:00Z", "2099-01-01T00:00:00Z");

        let err = pipeline
            .authenticate_and_authorize(tampered.as_bytes(), &token)
            .unwrap_err();
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn test_unsigned_timestamp_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();

        // Sign the Body alone, then attach a Timestamp nobody signed.
        let mut envelope = XmlElement::parse(ENVELOPE).unwrap();
        let body_id = ensure_body_id(&mut envelope).unwrap();
        let signature = pipeline.engine.sign(&envelope, &[body_id.as_str()], &key, None).unwrap();
        let security = security_header(&mut envelope).unwrap();
        security.push_child(signature.to_element());
        security.push_child(
            XmlElement::new(Some(prefix::WSU), name::TIMESTAMP, ns::WSU).with_child(
                XmlElement::new(Some(prefix::WSU), name::EXPIRES, ns::WSU)
                    .with_text("2099-01-01T00:00:00Z"),
            ),
        );
        let bytes = pipeline.encode(&envelope);

        let err = pipeline.authenticate_and_authorize(&bytes, &token).unwrap_err();
        assert!(matches!(err, SecurityError::SignatureInvalid { ref reason } if reason.contains("Timestamp")));
    }

    #[test]
    fn test_second_timestamp_rejected() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut envelope = with_timestamp("2030-01-01T00:00:00Z");
        let bytes = pipeline.secure_outbound(&mut envelope, &key, None, &[]).unwrap();

        let mut received = pipeline.decode(&bytes).unwrap();
        security_header(&mut received).unwrap().push_child(
            XmlElement::new(Some(prefix::WSU), name::TIMESTAMP, ns::WSU).with_child(
                XmlElement::new(Some(prefix::WSU), name::EXPIRES, ns::WSU)
                    .with_text("2099-01-01T00:00:00Z"),
            ),
        );
        let err = pipeline
            .authenticate_and_authorize(&pipeline.encode(&received), &token)
            .unwrap_err();
        assert!(matches!(err, SecurityError::MalformedWireData { .. }));
    }

    #[test]
    fn test_certificate_token_uses_identity_cache() {
        let pipeline = pipeline(SecurityConfig::default());
        let secret: [u8; 32] = rand::random();
        let hmac = HmacKey::new(SignatureAlgorithm::HmacSha256, &secret).unwrap();
        let chain = X509CertificateChain::new(X509Certificate::from_der(vec![0x30, 0x09]).unwrap());
        let token = SecurityToken::x509(
            chain.clone(),
            Arc::new(HmacKey::new(SignatureAlgorithm::HmacSha256, &secret).unwrap()),
        );

        for _ in 0..2 {
            let bytes = outbound(&pipeline, &hmac, Some(KeyIdentifier::X509(chain.clone())));
            let context = pipeline.authenticate_and_authorize(&bytes, &token).unwrap();
            assert_eq!(
                context.claim_sets()[0]
                    .find_claims(Some(claim_types::THUMBPRINT), Some(rights::IDENTITY))
                    .count(),
                1
            );
        }
        assert_eq!(pipeline.identity_cache().len(), 1);
    }

    #[test]
    fn test_anonymous_authorization_takes_fast_path() {
        let pipeline = pipeline(SecurityConfig::default());
        let context = pipeline.authorize_anonymous().unwrap();
        assert_eq!(context.kind(), ContextKind::Simple);
        assert!(ServiceSecurityContext::new(context).is_anonymous());
        assert!(ServiceSecurityContext::anonymous().claim_sets().is_empty());
    }

    #[test]
    fn test_non_soap_root_rejected_outbound() {
        let pipeline = pipeline(SecurityConfig::default());
        let (key, _) = alice();
        let mut element = XmlElement::parse("<a/>").unwrap();
        assert!(matches!(
            pipeline.secure_outbound(&mut element, &key, None, &[]),
            Err(SecurityError::MalformedWireData { .. })
        ));
    }
}
