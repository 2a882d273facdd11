//! # Authorization Policies Behind the Pipeline
//!
//! Policies configured on the pipeline run after the token policy and may
//! depend on the claims it adds.

#[cfg(test)]
mod tests {
    use crate::fixtures::{alice, envelope};
    use chrono::{DateTime, Utc};
    use security_runtime::{SecurityConfig, SecurityPipeline, ServiceSecurityContext};
    use shared_types::namespaces::{name, ns, prefix};
    use shared_types::{SecurityError, XmlElement, XmlNode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use ws_02_claims::{rights, Claim, ClaimResource, ClaimSet, WellKnownClaimSets};
    use ws_05_authorization::{
        AuthorizationPolicy, ContextKind, EvaluationContext, PolicyState,
    };

    const ROLE_CLAIM: &str = "urn:bank:role";

    /// Grants the teller role once a DNS identity for alice is present.
    struct TellerPolicy {
        issuance: ClaimSet,
        calls: AtomicUsize,
    }

    impl TellerPolicy {
        fn new(well_known: &WellKnownClaimSets) -> Self {
            let role = Claim::new(
                ROLE_CLAIM,
                ClaimResource::Text("teller".into()),
                rights::POSSESS_PROPERTY,
            );
            Self {
                issuance: ClaimSet::issued_by(vec![role], well_known.system()).unwrap(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AuthorizationPolicy for TellerPolicy {
        fn id(&self) -> &str {
            "teller"
        }

        fn issuer(&self) -> &ClaimSet {
            self.issuance.issuer()
        }

        fn evaluate(
            &self,
            context: &mut EvaluationContext,
            state: PolicyState,
        ) -> Result<(PolicyState, bool), SecurityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let alice = Claim::create_dns_claim("alice.example").with_right(rights::IDENTITY);
            let mut present = false;
            for set in context.claim_sets() {
                if set.contains_claim(&alice)? {
                    present = true;
                    break;
                }
            }
            if !present {
                return Ok((state, false));
            }
            context.add_claim_set(self, self.issuance.clone());
            Ok((PolicyState::empty(), true))
        }
    }

    /// Keeps adding claim sets forever.
    struct RunawayPolicy(ClaimSet);

    impl AuthorizationPolicy for RunawayPolicy {
        fn id(&self) -> &str {
            "runaway"
        }

        fn issuer(&self) -> &ClaimSet {
            self.0.issuer()
        }

        fn evaluate(
            &self,
            context: &mut EvaluationContext,
            state: PolicyState,
        ) -> Result<(PolicyState, bool), SecurityError> {
            context.add_claim_set(self, self.0.clone());
            Ok((state, false))
        }
    }

    fn signed(pipeline: &SecurityPipeline, key: &shared_crypto::Ed25519KeyPair) -> Vec<u8> {
        let mut message = envelope();
        pipeline.secure_outbound(&mut message, key, None, &[]).unwrap()
    }

    #[test]
    fn test_role_policy_depends_on_token_claims() {
        let well_known = Arc::new(WellKnownClaimSets::new());
        let teller = Arc::new(TellerPolicy::new(&well_known));
        let pipeline = SecurityPipeline::new(SecurityConfig::default(), well_known.clone())
            .with_policy(teller.clone());
        let (key, token) = alice();

        let context = pipeline
            .authenticate_and_authorize(&signed(&pipeline, &key), &token)
            .unwrap();
        assert_eq!(context.kind(), ContextKind::Default);
        assert_eq!(context.claim_sets().len(), 2);

        let granted = &context.claim_sets()[1];
        assert_eq!(granted.issuer(), well_known.system());
        assert_eq!(granted.find_claims(Some(ROLE_CLAIM), None).count(), 1);
        // The token policy runs first, so one call suffices.
        assert_eq!(teller.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_role_policy_withheld_from_other_principals() {
        let well_known = Arc::new(WellKnownClaimSets::new());
        let pipeline = SecurityPipeline::new(SecurityConfig::default(), well_known.clone())
            .with_policy(Arc::new(TellerPolicy::new(&well_known)));
        let key = shared_crypto::Ed25519KeyPair::generate();
        let token = security_runtime::SecurityToken::principal(
            ws_03_endpoint_identity::EndpointIdentity::dns("mallory.example"),
            None,
            Arc::new(key.public_key()),
        );

        let context = pipeline
            .authenticate_and_authorize(&signed(&pipeline, &key), &token)
            .unwrap();
        assert_eq!(context.claim_sets().len(), 1);
    }

    #[test]
    fn test_expired_timestamp_is_reported_not_rejected() {
        let pipeline = crate::fixtures::pipeline(SecurityConfig::default().with_clock_skew_secs(0));
        let (key, token) = alice();
        let mut message = envelope();
        let timestamp = XmlElement::new(Some(prefix::WSU), name::TIMESTAMP, ns::WSU).with_child(
            XmlElement::new(Some(prefix::WSU), name::EXPIRES, ns::WSU)
                .with_text("2001-09-09T01:46:40Z"),
        );
        let security = XmlElement::new(Some(prefix::WSSE), name::SECURITY, ns::WSSE)
            .with_child(timestamp);
        message.children.insert(
            0,
            XmlNode::Element(XmlElement::new(Some("s"), name::HEADER, ns::SOAP12).with_child(security)),
        );
        let bytes = pipeline.secure_outbound(&mut message, &key, None, &[]).unwrap();

        let security = ServiceSecurityContext::new(
            pipeline.authenticate_and_authorize(&bytes, &token).unwrap(),
        );
        let expected: DateTime<Utc> = "2001-09-09T01:46:40Z".parse().unwrap();
        assert_eq!(security.expiration_time(), expected);
        assert!(security.is_expired(Utc::now()));
    }

    #[test]
    fn test_malformed_timestamp_rejected() {
        let pipeline = crate::fixtures::pipeline(SecurityConfig::default());
        let (key, token) = alice();
        let mut message = envelope();
        let timestamp = XmlElement::new(Some(prefix::WSU), name::TIMESTAMP, ns::WSU).with_child(
            XmlElement::new(Some(prefix::WSU), name::EXPIRES, ns::WSU).with_text("tomorrow"),
        );
        message.children.insert(
            0,
            XmlNode::Element(
                XmlElement::new(Some("s"), name::HEADER, ns::SOAP12).with_child(
                    XmlElement::new(Some(prefix::WSSE), name::SECURITY, ns::WSSE)
                        .with_child(timestamp),
                ),
            ),
        );
        let bytes = pipeline.secure_outbound(&mut message, &key, None, &[]).unwrap();
        assert!(matches!(
            pipeline.authenticate_and_authorize(&bytes, &token),
            Err(SecurityError::MalformedWireData { .. })
        ));
    }

    #[test]
    fn test_configured_pass_cap_stops_runaway_policy() {
        let well_known = Arc::new(WellKnownClaimSets::new());
        let runaway = RunawayPolicy(ClaimSet::self_issued(vec![Claim::create_name_claim("r")]));
        let pipeline = SecurityPipeline::new(
            SecurityConfig::default().with_max_evaluation_passes(Some(3)),
            well_known,
        )
        .with_policy(Arc::new(runaway));
        let (key, token) = alice();

        let err = pipeline
            .authenticate_and_authorize(&signed(&pipeline, &key), &token)
            .unwrap_err();
        assert_eq!(err, SecurityError::EvaluationDidNotConverge { passes: 3 });
    }

    #[test]
    fn test_anonymous_caller_gets_anonymous_claim_set() {
        let well_known = Arc::new(WellKnownClaimSets::new());
        let pipeline = SecurityPipeline::new(SecurityConfig::default(), well_known.clone());

        let context = pipeline.authorize_anonymous().unwrap();
        assert_eq!(context.kind(), ContextKind::Simple);
        assert!(well_known.is_anonymous(&context.claim_sets()[0]));
        assert!(context.identities().is_empty());
    }
}
