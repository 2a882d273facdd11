//! # Authorization Context
//!
//! The immutable result of one evaluation run. Contexts are cheap to
//! clone and share one allocation.
//!
//! The expiration time is advisory: callers re-check it with
//! [`AuthorizationContext::is_expired`] before reusing a context.

use crate::domain::evaluation::{EvaluationContext, PropertyValue};
use chrono::{DateTime, Utc};
use shared_types::security::generate_unique_id;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use ws_02_claims::ClaimSet;
use ws_03_endpoint_identity::EndpointIdentity;

/// Property holding the identities that took part in the decision.
pub const IDENTITIES_PROPERTY: &str = "Identities";

/// How a context was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// No policies
    Empty,
    /// A single unconditional policy
    Simple,
    /// The fixed-point loop
    Default,
}

struct Inner {
    id: OnceLock<String>,
    kind: ContextKind,
    claim_sets: Vec<ClaimSet>,
    properties: BTreeMap<String, PropertyValue>,
    expiration_time: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthorizationContext(Arc<Inner>);

static EMPTY: OnceLock<AuthorizationContext> = OnceLock::new();

impl AuthorizationContext {
    fn build(
        kind: ContextKind,
        claim_sets: Vec<ClaimSet>,
        properties: BTreeMap<String, PropertyValue>,
        expiration_time: DateTime<Utc>,
    ) -> Self {
        Self(Arc::new(Inner {
            id: OnceLock::new(),
            kind,
            claim_sets,
            properties,
            expiration_time,
        }))
    }

    /// The process-wide context with no claims and no expiration.
    pub fn empty() -> Self {
        EMPTY
            .get_or_init(|| {
                Self::build(
                    ContextKind::Empty,
                    Vec::new(),
                    BTreeMap::new(),
                    DateTime::<Utc>::MAX_UTC,
                )
            })
            .clone()
    }

    pub fn simple(claim_set: ClaimSet, expiration_time: DateTime<Utc>) -> Self {
        Self::build(
            ContextKind::Simple,
            vec![claim_set],
            BTreeMap::new(),
            expiration_time,
        )
    }

    /// Freeze the state of a finished evaluation run.
    pub fn from_evaluation(context: EvaluationContext) -> Self {
        let (claim_sets, properties, expiration_time) = context.into_parts();
        Self::build(ContextKind::Default, claim_sets, properties, expiration_time)
    }

    /// Unique token, generated on first use.
    pub fn id(&self) -> &str {
        self.0.id.get_or_init(generate_unique_id)
    }

    pub fn kind(&self) -> ContextKind {
        self.0.kind
    }

    pub fn claim_sets(&self) -> &[ClaimSet] {
        &self.0.claim_sets
    }

    pub fn expiration_time(&self) -> DateTime<Utc> {
        self.0.expiration_time
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.0.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.0.properties.get(name)
    }

    /// The `Identities` property, or nothing when it is absent.
    pub fn identities(&self) -> &[EndpointIdentity] {
        match self.property(IDENTITIES_PROPERTY) {
            Some(PropertyValue::Identities(identities)) => identities,
            _ => &[],
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.0.expiration_time
    }

    /// True for the shared empty context.
    pub fn is_shared_empty(&self) -> bool {
        EMPTY.get().is_some_and(|empty| Arc::ptr_eq(&empty.0, &self.0))
    }

    /// Same claim-set contents, properties and expiration, ignoring kind
    /// and id.
    pub fn is_equivalent(&self, other: &AuthorizationContext) -> bool {
        self.expiration_time() == other.expiration_time()
            && self.properties() == other.properties()
            && self.claim_sets().len() == other.claim_sets().len()
            && self
                .claim_sets()
                .iter()
                .zip(other.claim_sets())
                .all(|(a, b)| a == b || a.claims() == b.claims())
    }
}

impl fmt::Debug for AuthorizationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationContext")
            .field("kind", &self.0.kind)
            .field("claim_sets", &self.0.claim_sets.len())
            .field("expiration_time", &self.0.expiration_time)
            .field("properties", &self.0.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}
