//! Per-run evaluation state.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use ws_02_claims::ClaimSet;
use ws_03_endpoint_identity::EndpointIdentity;

use crate::ports::outbound::AuthorizationPolicy;

// =============================================================================
// POLICY STATE
// =============================================================================

/// Opaque per-policy state carried between passes of one run.
#[derive(Default)]
pub struct PolicyState(Option<Box<dyn Any + Send>>);

impl PolicyState {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The stored value, if it is a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|v| v.downcast_ref())
    }

    pub fn into_inner<T: Any>(self) -> Option<T> {
        self.0.and_then(|v| v.downcast().ok()).map(|v| *v)
    }
}

impl fmt::Debug for PolicyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("PolicyState(..)"),
            None => f.write_str("PolicyState(empty)"),
        }
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// A value in the context property bag.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Identities(Vec<EndpointIdentity>),
}

// =============================================================================
// EVALUATION CONTEXT
// =============================================================================

/// What policies have established so far in one run.
///
/// The generation counter advances on every added claim set; the
/// evaluator keeps passing over the policies while it moves.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    claim_sets: Vec<ClaimSet>,
    properties: BTreeMap<String, PropertyValue>,
    expiration_time: DateTime<Utc>,
    generation: u64,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self {
            claim_sets: Vec::new(),
            properties: BTreeMap::new(),
            expiration_time: DateTime::<Utc>::MAX_UTC,
            generation: 0,
        }
    }

    pub fn claim_sets(&self) -> &[ClaimSet] {
        &self.claim_sets
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn expiration_time(&self) -> DateTime<Utc> {
        self.expiration_time
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Add a claim set on behalf of `policy` and advance the generation.
    pub fn add_claim_set(&mut self, policy: &dyn AuthorizationPolicy, claim_set: ClaimSet) {
        self.claim_sets.push(claim_set);
        self.generation += 1;
        debug!(policy = policy.id(), generation = self.generation, "claim set added");
    }

    /// Keep the earlier of the current and the given expiration.
    pub fn record_expiration_time(&mut self, expiration_time: DateTime<Utc>) {
        if expiration_time < self.expiration_time {
            self.expiration_time = expiration_time;
        }
    }

    /// Set a property. Properties do not advance the generation.
    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(name.into(), value);
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Vec<ClaimSet>, BTreeMap<String, PropertyValue>, DateTime<Utc>) {
        (self.claim_sets, self.properties, self.expiration_time)
    }
}
