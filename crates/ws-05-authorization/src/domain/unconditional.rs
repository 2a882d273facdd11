//! The built-in policy that grants one claim set until a fixed time.

use crate::domain::evaluation::{EvaluationContext, PolicyState};
use crate::ports::outbound::AuthorizationPolicy;
use chrono::{DateTime, Utc};
use shared_types::security::generate_unique_id;
use shared_types::SecurityError;
use ws_02_claims::ClaimSet;

#[derive(Debug, Clone)]
pub struct UnconditionalPolicy {
    id: String,
    issuance: ClaimSet,
    expiration_time: DateTime<Utc>,
}

impl UnconditionalPolicy {
    pub fn new(issuance: ClaimSet, expiration_time: DateTime<Utc>) -> Self {
        Self {
            id: generate_unique_id(),
            issuance,
            expiration_time,
        }
    }

    /// The claim set this policy grants.
    pub fn issuance(&self) -> &ClaimSet {
        &self.issuance
    }

    pub fn expiration_time(&self) -> DateTime<Utc> {
        self.expiration_time
    }
}

impl AuthorizationPolicy for UnconditionalPolicy {
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
        Ok((state, true))
    }

    fn as_unconditional(&self) -> Option<&UnconditionalPolicy> {
        Some(self)
    }
}
