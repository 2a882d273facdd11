//! # Outbound Ports (Driven Ports / SPI)
//!
//! Policies are supplied by callers. The evaluator only knows this trait.

use crate::domain::evaluation::{EvaluationContext, PolicyState};
use crate::domain::unconditional::UnconditionalPolicy;
use shared_types::SecurityError;
use ws_02_claims::ClaimSet;

/// A stateful rule that contributes claim sets and an expiration to an
/// evaluation run.
pub trait AuthorizationPolicy: Send + Sync {
    fn id(&self) -> &str;

    /// Claim set that vouches for what this policy adds.
    fn issuer(&self) -> &ClaimSet;

    /// Run one evaluation step.
    ///
    /// `state` is whatever the policy returned from its previous step in
    /// this run, or [`PolicyState::empty`] on the first. Return the next
    /// state and `true` once the policy has nothing more to add.
    ///
    /// # Errors
    /// Any error aborts the whole evaluation and reaches the caller
    /// unchanged.
    fn evaluate(
        &self,
        context: &mut EvaluationContext,
        state: PolicyState,
    ) -> Result<(PolicyState, bool), SecurityError>;

    /// The built-in unconditional policy, if this is one.
    fn as_unconditional(&self) -> Option<&UnconditionalPolicy> {
        None
    }
}
