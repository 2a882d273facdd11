//! Well-known claim sets.

use crate::claim::{claim_types, rights, Claim, ClaimResource};
use crate::claim_set::ClaimSet;

/// Security identifier of the NT Authority.
const NT_AUTHORITY_SID: &str = "S-1-5";

/// The System, Windows and Anonymous claim sets.
///
/// Built once by startup code and handed to whatever needs them. All three
/// are self-issued and never change after construction.
#[derive(Debug, Clone)]
pub struct WellKnownClaimSets {
    system: ClaimSet,
    windows: ClaimSet,
    anonymous: ClaimSet,
}

impl Default for WellKnownClaimSets {
    fn default() -> Self {
        Self::new()
    }
}

impl WellKnownClaimSets {
    pub fn new() -> Self {
        Self {
            system: identity_pair(claim_types::SYSTEM, "System"),
            windows: identity_pair(claim_types::SID, NT_AUTHORITY_SID),
            anonymous: identity_pair(claim_types::ANONYMOUS, "Anonymous"),
        }
    }

    /// Claims made by the runtime itself.
    pub fn system(&self) -> &ClaimSet {
        &self.system
    }

    /// Claims asserted on behalf of the operating system authority.
    pub fn windows(&self) -> &ClaimSet {
        &self.windows
    }

    /// Claims for an unauthenticated caller.
    pub fn anonymous(&self) -> &ClaimSet {
        &self.anonymous
    }

    pub fn is_anonymous(&self, set: &ClaimSet) -> bool {
        *set == self.anonymous
    }
}

fn identity_pair(claim_type: &str, value: &str) -> ClaimSet {
    let identity = Claim::new(claim_type, ClaimResource::Text(value.to_owned()), rights::IDENTITY);
    let property = identity.clone().with_right(rights::POSSESS_PROPERTY);
    ClaimSet::self_issued(vec![identity, property])
}
