//! Per-type claim equivalence.
//!
//! Two claims can only be equivalent when their type and right match
//! exactly. The resources are then compared by a rule chosen from the
//! claim type.

use crate::claim::{claim_types, Claim, ClaimResource};
use shared_types::SecurityError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparerKind {
    /// Case-insensitive host names.
    Dns,
    /// Exact bytes.
    Hash,
    /// Exact bytes.
    Thumbprint,
    /// Key equivalence needs a platform key parser.
    Rsa,
    /// Name canonicalization needs a directory service.
    Upn,
    /// Name canonicalization needs a platform X.500 parser.
    X500DistinguishedName,
    /// Structural equality of the resource.
    Default,
}

impl ComparerKind {
    /// Comparer for a claim type.
    pub fn for_claim_type(claim_type: &str) -> Self {
        match claim_type {
            claim_types::DNS => Self::Dns,
            claim_types::HASH => Self::Hash,
            claim_types::THUMBPRINT => Self::Thumbprint,
            claim_types::RSA => Self::Rsa,
            claim_types::UPN => Self::Upn,
            claim_types::X500_DISTINGUISHED_NAME => Self::X500DistinguishedName,
            _ => Self::Default,
        }
    }

    fn ensure_supported(self, claim_type: &str) -> Result<(), SecurityError> {
        match self {
            Self::Rsa | Self::Upn | Self::X500DistinguishedName => {
                Err(SecurityError::UnsupportedClaimComparison {
                    claim_type: claim_type.to_owned(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Claim equivalence under this rule.
    pub fn equals(self, a: &Claim, b: &Claim) -> Result<bool, SecurityError> {
        self.ensure_supported(a.claim_type())?;
        if a.claim_type() != b.claim_type() || a.right() != b.right() {
            return Ok(false);
        }
        Ok(self.resources_equal(a.resource(), b.resource()))
    }

    fn resources_equal(self, a: &ClaimResource, b: &ClaimResource) -> bool {
        match self {
            Self::Dns => match (a.as_text(), b.as_text()) {
                (Some(x), Some(y)) => fold_case(x) == fold_case(y),
                _ => false,
            },
            Self::Hash | Self::Thumbprint => match (a.as_bytes(), b.as_bytes()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            _ => a == b,
        }
    }

    /// Hash consistent with [`equals`](Self::equals).
    pub fn hash_code(self, claim: &Claim) -> Result<u64, SecurityError> {
        self.ensure_supported(claim.claim_type())?;
        let mut hasher = DefaultHasher::new();
        claim.claim_type().hash(&mut hasher);
        claim.right().hash(&mut hasher);
        match (self, claim.resource()) {
            (Self::Dns, resource) => match resource.as_text() {
                Some(text) => fold_case(text).hash(&mut hasher),
                None => resource.hash(&mut hasher),
            },
            (_, resource) => resource.hash(&mut hasher),
        }
        Ok(hasher.finish())
    }
}

fn fold_case(s: &str) -> String {
    s.to_lowercase()
}
