//! Claim sets and issuer chains.

use crate::claim::Claim;
use crate::comparer::ComparerKind;
use shared_types::SecurityError;
use std::fmt;
use std::sync::Arc;

/// Longest issuer chain a claim set may sit at the end of.
pub const MAX_ISSUER_DEPTH: usize = 32;

struct Inner {
    claims: Vec<Claim>,
    /// `None` when self-issued.
    issuer: Option<ClaimSet>,
    /// Links between this set and its self-issued root.
    depth: usize,
}

/// An ordered, immutable group of claims with an issuer.
///
/// Cloning is cheap and shares the set. Equality is identity: two handles
/// are equal when they point at the same set.
#[derive(Clone)]
pub struct ClaimSet(Arc<Inner>);

impl ClaimSet {
    /// A set that is its own issuer.
    pub fn self_issued(claims: Vec<Claim>) -> Self {
        Self(Arc::new(Inner {
            claims,
            issuer: None,
            depth: 0,
        }))
    }

    /// A set issued by `issuer`.
    pub fn issued_by(claims: Vec<Claim>, issuer: &ClaimSet) -> Result<Self, SecurityError> {
        let depth = issuer.0.depth + 1;
        if depth > MAX_ISSUER_DEPTH {
            return Err(SecurityError::IssuerChainTooDeep {
                max_depth: MAX_ISSUER_DEPTH,
            });
        }
        Ok(Self(Arc::new(Inner {
            claims,
            issuer: Some(issuer.clone()),
            depth,
        })))
    }

    /// The issuer; `self` for self-issued sets.
    pub fn issuer(&self) -> &ClaimSet {
        self.0.issuer.as_ref().unwrap_or(self)
    }

    pub fn is_self_issued(&self) -> bool {
        self.0.issuer.is_none()
    }

    /// Number of issuer links above this set.
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    pub fn claims(&self) -> &[Claim] {
        &self.0.claims
    }

    pub fn len(&self) -> usize {
        self.0.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.claims.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Claim> {
        self.0.claims.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Claim> {
        self.0.claims.iter()
    }

    /// Claims matching `claim_type` and `right`; `None` matches anything.
    /// The iterator is lazy and can be cloned to restart.
    pub fn find_claims<'a>(
        &'a self,
        claim_type: Option<&'a str>,
        right: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Claim> + Clone + 'a {
        self.0.claims.iter().filter(move |c| {
            claim_type.map_or(true, |t| c.claim_type() == t) && right.map_or(true, |r| c.right() == r)
        })
    }

    /// Whether an equivalent claim is present, using `claim`'s own comparer
    /// on candidates with the same type and right.
    pub fn contains_claim(&self, claim: &Claim) -> Result<bool, SecurityError> {
        for candidate in self.find_claims(Some(claim.claim_type()), Some(claim.right())) {
            if claim.equals(candidate)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether any claim is equivalent to `claim` under `comparer`.
    pub fn contains_claim_with(
        &self,
        claim: &Claim,
        comparer: ComparerKind,
    ) -> Result<bool, SecurityError> {
        for candidate in self.iter() {
            if comparer.equals(claim, candidate)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// This set followed by each issuer up to the self-issued root.
    pub fn issuer_chain(&self) -> IssuerChain<'_> {
        IssuerChain {
            next: Some(self),
            remaining: MAX_ISSUER_DEPTH + 1,
        }
    }

    /// Multi-line rendering of the claims and the issuer chain:
    ///
    /// ```text
    /// ClaimSet [
    ///   <right>: <type>
    /// ] by Self
    /// ```
    pub fn describe(&self) -> Result<String, SecurityError> {
        let mut out = String::from("ClaimSet [\n");
        for claim in self.iter() {
            out.push_str("  ");
            out.push_str(&claim.to_string());
            out.push('\n');
        }

        let mut prefix = "] by ";
        let mut current = self;
        let mut links = 0;
        loop {
            let issuer = current.issuer();
            out.push_str(prefix);
            if issuer == self {
                out.push_str("Self");
            } else {
                match issuer.get(0) {
                    Some(first) => out.push_str(&first.to_string()),
                    None => out.push_str("Unknown"),
                }
            }
            if issuer.is_self_issued() {
                break;
            }
            links += 1;
            if links > MAX_ISSUER_DEPTH {
                return Err(SecurityError::IssuerChainTooDeep {
                    max_depth: MAX_ISSUER_DEPTH,
                });
            }
            prefix = " -> ";
            current = issuer;
        }
        Ok(out)
    }
}

/// Iterator returned by [`ClaimSet::issuer_chain`].
pub struct IssuerChain<'a> {
    next: Option<&'a ClaimSet>,
    remaining: usize,
}

impl<'a> Iterator for IssuerChain<'a> {
    type Item = &'a ClaimSet;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = current.0.issuer.as_ref();
        Some(current)
    }
}

impl PartialEq for ClaimSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ClaimSet {}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = &'a Claim;
    type IntoIter = std::slice::Iter<'a, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSet")
            .field("claims", &self.0.claims)
            .field("self_issued", &self.is_self_issued())
            .field("depth", &self.0.depth)
            .finish()
    }
}

impl fmt::Display for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.describe() {
            Ok(text) => f.write_str(&text),
            Err(e) => write!(f, "ClaimSet [{} claims] ({e})", self.len()),
        }
    }
}
