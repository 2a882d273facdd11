//! # WS-02 Claims
//!
//! Typed `(claim_type, right, resource)` assertions grouped into claim sets
//! that point at their issuer.
//!
//! - **Claim** (`claim.rs`): immutable; its equivalence rule is picked from
//!   the claim type when it is built
//! - **Comparer** (`comparer.rs`): per-type equality and hashing
//! - **ClaimSet** (`claim_set.rs`): ordered claims plus an `Arc` issuer
//!   link; self-issued sets are their own issuer
//! - **WellKnownClaimSets** (`well_known.rs`): the System, Windows and
//!   Anonymous sets, built once by startup code and passed where needed
//!
//! ## Invariants
//!
//! - The issuer chain is finite and at most [`MAX_ISSUER_DEPTH`] links long.
//!   Links are immutable, so a cycle cannot be built.

pub mod claim;
pub mod claim_set;
pub mod comparer;
pub mod well_known;

pub use claim::{claim_types, rights, Claim, ClaimResource};
pub use claim_set::{ClaimSet, MAX_ISSUER_DEPTH};
pub use comparer::ComparerKind;
pub use well_known::WellKnownClaimSets;
