//! # WS-05 Authorization Policy Evaluator
//!
//! Folds caller-supplied policies into one immutable
//! [`AuthorizationContext`].
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): evaluation state, the fixed-point
//!   evaluator and the resulting context
//! - **Ports Layer** (`ports/`): `AuthorizationPolicy` (outbound; policies
//!   are supplied by callers and treated as opaque)
//!
//! ## Evaluation
//!
//! | Policies | Result |
//! |----------|--------|
//! | none | shared empty context |
//! | one `UnconditionalPolicy` | `Simple` context, no loop |
//! | anything else | passes until the generation stops changing |

pub mod domain;
pub mod ports;

// Re-export public API
pub use domain::context::{AuthorizationContext, ContextKind, IDENTITIES_PROPERTY};
pub use domain::evaluation::{EvaluationContext, PolicyState, PropertyValue};
pub use domain::evaluator::PolicyEvaluator;
pub use domain::unconditional::UnconditionalPolicy;
pub use ports::outbound::AuthorizationPolicy;
