//! # Domain Layer
//!
//! Evaluation state and the authorization contexts it produces.

pub mod context;
pub mod evaluation;
pub mod evaluator;
pub mod unconditional;
