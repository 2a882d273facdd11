//! # Domain Layer
//!
//! Signature entities, reference resolution and the engine. No I/O.

pub mod engine;
pub mod entities;
pub mod errors;
pub mod resolution;
