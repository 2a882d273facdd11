//! # Integration Flows
//!
//! A signed message travels through `secure_outbound`, the wire encoding
//! and `authenticate_and_authorize`, exercising canonicalization, the
//! signature engine, endpoint identity, claims and policy evaluation
//! together.

pub mod flows;
pub mod policies;
