//! # Attack Simulations
//!
//! Messages an attacker can build from a legitimately signed one. Every
//! case must fail closed before authorization runs.
//!
//! - `wrapping`: moving or duplicating the signed Body, and tampering
//!   with or removing the signed Timestamp
//! - `key_confusion`: presenting the signature under another key or
//!   algorithm

pub mod key_confusion;
pub mod wrapping;
