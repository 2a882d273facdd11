//! # WS-Sec Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs      # Envelopes, keys and tree surgery shared by tests
//! ├── integration/     # Inbound/outbound flows through the pipeline
//! └── attacks/         # Signature wrapping, downgrade and replay attempts
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ws-tests
//! cargo test -p ws-tests attacks::
//! cargo bench -p ws-tests
//! ```

pub mod attacks;
pub mod fixtures;
pub mod integration;
