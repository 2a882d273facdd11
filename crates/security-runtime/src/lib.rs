//! # Security Runtime
//!
//! Wires the message security crates into what a SOAP dispatcher calls:
//!
//! - [`SecurityPipeline::authenticate_and_authorize`]: decode, verify the
//!   `wsse:Security` signature against the presented token, and evaluate
//!   authorization policies over the token's claims
//! - [`SecurityPipeline::secure_outbound`]: sign the Body, attach the
//!   signature and encode
//!
//! ## Startup Sequence
//!
//! 1. Load [`SecurityConfig`] (JSON file, then `WSSEC_*` overrides)
//! 2. Install tracing with [`init_tracing`]
//! 3. Build [`WellKnownClaimSets`](ws_02_claims::WellKnownClaimSets) once
//!    and hand it to the pipeline

pub mod config;
pub mod pipeline;
pub mod telemetry;
pub mod token;

pub use config::{ConfigError, DigestSetting, MessageEncoding, SecurityConfig};
pub use pipeline::{SecurityPipeline, ServiceSecurityContext};
pub use telemetry::{init_tracing, TelemetryError};
pub use token::SecurityToken;
