//! Tracing setup.
//!
//! `RUST_LOG` wins over the configured level. Digest traces are emitted
//! under the `ws_sec::digest` target, so `RUST_LOG=ws_sec::digest=trace`
//! shows canonical bytes without the rest of the trace output.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("tracing already initialized: {0}")]
    Init(String),
}

/// Install the global subscriber.
pub fn init_tracing(log_level: &str) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))
}
