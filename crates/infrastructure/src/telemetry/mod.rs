//! Logging setup
//!
//! Installs the global `tracing` subscriber. Output is human-readable or
//! JSON, filtered by `RUST_LOG` when set and by the configured filter
//! otherwise.

mod logging;

pub use logging::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
