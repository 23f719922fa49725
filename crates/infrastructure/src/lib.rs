//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of the mapping provider client,
//! loads configuration, sets up logging, and assembles navigation sessions.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::start_session;
pub use crate::config::{AppConfig, ConfigError, LocationConfig};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
