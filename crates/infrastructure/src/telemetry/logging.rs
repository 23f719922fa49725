//! Subscriber configuration and initialization

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while setting up logging
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter does not parse
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// Offending filter string
        filter: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Configuration for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is unset (e.g., "info", "application=debug")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Include the event target (module path) in each line
    #[serde(default = "default_true")]
    pub with_target: bool,

    /// Include source file and line in each line
    #[serde(default)]
    pub with_source_location: bool,
}

fn default_log_filter() -> String {
    "info,application=debug,integration_maps=info".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            format: LogFormat::default(),
            with_target: true,
            with_source_location: false,
        }
    }
}

impl TelemetryConfig {
    /// The filter to install: `RUST_LOG` if set and valid, else the configured one
    ///
    /// # Errors
    ///
    /// Returns an error if the configured filter does not parse.
    pub fn env_filter(&self) -> Result<EnvFilter, TelemetryError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.log_filter).map_err(|e| TelemetryError::InvalidFilter {
            filter: self.log_filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Install the global subscriber
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already
/// installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let registry = tracing_subscriber::registry().with(config.env_filter()?);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(config.with_target)
                    .with_file(config.with_source_location)
                    .with_line_number(config.with_source_location),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(config.with_target)
                    .with_file(config.with_source_location)
                    .with_line_number(config.with_source_location),
            )
            .try_init(),
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(format = ?config.format, filter = %config.log_filter, "Logging initialized");
    Ok(())
}
