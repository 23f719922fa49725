//! Application configuration
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional
//! `config.toml` in the working directory, then `WAYHOME_*` environment
//! variables with `__` between nesting levels (e.g.
//! `WAYHOME_MAPS__API_KEY`, `WAYHOME_NAVIGATION__REROUTE_THRESHOLD_M`).

mod location;

use application::NavigationConfig;
use integration_maps::MapsConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use location::LocationConfig;

use crate::telemetry::TelemetryConfig;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "WAYHOME";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A section failed validation
    #[error("Invalid {section} configuration: {message}")]
    Invalid {
        /// Top-level section name
        section: &'static str,
        /// What is wrong
        message: String,
    },

    /// A client could not be built from valid settings
    #[error("Failed to initialize {component}: {message}")]
    Client {
        /// Component being built
        component: &'static str,
        /// Underlying error
        message: String,
    },
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mapping provider
    #[serde(default)]
    pub maps: MapsConfig,

    /// Search, routing, and destination behavior
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Device location stand-in
    #[serde(default)]
    pub location: LocationConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    ///
    /// # Errors
    ///
    /// Returns an error if a source is unreadable or the result is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config::File::with_name("config").required(false))
    }

    /// Load with `file` in place of the default `config.toml`
    ///
    /// Environment overrides still apply on top.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is unreadable or the result is invalid.
    pub fn load_from<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., WAYHOME_MAPS__TIMEOUT_SECS)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first section that fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.maps
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "maps",
                message,
            })?;
        self.navigation
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "navigation",
                message,
            })?;
        self.location
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "location",
                message,
            })?;
        Ok(())
    }
}
