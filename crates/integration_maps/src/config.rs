//! Mapping provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Configuration for the mapping provider web services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Base URL for the provider's JSON APIs
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API credential (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Response language (e.g., "es")
    #[serde(default = "default_language")]
    pub language: Option<String>,

    /// Queries shorter than this many characters never reach the network
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Directions travel mode
    #[serde(default = "default_travel_mode")]
    pub travel_mode: String,
}

fn default_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

#[allow(clippy::unnecessary_wraps)] // serde default fn
fn default_language() -> Option<String> {
    Some("es".to_string())
}

const fn default_min_query_chars() -> usize {
    3
}

fn default_travel_mode() -> String {
    "driving".to_string()
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            language: default_language(),
            min_query_chars: default_min_query_chars(),
            travel_mode: default_travel_mode(),
        }
    }
}

impl MapsConfig {
    /// Default configuration with the given API key
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            ..Default::default()
        }
    }

    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            ..Self::with_api_key("test-key")
        }
    }

    /// Get the API key as a string reference (for request parameters)
    #[must_use]
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key.as_ref().map(ExposeSecret::expose_secret)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.base_url).map_err(|e| format!("base_url is invalid: {e}"))?;

        if self.api_key_str().is_none_or(str::is_empty) {
            return Err("api_key must be set".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.min_query_chars == 0 {
            return Err("min_query_chars must be greater than 0".to_string());
        }

        if self.travel_mode.trim().is_empty() {
            return Err("travel_mode must not be empty".to_string());
        }

        Ok(())
    }
}
