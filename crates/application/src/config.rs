//! Navigation session configuration

use domain::value_objects::Coordinate;
use serde::{Deserialize, Serialize};

use crate::services::RetryConfig;

/// Where the session's destination comes from
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DestinationSource {
    /// The user picks a suggestion from the search list
    #[default]
    UserSelected,
    /// A destination set once when the session starts
    Fixed {
        /// Destination latitude in degrees
        latitude: f64,
        /// Destination longitude in degrees
        longitude: f64,
    },
}

impl DestinationSource {
    /// The fixed destination, if configured
    ///
    /// Out-of-range coordinates yield `None`; [`NavigationConfig::validate`]
    /// reports them.
    #[must_use]
    pub fn fixed_coordinate(&self) -> Option<Coordinate> {
        match *self {
            Self::UserSelected => None,
            Self::Fixed {
                latitude,
                longitude,
            } => Coordinate::new(latitude, longitude).ok(),
        }
    }
}

/// Configuration for a navigation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Search queries shorter than this many characters stay local
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Autocomplete region filter (e.g., "country:mx"); None disables it
    #[serde(default = "default_region_bias")]
    pub region_bias: Option<String>,

    /// Distance the user must move from the last requested origin before
    /// the route is requested again
    #[serde(default = "default_reroute_threshold_m")]
    pub reroute_threshold_m: f64,

    /// Destination source
    #[serde(default)]
    pub destination: DestinationSource,

    /// Route cache TTL in seconds (0 to disable)
    #[serde(default = "default_route_cache_ttl_secs")]
    pub route_cache_ttl_secs: u64,

    /// Maximum number of cached routes
    #[serde(default = "default_route_cache_capacity")]
    pub route_cache_capacity: u64,

    /// Retry policy for directions requests
    #[serde(default)]
    pub retry: RetryConfig,
}

const fn default_min_query_chars() -> usize {
    3
}

#[allow(clippy::unnecessary_wraps)] // serde default fn
fn default_region_bias() -> Option<String> {
    Some("country:mx".to_string())
}

const fn default_reroute_threshold_m() -> f64 {
    50.0
}

const fn default_route_cache_ttl_secs() -> u64 {
    30
}

const fn default_route_cache_capacity() -> u64 {
    64
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            min_query_chars: default_min_query_chars(),
            region_bias: default_region_bias(),
            reroute_threshold_m: default_reroute_threshold_m(),
            destination: DestinationSource::default(),
            route_cache_ttl_secs: default_route_cache_ttl_secs(),
            route_cache_capacity: default_route_cache_capacity(),
            retry: RetryConfig::default(),
        }
    }
}

impl NavigationConfig {
    /// Create a configuration suitable for testing
    ///
    /// No route cache, and retries without jitter so backoff is predictable.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            route_cache_ttl_secs: 0,
            retry: RetryConfig::new(10, 100, 2.0, 2).without_jitter(),
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_query_chars == 0 {
            return Err("min_query_chars must be greater than 0".to_string());
        }

        if !self.reroute_threshold_m.is_finite() || self.reroute_threshold_m < 0.0 {
            return Err("reroute_threshold_m must be a non-negative number".to_string());
        }

        if let DestinationSource::Fixed {
            latitude,
            longitude,
        } = self.destination
        {
            Coordinate::new(latitude, longitude)
                .map_err(|e| format!("fixed destination is invalid: {e}"))?;
        }

        if self.route_cache_ttl_secs > 0 && self.route_cache_capacity == 0 {
            return Err("route_cache_capacity must be greater than 0 when caching".to_string());
        }

        if self.retry.multiplier < 1.0 {
            return Err("retry.multiplier must be at least 1.0".to_string());
        }

        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err("retry.jitter_factor must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NavigationConfig::default();
        assert_eq!(config.min_query_chars, 3);
        assert_eq!(config.region_bias.as_deref(), Some("country:mx"));
        assert!((config.reroute_threshold_m - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.destination, DestinationSource::UserSelected);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = NavigationConfig::for_testing();
        assert_eq!(config.route_cache_ttl_secs, 0);
        assert!(!config.retry.jitter_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_destination_from_json() {
        let json = r#"{
            "destination": { "mode": "fixed", "latitude": 20.006686, "longitude": -101.02145 }
        }"#;
        let config: NavigationConfig = serde_json::from_str(json).unwrap();
        let fixed = config.destination.fixed_coordinate().unwrap();
        assert!((fixed.latitude() - 20.006_686).abs() < 1e-9);
        assert_eq!(config.min_query_chars, 3);
    }

    #[test]
    fn test_validation_rejects_out_of_range_destination() {
        let config = NavigationConfig {
            destination: DestinationSource::Fixed {
                latitude: 120.0,
                longitude: 0.0,
            },
            ..NavigationConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(config.destination.fixed_coordinate().is_none());
    }

    #[test]
    fn test_validation_rejects_negative_threshold() {
        let config = NavigationConfig {
            reroute_threshold_m: -1.0,
            ..NavigationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_min_query() {
        let config = NavigationConfig {
            min_query_chars: 0,
            ..NavigationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
