//! Device location configuration

use domain::value_objects::Coordinate;
use serde::{Deserialize, Serialize};

/// A configured stand-in for the device's location service
///
/// Both fields set means the location is known from the start; both unset
/// means it stays unknown until a location update arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude in degrees
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in degrees
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// A known location
    #[must_use]
    pub const fn fixed(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// The configured coordinate, if fully set and valid
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if only one field is set or the pair is out of range.
    pub fn validate(&self) -> Result<(), String> {
        match (self.latitude, self.longitude) {
            (None, None) => Ok(()),
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            _ => Err("latitude and longitude must be set together".to_string()),
        }
    }
}
