//! Location adapter - Implements LocationPort from configuration

use application::ports::LocationPort;
use async_trait::async_trait;
use domain::value_objects::Coordinate;
use tracing::debug;

use crate::config::LocationConfig;

/// Location provider that always reports the configured coordinate
///
/// Stands in for a device location service on hosts that have none.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationProvider {
    location: Option<Coordinate>,
}

impl FixedLocationProvider {
    /// Provider reporting `location`
    #[must_use]
    pub const fn new(location: Option<Coordinate>) -> Self {
        Self { location }
    }

    /// Provider built from configuration
    #[must_use]
    pub fn from_config(config: &LocationConfig) -> Self {
        Self::new(config.coordinate())
    }
}

#[async_trait]
impl LocationPort for FixedLocationProvider {
    async fn last_known_location(&self) -> Option<Coordinate> {
        debug!(known = self.location.is_some(), "Location requested");
        self.location
    }
}
