//! Device location port

use async_trait::async_trait;
use domain::value_objects::Coordinate;
#[cfg(test)]
use mockall::automock;

/// Port for the device's location provider
///
/// Permission handling lives entirely behind this port; the pipeline only
/// sees the resulting coordinate.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationPort: Send + Sync {
    /// Most recent known location, or `None` if unavailable
    async fn last_known_location(&self) -> Option<Coordinate>;
}
