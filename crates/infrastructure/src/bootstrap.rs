//! Session assembly
//!
//! Builds the port adapters from an [`AppConfig`] and starts a navigation
//! session on the current Tokio runtime.

use std::sync::Arc;

use application::{NavigationHandle, NavigationSession};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::{FixedLocationProvider, MapsAdapter};
use crate::config::{AppConfig, ConfigError};

/// Validate `config`, build the adapters, and spawn a session
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the HTTP client
/// cannot be built.
pub fn start_session(
    config: &AppConfig,
) -> Result<(NavigationHandle, JoinHandle<()>), ConfigError> {
    config.validate()?;

    let geo = MapsAdapter::from_config(&config.maps).map_err(|e| ConfigError::Client {
        component: "maps client",
        message: e.to_string(),
    })?;
    let location = FixedLocationProvider::from_config(&config.location);
    if config.location.coordinate().is_none() {
        warn!("No location configured, routes wait for a location update");
    }

    let (handle, task) =
        NavigationSession::spawn(Arc::new(geo), Arc::new(location), &config.navigation);
    info!(
        base_url = %config.maps.base_url,
        destination = ?config.navigation.destination,
        "Navigation session started"
    );
    Ok((handle, task))
}

#[cfg(test)]
mod tests {
    use integration_maps::MapsConfig;

    use super::*;

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = AppConfig::default();
        let err = start_session(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                section: "maps",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn starts_and_shuts_down() {
        let config = AppConfig {
            maps: MapsConfig::for_testing(),
            ..AppConfig::default()
        };
        let (handle, task) = start_session(&config).unwrap();
        handle.shutdown().unwrap();
        task.await.unwrap();
    }
}
