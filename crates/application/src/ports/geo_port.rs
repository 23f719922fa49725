//! Geo service port
//!
//! The three network operations the navigation pipeline depends on. Every
//! call is a suspension point; implementations apply their own timeout and
//! report failures as typed [`NavigationError`]s without recovering them.

use async_trait::async_trait;
use domain::entities::{PlaceSuggestion, RouteRequest};
use domain::value_objects::Coordinate;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::NavigationError;

/// An autocomplete lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteQuery {
    /// Text typed by the user
    pub text: String,
    /// Provider region filter (e.g., "country:mx")
    pub region_bias: Option<String>,
}

impl AutocompleteQuery {
    /// Create a query without region filter
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            region_bias: None,
        }
    }

    /// Restrict the lookup to a region
    #[must_use]
    pub fn with_region_bias(mut self, region_bias: Option<String>) -> Self {
        self.region_bias = region_bias;
        self
    }
}

/// Route geometry as returned by the provider, still encoded
///
/// One polyline per step in travel order; a single whole-route polyline when
/// the provider reported no steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedRoute {
    /// Encoded polyline segments
    pub segments: Vec<String>,
    /// Total distance in meters, if reported
    pub distance_m: Option<u64>,
    /// Total duration in seconds, if reported
    pub duration_secs: Option<u64>,
}

impl EncodedRoute {
    /// Route made of the given segments, without totals
    #[must_use]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self {
            segments,
            ..Default::default()
        }
    }
}

/// Port for place search and routing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeoPort: Send + Sync {
    /// Suggestions for a partial place name
    async fn autocomplete(
        &self,
        query: &AutocompleteQuery,
    ) -> Result<Vec<PlaceSuggestion>, NavigationError>;

    /// Location of a previously suggested place
    async fn place_details(&self, place_ref: &str) -> Result<Coordinate, NavigationError>;

    /// Driving route geometry between the request's endpoints
    async fn directions(&self, request: &RouteRequest) -> Result<EncodedRoute, NavigationError>;

    /// Check if the service is reachable
    async fn is_available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder() {
        let query = AutocompleteQuery::new("Santa Ana").with_region_bias(Some("country:mx".into()));
        assert_eq!(query.text, "Santa Ana");
        assert_eq!(query.region_bias.as_deref(), Some("country:mx"));
    }

    #[test]
    fn encoded_route_from_segments() {
        let route = EncodedRoute::from_segments(vec!["_p~iF~ps|U".to_string()]);
        assert_eq!(route.segments.len(), 1);
        assert!(route.distance_m.is_none());
    }

    #[tokio::test]
    async fn mock_geo_port_directions() {
        let mut mock = MockGeoPort::new();
        mock.expect_directions()
            .returning(|_| Err(NavigationError::NoRouteFound));

        let request = RouteRequest::new(Coordinate::mexico_city(), Coordinate::mexico_city());
        let result = mock.directions(&request).await;
        assert_eq!(result, Err(NavigationError::NoRouteFound));
    }

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn GeoPort>();
    }
}
