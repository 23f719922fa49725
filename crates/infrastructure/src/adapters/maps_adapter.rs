//! Maps adapter - Implements GeoPort using integration_maps

use application::error::NavigationError;
use application::ports::{AutocompleteQuery, EncodedRoute, GeoPort};
use async_trait::async_trait;
use domain::entities::{PlaceSuggestion, RouteRequest};
use domain::value_objects::Coordinate;
use integration_maps::{Directions, GoogleMapsClient, MapsClient, MapsConfig, MapsError};
use tracing::{debug, instrument, warn};

/// Adapter for place search and directions via the mapping provider
pub struct MapsAdapter<C = GoogleMapsClient> {
    client: C,
}

impl<C> std::fmt::Debug for MapsAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsAdapter")
            .field("client", &std::any::type_name::<C>())
            .finish()
    }
}

impl MapsAdapter<GoogleMapsClient> {
    /// Create an adapter backed by the Google Maps web services
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(config: &MapsConfig) -> Result<Self, NavigationError> {
        GoogleMapsClient::new(config)
            .map(Self::new)
            .map_err(map_error)
    }
}

impl<C: MapsClient> MapsAdapter<C> {
    /// Wrap an existing client
    pub const fn new(client: C) -> Self {
        Self { client }
    }
}

/// Translate a provider failure into the pipeline's error taxonomy
pub fn map_error(error: MapsError) -> NavigationError {
    match error {
        MapsError::ConnectionFailed(message) => NavigationError::network(message),
        MapsError::Timeout { timeout_secs } => {
            NavigationError::timeout(format!("no response within {timeout_secs}s"))
        },
        MapsError::RateLimitExceeded { retry_after_secs } => {
            NavigationError::RateLimited { retry_after_secs }
        },
        MapsError::HttpStatus { status } => {
            NavigationError::provider(format!("HTTP_{status}"), None)
        },
        MapsError::ParseError(message) => {
            NavigationError::provider("INVALID_RESPONSE", Some(message))
        },
        MapsError::ProviderStatus { status, message } => NavigationError::provider(status, message),
        MapsError::PlaceNotFound(place) => NavigationError::PlaceNotFound(place),
        MapsError::NoRoutesFound { .. } => NavigationError::NoRouteFound,
        MapsError::ConfigurationError(message) => NavigationError::InvalidRequest(message),
    }
}

fn encoded_route(directions: Directions) -> EncodedRoute {
    let distance_m = directions.distance_m();
    let duration_secs = directions.duration_secs();
    let mut segments = directions.step_polylines();
    if segments.is_empty() {
        warn!("Directions carried no step geometry, using overview polyline");
        segments.extend(directions.overview_polyline);
    }
    EncodedRoute {
        segments,
        distance_m,
        duration_secs,
    }
}

#[async_trait]
impl<C: MapsClient> GeoPort for MapsAdapter<C> {
    #[instrument(skip(self), fields(text = %query.text))]
    async fn autocomplete(
        &self,
        query: &AutocompleteQuery,
    ) -> Result<Vec<PlaceSuggestion>, NavigationError> {
        let predictions = self
            .client
            .autocomplete(&query.text, query.region_bias.as_deref())
            .await
            .map_err(map_error)?;

        Ok(predictions
            .into_iter()
            .map(|p| PlaceSuggestion::new(p.description, p.place_id))
            .collect())
    }

    #[instrument(skip(self))]
    async fn place_details(&self, place_ref: &str) -> Result<Coordinate, NavigationError> {
        self.client.place_details(place_ref).await.map_err(map_error)
    }

    #[instrument(skip(self), fields(from = %request.origin, to = %request.destination))]
    async fn directions(&self, request: &RouteRequest) -> Result<EncodedRoute, NavigationError> {
        let directions = self
            .client
            .directions(request.origin, request.destination)
            .await
            .map_err(map_error)?;

        let route = encoded_route(directions);
        debug!(segments = route.segments.len(), "Directions mapped");
        Ok(route)
    }

    async fn is_available(&self) -> bool {
        self.client.is_healthy().await
    }
}
