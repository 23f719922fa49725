//! Google Maps web-service client
//!
//! Issues place autocomplete, place details, and directions requests against
//! the provider's JSON APIs. Each call is a single round-trip bounded by the
//! configured timeout; results are never cached at this layer.

use std::time::Duration;

use async_trait::async_trait;
use domain::value_objects::Coordinate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::MapsConfig;
use crate::error::MapsError;
use crate::models::{
    Directions, Prediction, RawAutocompleteResponse, RawDirectionsResponse,
    RawPlaceDetailsResponse,
};

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
const STATUS_NOT_FOUND: &str = "NOT_FOUND";
const STATUS_OVER_QUERY_LIMIT: &str = "OVER_QUERY_LIMIT";

/// Trait for mapping provider clients
#[async_trait]
pub trait MapsClient: Send + Sync {
    /// Incremental place-name lookup
    ///
    /// Inputs shorter than the configured minimum return an empty list
    /// without a network call.
    async fn autocomplete(
        &self,
        input: &str,
        region_bias: Option<&str>,
    ) -> Result<Vec<Prediction>, MapsError>;

    /// Resolve a place identifier to its coordinate
    async fn place_details(&self, place_id: &str) -> Result<Coordinate, MapsError>;

    /// Driving directions between two coordinates (first route only)
    async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Directions, MapsError>;

    /// Check if the provider is reachable
    async fn is_healthy(&self) -> bool;
}

/// Google Maps Platform client
#[derive(Debug)]
pub struct GoogleMapsClient {
    client: Client,
    config: MapsConfig,
}

impl GoogleMapsClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &MapsConfig) -> Result<Self, MapsError> {
        config.validate().map_err(MapsError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("regreso-a-casa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MapsError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// The configuration this client was built with
    #[must_use]
    pub const fn config(&self) -> &MapsConfig {
        &self.config
    }

    fn api_key(&self) -> String {
        self.config.api_key_str().unwrap_or_default().to_string()
    }

    /// GET `{base_url}/{endpoint}` and parse the JSON body
    ///
    /// Transport, HTTP status, and body-parse failures map to distinct errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, MapsError> {
        let url = format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'));
        debug!(%url, "Calling mapping provider");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MapsError::RateLimitExceeded {
                retry_after_secs: response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
            });
        }

        if !status.is_success() {
            warn!(%status, %endpoint, "Mapping provider returned error status");
            return Err(MapsError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        serde_json::from_str(&body).map_err(|e| MapsError::ParseError(e.to_string()))
    }

    fn transport_error(&self, e: &reqwest::Error) -> MapsError {
        if e.is_timeout() {
            MapsError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            MapsError::ConnectionFailed(e.to_string())
        }
    }

    fn with_language(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        if let Some(language) = &self.config.language {
            params.push(("language", language.clone()));
        }
        params
    }
}

/// Map a body `status` other than `OK` to an error
///
/// Callers handle the statuses that carry per-operation meaning
/// (`ZERO_RESULTS`, `NOT_FOUND`) before falling back to this.
fn status_error(status: &str, message: Option<String>) -> MapsError {
    if status == STATUS_OVER_QUERY_LIMIT {
        return MapsError::RateLimitExceeded {
            retry_after_secs: None,
        };
    }
    MapsError::ProviderStatus {
        status: status.to_string(),
        message,
    }
}

#[async_trait]
impl MapsClient for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn autocomplete(
        &self,
        input: &str,
        region_bias: Option<&str>,
    ) -> Result<Vec<Prediction>, MapsError> {
        let input = input.trim();
        if input.chars().count() < self.config.min_query_chars {
            debug!("Query below minimum length, skipping autocomplete");
            return Ok(Vec::new());
        }

        let mut params = vec![("input", input.to_string()), ("key", self.api_key())];
        if let Some(components) = region_bias.filter(|c| !c.is_empty()) {
            params.push(("components", components.to_string()));
        }
        let params = self.with_language(params);

        let raw: RawAutocompleteResponse =
            self.get_json("place/autocomplete/json", &params).await?;

        match raw.status.as_str() {
            STATUS_OK => {},
            STATUS_ZERO_RESULTS => return Ok(Vec::new()),
            _ => return Err(status_error(&raw.status, raw.error_message)),
        }

        let predictions: Vec<Prediction> =
            raw.predictions.into_iter().map(Prediction::from).collect();
        debug!(count = predictions.len(), "Autocomplete predictions received");
        Ok(predictions)
    }

    #[instrument(skip(self))]
    async fn place_details(&self, place_id: &str) -> Result<Coordinate, MapsError> {
        if place_id.trim().is_empty() {
            return Err(MapsError::PlaceNotFound(
                "Place identifier must not be empty".to_string(),
            ));
        }

        let params = self.with_language(vec![
            ("place_id", place_id.to_string()),
            ("fields", "geometry".to_string()),
            ("key", self.api_key()),
        ]);

        let raw: RawPlaceDetailsResponse = self.get_json("place/details/json", &params).await?;

        match raw.status.as_str() {
            STATUS_OK => {},
            STATUS_ZERO_RESULTS | STATUS_NOT_FOUND => {
                return Err(MapsError::PlaceNotFound(place_id.to_string()));
            },
            _ => return Err(status_error(&raw.status, raw.error_message)),
        }

        let location = raw
            .result
            .and_then(|place| place.geometry)
            .map(|geometry| geometry.location)
            .ok_or_else(|| MapsError::PlaceNotFound(place_id.to_string()))?;

        let coordinate = Coordinate::new(location.lat, location.lng)
            .map_err(|e| MapsError::ParseError(e.to_string()))?;
        debug!(%coordinate, "Place resolved");
        Ok(coordinate)
    }

    #[instrument(skip(self), fields(from = %origin, to = %destination))]
    async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Directions, MapsError> {
        let no_routes = || MapsError::NoRoutesFound {
            from: origin.to_query_value(),
            to: destination.to_query_value(),
        };

        let params = self.with_language(vec![
            ("origin", origin.to_query_value()),
            ("destination", destination.to_query_value()),
            ("mode", self.config.travel_mode.clone()),
            ("key", self.api_key()),
        ]);

        let raw: RawDirectionsResponse = self.get_json("directions/json", &params).await?;

        match raw.status.as_str() {
            STATUS_OK => {},
            STATUS_ZERO_RESULTS | STATUS_NOT_FOUND => return Err(no_routes()),
            _ => return Err(status_error(&raw.status, raw.error_message)),
        }

        let route = raw.routes.into_iter().next().ok_or_else(|| {
            warn!("Provider reported OK without routes");
            no_routes()
        })?;

        let directions = Directions::from(route);
        debug!(
            legs = directions.legs.len(),
            distance_m = ?directions.distance_m(),
            "Directions received"
        );
        Ok(directions)
    }

    /// Reachability only: the request carries no key, so it is never billed
    /// and any HTTP answer (including a denial) counts as healthy.
    async fn is_healthy(&self) -> bool {
        let url = format!(
            "{}/place/autocomplete/json",
            self.config.base_url.trim_end_matches('/')
        );
        self.client
            .get(&url)
            .query(&[("input", "health")])
            .send()
            .await
            .is_ok()
    }
}
