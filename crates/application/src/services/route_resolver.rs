//! Route resolution
//!
//! [`RouteFetcher`] turns a [`RouteRequest`] into a decoded [`Route`]:
//! directions call with retry, polyline decoding, optional short-lived cache.
//! [`RouteResolver`] runs fetches as tasks with last-request-wins semantics:
//! issuing a new request aborts the one in flight, and every outcome is
//! tagged with the generation it was issued under.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domain::entities::{Route, RouteRequest};
use domain::polyline;
use domain::value_objects::Coordinate;
use moka::future::Cache;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::error::NavigationError;
use crate::ports::{EncodedRoute, GeoPort};
use crate::services::events::{EventSink, NavigationEvent};
use crate::services::retry::{RetryConfig, with_retry};

/// Decode provider route geometry into a single point sequence
///
/// # Errors
///
/// `NoRouteFound` when there is no geometry at all, `MalformedPolyline` when
/// any segment fails to decode or the result has no points. A bad segment
/// fails the whole route; partial geometry is never returned.
pub fn decode_route(encoded: &EncodedRoute) -> Result<Route, NavigationError> {
    if encoded.segments.is_empty() {
        return Err(NavigationError::NoRouteFound);
    }

    let segments = encoded
        .segments
        .iter()
        .map(|segment| polyline::decode(segment))
        .collect::<Result<Vec<_>, _>>()?;

    let route = Route::from_segments(segments);
    if route.is_empty() {
        return Err(NavigationError::MalformedPolyline(
            "route geometry has no points".to_string(),
        ));
    }
    Ok(route)
}

/// Fetches and decodes routes
#[derive(Clone)]
pub struct RouteFetcher {
    geo: Arc<dyn GeoPort>,
    retry: RetryConfig,
    cache: Option<Cache<[i64; 4], Route>>,
}

impl fmt::Debug for RouteFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteFetcher")
            .field("retry", &self.retry)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl RouteFetcher {
    /// Create a fetcher without cache
    pub fn new(geo: Arc<dyn GeoPort>, retry: RetryConfig) -> Self {
        Self {
            geo,
            retry,
            cache: None,
        }
    }

    /// Cache decoded routes for `ttl`; a zero TTL leaves caching off
    #[must_use]
    pub fn with_cache(mut self, ttl: Duration, capacity: u64) -> Self {
        self.cache = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build()
        });
        self
    }

    /// Fetch the route for `request`
    ///
    /// Network and rate-limit failures are retried per the retry policy;
    /// the final error is returned unchanged.
    #[instrument(skip(self), fields(origin = %request.origin, destination = %request.destination))]
    pub async fn fetch(&self, request: RouteRequest) -> Result<Route, NavigationError> {
        let key = request.quantized();
        if let Some(route) = self.cached(&key).await {
            debug!(points = route.len(), "Route served from cache");
            return Ok(route);
        }

        let outcome = with_retry(&self.retry, || self.geo.directions(&request)).await;
        let attempts = outcome.attempts;
        let elapsed_ms = outcome.total_duration.as_millis();
        let encoded = outcome.into_result()?;

        let route = decode_route(&encoded).inspect_err(|e| {
            warn!(error = %e, segments = encoded.segments.len(), "Route geometry rejected");
        })?;

        if let Some(cache) = &self.cache {
            cache.insert(key, route.clone()).await;
        }

        debug!(
            points = route.len(),
            attempts,
            elapsed_ms,
            distance_m = ?encoded.distance_m,
            duration_secs = ?encoded.duration_secs,
            "Route resolved"
        );
        Ok(route)
    }

    async fn cached(&self, key: &[i64; 4]) -> Option<Route> {
        match &self.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }
}

/// Last-request-wins route resolver
///
/// Single owner: only the session that created it issues requests. Outcomes
/// arrive as [`NavigationEvent::RouteResolved`] on the session's queue.
#[derive(Debug)]
pub struct RouteResolver {
    fetcher: RouteFetcher,
    sink: EventSink,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl RouteResolver {
    /// Create a resolver reporting to `sink`
    #[must_use]
    pub const fn new(fetcher: RouteFetcher, sink: EventSink) -> Self {
        Self {
            fetcher,
            sink,
            generation: 0,
            in_flight: None,
        }
    }

    /// Start resolving `request`, superseding any request in flight
    ///
    /// Returns the generation the outcome will carry. Must be called from
    /// within a tokio runtime.
    pub fn resolve(&mut self, request: RouteRequest) -> u64 {
        self.abort_in_flight();
        self.generation += 1;
        let generation = self.generation;

        let fetcher = self.fetcher.clone();
        let sink = self.sink.clone();
        debug!(generation, origin = %request.origin, destination = %request.destination, "Requesting route");

        self.in_flight = Some(tokio::spawn(async move {
            let result = fetcher.fetch(request).await;
            if !sink.send(NavigationEvent::RouteResolved { generation, result }) {
                debug!(generation, "Session gone, dropping route outcome");
            }
        }));
        generation
    }

    /// Start resolving between possibly-unknown endpoints
    ///
    /// # Errors
    ///
    /// `InvalidRequest` if either endpoint is unknown; nothing is sent.
    pub fn resolve_between(
        &mut self,
        origin: Option<Coordinate>,
        destination: Option<Coordinate>,
    ) -> Result<u64, NavigationError> {
        let request = RouteRequest::try_new(origin, destination)?;
        Ok(self.resolve(request))
    }

    /// Abandon the request in flight; its outcome, if any, becomes stale
    pub fn cancel(&mut self) {
        if self.abort_in_flight() {
            debug!(generation = self.generation, "Route request cancelled");
        }
        self.generation += 1;
    }

    /// Generation of the most recent request
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `generation` belongs to the most recent request
    #[must_use]
    pub const fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn abort_in_flight(&mut self) -> bool {
        match self.in_flight.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            },
            _ => false,
        }
    }
}

impl Drop for RouteResolver {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
