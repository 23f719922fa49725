//! Navigation state
//!
//! Owns user location, destination, and the displayed route, and decides
//! when a new route is needed. Route outcomes are applied only when they
//! answer the latest request; a failed request never blanks a displayed
//! route.

use std::sync::Arc;

use domain::entities::Route;
use domain::value_objects::Coordinate;
use tracing::{debug, info, warn};

use crate::error::NavigationError;
use crate::services::route_resolver::RouteResolver;

/// Location, destination, and route for one session
#[derive(Debug)]
pub struct NavigationState {
    resolver: RouteResolver,
    reroute_threshold_m: f64,
    user_location: Option<Coordinate>,
    destination: Option<Coordinate>,
    route: Option<Arc<Route>>,
    pending: Option<u64>,
    requested_origin: Option<Coordinate>,
    resolved_origin: Option<Coordinate>,
}

impl NavigationState {
    /// Create an empty state driving `resolver`
    #[must_use]
    pub const fn new(resolver: RouteResolver, reroute_threshold_m: f64) -> Self {
        Self {
            resolver,
            reroute_threshold_m,
            user_location: None,
            destination: None,
            route: None,
            pending: None,
            requested_origin: None,
            resolved_origin: None,
        }
    }

    /// Record the user's location
    ///
    /// Requests a route when a destination is set and the user moved beyond
    /// the re-route threshold from the origin of the displayed route, or
    /// there is no route at all. While a request is in flight, moves within
    /// the threshold of its origin are not requested again. Returns the
    /// generation of the request started, if any.
    pub fn set_user_location(&mut self, location: Coordinate) -> Option<u64> {
        self.user_location = Some(location);
        self.destination?;

        let beyond = |origin: Option<Coordinate>| {
            origin.is_none_or(|o| o.distance_m(&location) > self.reroute_threshold_m)
        };
        let needed = if self.pending.is_some() {
            beyond(self.requested_origin)
        } else {
            self.route.is_none() || beyond(self.resolved_origin)
        };

        if needed {
            self.start_request()
        } else {
            None
        }
    }

    /// Set a new destination
    ///
    /// The previous route is dropped and any request for it is abandoned.
    /// Requests a route right away when the user's location is known.
    pub fn set_destination(&mut self, destination: Coordinate) -> Option<u64> {
        info!(%destination, "Destination set");
        self.destination = Some(destination);
        self.route = None;
        self.resolved_origin = None;
        if self.pending.take().is_some() {
            self.resolver.cancel();
        }

        self.user_location?;
        self.start_request()
    }

    /// Request a route for the current location and destination
    ///
    /// # Errors
    ///
    /// `InvalidRequest` if either is unknown.
    pub fn request_route(&mut self) -> Result<u64, NavigationError> {
        let generation = self
            .resolver
            .resolve_between(self.user_location, self.destination)?;
        self.pending = Some(generation);
        self.requested_origin = self.user_location;
        Ok(generation)
    }

    fn start_request(&mut self) -> Option<u64> {
        match self.request_route() {
            Ok(generation) => Some(generation),
            Err(err) => {
                warn!(error = %err, "Route not requested");
                None
            },
        }
    }

    /// Install a resolved route if it answers the latest request
    ///
    /// Returns whether it was applied.
    pub fn apply_route(&mut self, generation: u64, route: Route) -> bool {
        if !self.is_awaiting(generation) {
            debug!(generation, "Discarding stale route");
            return false;
        }
        self.pending = None;
        self.resolved_origin = self.requested_origin.take();
        debug!(
            generation,
            points = route.len(),
            length_m = route.length_m().round(),
            "Route applied"
        );
        self.route = Some(Arc::new(route));
        true
    }

    /// Record a failed request if it is the latest one
    ///
    /// The displayed route is kept. Returns whether the failure was current.
    pub fn apply_route_error(&mut self, generation: u64, error: &NavigationError) -> bool {
        if !self.is_awaiting(generation) {
            debug!(generation, error = %error, "Discarding stale route failure");
            return false;
        }
        self.pending = None;
        self.requested_origin = None;
        warn!(
            generation,
            error = %error,
            kind = %error.kind(),
            kept_route = self.route.is_some(),
            "Route request failed"
        );
        true
    }

    fn is_awaiting(&self, generation: u64) -> bool {
        self.pending == Some(generation) && self.resolver.is_current(generation)
    }

    /// Abandon any request in flight
    pub fn cancel(&mut self) {
        self.pending = None;
        self.requested_origin = None;
        self.resolver.cancel();
    }

    /// User's last known location
    #[must_use]
    pub const fn user_location(&self) -> Option<Coordinate> {
        self.user_location
    }

    /// Current destination
    #[must_use]
    pub const fn destination(&self) -> Option<Coordinate> {
        self.destination
    }

    /// Displayed route
    #[must_use]
    pub fn route(&self) -> Option<Arc<Route>> {
        self.route.clone()
    }

    /// Whether a route request is outstanding
    #[must_use]
    pub const fn is_route_pending(&self) -> bool {
        self.pending.is_some()
    }
}
