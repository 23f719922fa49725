//! Navigation session actor
//!
//! One task per session owns the search and navigation state machines and
//! processes a single queue of events: user intents from
//! [`NavigationHandle`]s and completions from the lookups those machines
//! start. Nothing else mutates session state, so no locks are involved.
//! After each event a [`NavigationSnapshot`] is published for the renderer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domain::entities::{PlaceSuggestion, Route};
use domain::value_objects::Coordinate;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::NavigationConfig;
use crate::error::{ErrorKind, NavigationError};
use crate::ports::{GeoPort, LocationPort};
use crate::services::events::{EventSink, NavigationEvent};
use crate::services::navigation_state::NavigationState;
use crate::services::route_resolver::{RouteFetcher, RouteResolver};
use crate::services::search_session::{SearchPhase, SearchSession, SearchSettings};

/// What a notice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Autocomplete failed; suggestions were cleared
    SearchFailed,
    /// The selected place could not be resolved
    PlaceLookupFailed,
    /// No new route; the previous one, if any, is still shown
    RouteUnavailable,
}

/// A transient, non-blocking message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// What failed
    pub kind: NoticeKind,
    /// Why it failed
    pub error: ErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, error: &NavigationError) -> Self {
        Self {
            kind,
            error: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Read-only view of a session for the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationSnapshot {
    /// User's last known location
    pub user_location: Option<Coordinate>,
    /// Current destination
    pub destination: Option<Coordinate>,
    /// Displayed route
    pub route: Option<Arc<Route>>,
    /// Current suggestions
    pub suggestions: Vec<PlaceSuggestion>,
    /// Search text
    pub search_query: String,
    /// Search phase
    pub search_phase: SearchPhase,
    /// Whether a route request is outstanding
    pub route_pending: bool,
    /// Latest notice, cleared by the next success
    pub notice: Option<Notice>,
}

/// The session has stopped and accepts no more events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Navigation session has shut down")]
pub struct SessionClosed;

/// Cloneable handle for sending intents and observing snapshots
#[derive(Debug, Clone)]
pub struct NavigationHandle {
    events: mpsc::UnboundedSender<NavigationEvent>,
    snapshots: watch::Receiver<NavigationSnapshot>,
}

impl NavigationHandle {
    fn send(&self, event: NavigationEvent) -> Result<(), SessionClosed> {
        self.events.send(event).map_err(|_| SessionClosed)
    }

    /// The search text changed
    pub fn query_changed(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(NavigationEvent::QueryChanged(text.into()))
    }

    /// The user picked a suggestion
    pub fn suggestion_selected(&self, place_ref: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(NavigationEvent::SuggestionSelected(place_ref.into()))
    }

    /// The device reported a location
    pub fn location_updated(&self, location: Coordinate) -> Result<(), SessionClosed> {
        self.send(NavigationEvent::LocationUpdated(location))
    }

    /// Ask the location provider for a fresh fix
    pub fn refresh_location(&self) -> Result<(), SessionClosed> {
        self.send(NavigationEvent::RefreshLocation)
    }

    /// Set the destination directly
    pub fn set_destination(&self, destination: Coordinate) -> Result<(), SessionClosed> {
        self.send(NavigationEvent::SetDestination(destination))
    }

    /// Stop the session; lookups in flight are abandoned
    pub fn shutdown(&self) -> Result<(), SessionClosed> {
        self.send(NavigationEvent::Shutdown)
    }

    /// Latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> NavigationSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every published snapshot
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NavigationSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&NavigationSnapshot) -> bool,
    ) -> Result<NavigationSnapshot, SessionClosed> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(predicate)
            .await
            .map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }
}

/// The per-session actor
pub struct NavigationSession {
    search: SearchSession,
    state: NavigationState,
    location: Arc<dyn LocationPort>,
    fixed_destination: Option<Coordinate>,
    notice: Option<Notice>,
    sink: EventSink,
    events: mpsc::UnboundedReceiver<NavigationEvent>,
    snapshots: watch::Sender<NavigationSnapshot>,
}

impl fmt::Debug for NavigationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationSession")
            .field("search", &self.search)
            .field("state", &self.state)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

impl NavigationSession {
    /// Create a session and its first handle
    ///
    /// Nothing happens until [`run`](Self::run) is awaited.
    pub fn new(
        geo: Arc<dyn GeoPort>,
        location: Arc<dyn LocationPort>,
        config: &NavigationConfig,
    ) -> (Self, NavigationHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(NavigationSnapshot::default());
        let sink = EventSink::new(&tx);

        let search = SearchSession::new(
            Arc::clone(&geo),
            sink.clone(),
            SearchSettings {
                min_query_chars: config.min_query_chars,
                region_bias: config.region_bias.clone(),
            },
        );

        let fetcher = RouteFetcher::new(geo, config.retry.clone()).with_cache(
            Duration::from_secs(config.route_cache_ttl_secs),
            config.route_cache_capacity,
        );
        let resolver = RouteResolver::new(fetcher, sink.clone());
        let state = NavigationState::new(resolver, config.reroute_threshold_m);

        let session = Self {
            search,
            state,
            location,
            fixed_destination: config.destination.fixed_coordinate(),
            notice: None,
            sink,
            events,
            snapshots,
        };
        let handle = NavigationHandle {
            events: tx,
            snapshots: snapshot_rx,
        };
        (session, handle)
    }

    /// Create a session and run it on a new task
    pub fn spawn(
        geo: Arc<dyn GeoPort>,
        location: Arc<dyn LocationPort>,
        config: &NavigationConfig,
    ) -> (NavigationHandle, JoinHandle<()>) {
        let (session, handle) = Self::new(geo, location, config);
        (handle, tokio::spawn(session.run()))
    }

    /// Process events until shutdown or until every handle is dropped
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Navigation session started");
        self.start();
        self.publish();

        while let Some(event) = self.events.recv().await {
            if matches!(event, NavigationEvent::Shutdown) {
                break;
            }
            self.handle(event);
            self.publish();
        }

        self.search.cancel();
        self.state.cancel();
        self.publish();
        info!("Navigation session stopped");
    }

    fn start(&mut self) {
        if let Some(destination) = self.fixed_destination {
            self.state.set_destination(destination);
        }
        self.refresh_location();
    }

    /// Query the location provider off the session task
    fn refresh_location(&self) {
        let location = Arc::clone(&self.location);
        let sink = self.sink.clone();
        tokio::spawn(async move {
            match location.last_known_location().await {
                Some(coordinate) => {
                    sink.send(NavigationEvent::LocationUpdated(coordinate));
                },
                None => debug!("No location available"),
            }
        });
    }

    fn handle(&mut self, event: NavigationEvent) {
        match event {
            NavigationEvent::QueryChanged(text) => {
                self.search.query_changed(text);
            },
            NavigationEvent::SuggestionSelected(place_ref) => {
                self.search.select(&place_ref);
            },
            NavigationEvent::LocationUpdated(location) => {
                self.state.set_user_location(location);
            },
            NavigationEvent::RefreshLocation => self.refresh_location(),
            NavigationEvent::SetDestination(destination) => {
                self.state.set_destination(destination);
            },
            NavigationEvent::SuggestionsResolved { token, result } => {
                match self.search.on_suggestions(token, result) {
                    Ok(true) => self.clear_notice(),
                    Ok(false) => {},
                    Err(err) => self.notify(NoticeKind::SearchFailed, &err),
                }
            },
            NavigationEvent::PlaceResolved { token, result } => {
                match self.search.on_place_resolved(token, result) {
                    Ok(Some(destination)) => {
                        self.state.set_destination(destination);
                    },
                    Ok(None) => {},
                    Err(err) => self.notify(NoticeKind::PlaceLookupFailed, &err),
                }
            },
            NavigationEvent::RouteResolved { generation, result } => match result {
                Ok(route) => {
                    if self.state.apply_route(generation, route) {
                        self.clear_notice();
                    }
                },
                Err(err) => {
                    if self.state.apply_route_error(generation, &err) {
                        self.notify(NoticeKind::RouteUnavailable, &err);
                    }
                },
            },
            NavigationEvent::Shutdown => {},
        }
    }

    fn notify(&mut self, kind: NoticeKind, error: &NavigationError) {
        warn!(?kind, error = %error, "Notice raised");
        self.notice = Some(Notice::new(kind, error));
    }

    fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            user_location: self.state.user_location(),
            destination: self.state.destination(),
            route: self.state.route(),
            suggestions: self.search.suggestions().to_vec(),
            search_query: self.search.query().to_string(),
            search_phase: self.search.phase(),
            route_pending: self.state.is_route_pending(),
            notice: self.notice.clone(),
        }
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use domain::entities::RouteRequest;

    use super::*;
    use crate::ports::{EncodedRoute, MockGeoPort, MockLocationPort};

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn santa_ana_maya() -> Coordinate {
        c(20.006_686, -101.021_450)
    }

    fn straight_line(request: &RouteRequest) -> Result<EncodedRoute, NavigationError> {
        Ok(EncodedRoute::from_segments(vec![domain::polyline::encode(
            &[request.origin, request.destination],
        )]))
    }

    fn located_at(location: Option<Coordinate>) -> MockLocationPort {
        let mut port = MockLocationPort::new();
        port.expect_last_known_location().returning(move || location);
        port
    }

    #[tokio::test]
    async fn select_suggestion_produces_route() {
        let mut geo = MockGeoPort::new();
        geo.expect_autocomplete()
            .returning(|_| Ok(vec![PlaceSuggestion::new("Santa Ana Maya", "ref-sam")]));
        geo.expect_place_details()
            .returning(|_| Ok(Coordinate::new(20.006_686, -101.021_450).unwrap()));
        geo.expect_directions().returning(straight_line);

        let (handle, task) = NavigationSession::spawn(
            Arc::new(geo),
            Arc::new(located_at(Some(Coordinate::mexico_city()))),
            &NavigationConfig::for_testing(),
        );

        handle
            .wait_for(|s| s.user_location.is_some())
            .await
            .unwrap();
        handle.query_changed("Santa Ana").unwrap();
        let snapshot = handle
            .wait_for(|s| s.search_phase == SearchPhase::Results)
            .await
            .unwrap();
        assert_eq!(snapshot.suggestions[0].place_ref, "ref-sam");

        handle.suggestion_selected("ref-sam").unwrap();
        let snapshot = handle.wait_for(|s| s.route.is_some()).await.unwrap();

        assert_eq!(snapshot.search_query, "Santa Ana Maya");
        assert!(snapshot.suggestions.is_empty());
        let route = snapshot.route.unwrap();
        assert!(route.first().unwrap().approx_eq(&Coordinate::mexico_city(), 1e-5));
        assert!(route.last().unwrap().approx_eq(&santa_ana_maya(), 1e-5));
        assert!(snapshot.notice.is_none());

        handle.shutdown().unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn fixed_destination_routes_once_location_is_known() {
        let mut geo = MockGeoPort::new();
        geo.expect_directions().times(1).returning(straight_line);

        let config = NavigationConfig {
            destination: crate::DestinationSource::Fixed {
                latitude: 20.006_686,
                longitude: -101.021_450,
            },
            ..NavigationConfig::for_testing()
        };
        let (handle, _task) = NavigationSession::spawn(
            Arc::new(geo),
            Arc::new(located_at(Some(Coordinate::mexico_city()))),
            &config,
        );

        let snapshot = handle.wait_for(|s| s.route.is_some()).await.unwrap();
        assert_eq!(snapshot.destination, Some(santa_ana_maya()));
        assert!(!snapshot.route_pending);
    }

    #[tokio::test]
    async fn route_failure_raises_notice_and_keeps_route() {
        let mut geo = MockGeoPort::new();
        let mut calls = 0;
        geo.expect_directions().returning(move |request| {
            calls += 1;
            if calls == 1 {
                straight_line(request)
            } else {
                Err(NavigationError::NoRouteFound)
            }
        });

        let (handle, _task) = NavigationSession::spawn(
            Arc::new(geo),
            Arc::new(located_at(None)),
            &NavigationConfig::for_testing(),
        );

        handle.location_updated(Coordinate::mexico_city()).unwrap();
        handle.set_destination(santa_ana_maya()).unwrap();
        let first = handle.wait_for(|s| s.route.is_some()).await.unwrap();

        handle.location_updated(c(19.5, -99.2)).unwrap();
        let snapshot = handle.wait_for(|s| s.notice.is_some()).await.unwrap();

        let notice = snapshot.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::RouteUnavailable);
        assert_eq!(notice.error, ErrorKind::NoRouteFound);
        assert_eq!(snapshot.route, first.route);
    }

    #[tokio::test]
    async fn undecodable_route_raises_notice_and_keeps_route() {
        let mut geo = MockGeoPort::new();
        let mut calls = 0;
        geo.expect_directions().returning(move |request| {
            calls += 1;
            if calls == 1 {
                straight_line(request)
            } else {
                Ok(EncodedRoute::from_segments(vec!["_p~iF!!!".to_string()]))
            }
        });

        let (handle, _task) = NavigationSession::spawn(
            Arc::new(geo),
            Arc::new(located_at(None)),
            &NavigationConfig::for_testing(),
        );

        handle.location_updated(Coordinate::mexico_city()).unwrap();
        handle.set_destination(santa_ana_maya()).unwrap();
        let first = handle.wait_for(|s| s.route.is_some()).await.unwrap();

        handle.location_updated(c(19.5, -99.2)).unwrap();
        let snapshot = handle.wait_for(|s| s.notice.is_some()).await.unwrap();

        let notice = snapshot.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::RouteUnavailable);
        assert_eq!(notice.error, ErrorKind::MalformedPolyline);
        assert!(notice.message.starts_with("Route unavailable"));
        assert_eq!(snapshot.route, first.route);
        assert!(!snapshot.route_pending);
    }

    #[tokio::test]
    async fn search_failure_raises_notice_and_next_success_clears_it() {
        let mut geo = MockGeoPort::new();
        geo.expect_autocomplete().returning(|query| {
            if query.text == "Santa" {
                Err(NavigationError::timeout("after 10 seconds"))
            } else {
                Ok(vec![PlaceSuggestion::new("Santa Ana Maya", "ref-sam")])
            }
        });

        let (handle, _task) = NavigationSession::spawn(
            Arc::new(geo),
            Arc::new(located_at(None)),
            &NavigationConfig::for_testing(),
        );

        handle.query_changed("Santa").unwrap();
        let snapshot = handle.wait_for(|s| s.notice.is_some()).await.unwrap();
        let notice = snapshot.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::SearchFailed);
        assert_eq!(notice.error, ErrorKind::Network);
        assert_eq!(snapshot.search_phase, SearchPhase::Error(ErrorKind::Network));

        handle.query_changed("Santa Ana").unwrap();
        let snapshot = handle
            .wait_for(|s| s.search_phase == SearchPhase::Results)
            .await
            .unwrap();
        assert!(snapshot.notice.is_none());
    }

    #[tokio::test]
    async fn place_failure_raises_notice_and_keeps_query() {
        let mut geo = MockGeoPort::new();
        geo.expect_place_details()
            .returning(|r| Err(NavigationError::PlaceNotFound(r.to_string())));

        let (handle, _task) = NavigationSession::spawn(
            Arc::new(geo),
            Arc::new(located_at(None)),
            &NavigationConfig::for_testing(),
        );

        handle.query_changed("Sa").unwrap();
        handle.suggestion_selected("ref-gone").unwrap();
        let snapshot = handle.wait_for(|s| s.notice.is_some()).await.unwrap();

        assert_eq!(
            snapshot.notice.unwrap().kind,
            NoticeKind::PlaceLookupFailed
        );
        assert_eq!(snapshot.search_query, "Sa");
        assert!(snapshot.destination.is_none());
    }

    #[tokio::test]
    async fn refresh_location_queries_provider_again() {
        let geo = MockGeoPort::new();
        let mut location = MockLocationPort::new();
        let mut calls = 0;
        location.expect_last_known_location().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                None
            } else {
                Some(Coordinate::mexico_city())
            }
        });

        let (handle, _task) = NavigationSession::spawn(
            Arc::new(geo),
            Arc::new(location),
            &NavigationConfig::for_testing(),
        );

        handle.refresh_location().unwrap();
        let snapshot = handle
            .wait_for(|s| s.user_location.is_some())
            .await
            .unwrap();
        assert_eq!(snapshot.user_location, Some(Coordinate::mexico_city()));
    }

    #[tokio::test]
    async fn shutdown_closes_handles() {
        let (handle, task) = NavigationSession::spawn(
            Arc::new(MockGeoPort::new()),
            Arc::new(located_at(None)),
            &NavigationConfig::for_testing(),
        );

        handle.shutdown().unwrap();
        task.await.unwrap();

        assert_eq!(handle.query_changed("Santa"), Err(SessionClosed));
        assert_eq!(
            handle.wait_for(|s| s.route.is_some()).await,
            Err(SessionClosed)
        );
    }

    #[tokio::test]
    async fn dropping_every_handle_stops_the_session() {
        let (handle, task) = NavigationSession::spawn(
            Arc::new(MockGeoPort::new()),
            Arc::new(located_at(None)),
            &NavigationConfig::for_testing(),
        );

        drop(handle);
        task.await.unwrap();
    }
}
