//! Place search state machine
//!
//! Tracks the query text, the autocomplete request in flight, and the
//! current suggestion list. Every request carries a token; a response whose
//! token is not the latest one is discarded no matter when it arrives.

use std::fmt;
use std::sync::Arc;

use domain::entities::PlaceSuggestion;
use domain::value_objects::Coordinate;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{ErrorKind, NavigationError};
use crate::ports::{AutocompleteQuery, GeoPort};
use crate::services::events::{EventSink, NavigationEvent};

/// Where the search currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "error", rename_all = "snake_case")]
pub enum SearchPhase {
    /// No lookup requested
    #[default]
    Idle,
    /// Waiting for suggestions for the current query
    Pending,
    /// Suggestions for the current query are available
    Results,
    /// The lookup for the current query failed
    Error(ErrorKind),
}

/// Search settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Queries shorter than this many characters never reach the network
    pub min_query_chars: usize,
    /// Region filter passed along with every lookup
    pub region_bias: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_chars: 3,
            region_bias: None,
        }
    }
}

/// Autocomplete and suggestion selection for one session
pub struct SearchSession {
    geo: Arc<dyn GeoPort>,
    sink: EventSink,
    settings: SearchSettings,
    query: String,
    phase: SearchPhase,
    suggestions: Vec<PlaceSuggestion>,
    token: u64,
    in_flight: Option<JoinHandle<()>>,
    place_token: u64,
    place_in_flight: Option<JoinHandle<()>>,
}

impl fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSession")
            .field("query", &self.query)
            .field("phase", &self.phase)
            .field("suggestions", &self.suggestions.len())
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    /// Create an idle search session reporting to `sink`
    pub fn new(geo: Arc<dyn GeoPort>, sink: EventSink, settings: SearchSettings) -> Self {
        Self {
            geo,
            sink,
            settings,
            query: String::new(),
            phase: SearchPhase::Idle,
            suggestions: Vec::new(),
            token: 0,
            in_flight: None,
            place_token: 0,
            place_in_flight: None,
        }
    }

    /// Handle new query text
    ///
    /// Any lookup in flight is superseded. Short or empty queries return the
    /// session to `Idle` without a lookup. Returns the token of the lookup
    /// started, if any.
    pub fn query_changed(&mut self, text: impl Into<String>) -> Option<u64> {
        self.query = text.into();
        abort(&mut self.in_flight);
        self.token += 1;

        let trimmed = self.query.trim();
        if trimmed.chars().count() < self.settings.min_query_chars {
            self.phase = SearchPhase::Idle;
            self.suggestions.clear();
            return None;
        }

        let token = self.token;
        let query = AutocompleteQuery::new(trimmed)
            .with_region_bias(self.settings.region_bias.clone());
        let geo = Arc::clone(&self.geo);
        let sink = self.sink.clone();
        debug!(token, query = %query.text, "Requesting suggestions");

        self.in_flight = Some(tokio::spawn(async move {
            let result = geo.autocomplete(&query).await;
            sink.send(NavigationEvent::SuggestionsResolved { token, result });
        }));
        self.phase = SearchPhase::Pending;
        Some(token)
    }

    /// Apply an autocomplete outcome
    ///
    /// Returns `Ok(true)` when applied, `Ok(false)` when stale, and the error
    /// itself when the current lookup failed (suggestions are cleared).
    pub fn on_suggestions(
        &mut self,
        token: u64,
        result: Result<Vec<PlaceSuggestion>, NavigationError>,
    ) -> Result<bool, NavigationError> {
        if token != self.token || self.phase != SearchPhase::Pending {
            debug!(token, current = self.token, "Discarding stale suggestions");
            return Ok(false);
        }
        self.in_flight = None;

        match result {
            Ok(suggestions) => {
                debug!(token, count = suggestions.len(), "Suggestions applied");
                self.suggestions = suggestions;
                self.phase = SearchPhase::Results;
                Ok(true)
            },
            Err(err) => {
                warn!(token, error = %err, kind = %err.kind(), "Autocomplete failed");
                self.suggestions.clear();
                self.phase = SearchPhase::Error(err.kind());
                Err(err)
            },
        }
    }

    /// Select a suggestion by its place reference
    ///
    /// The query text becomes the suggestion's label, suggestions are
    /// cleared, and a place lookup starts (superseding an earlier one).
    /// Unknown references are looked up as-is with the query left alone.
    /// Returns the place lookup token.
    pub fn select(&mut self, place_ref: &str) -> u64 {
        if let Some(selected) = self.suggestions.iter().find(|s| s.place_ref == place_ref) {
            self.query.clone_from(&selected.label);
        } else {
            debug!(place_ref, "Selected reference is not among current suggestions");
        }

        abort(&mut self.in_flight);
        self.token += 1;
        self.suggestions.clear();
        self.phase = SearchPhase::Idle;

        abort(&mut self.place_in_flight);
        self.place_token += 1;
        let token = self.place_token;
        let place_ref = place_ref.to_string();
        let geo = Arc::clone(&self.geo);
        let sink = self.sink.clone();
        debug!(token, %place_ref, "Resolving selected place");

        self.place_in_flight = Some(tokio::spawn(async move {
            let result = geo.place_details(&place_ref).await;
            sink.send(NavigationEvent::PlaceResolved { token, result });
        }));
        token
    }

    /// Apply a place lookup outcome
    ///
    /// Returns the destination when applied, `None` when stale, and the
    /// error when the current lookup failed. The query text is kept either
    /// way.
    pub fn on_place_resolved(
        &mut self,
        token: u64,
        result: Result<Coordinate, NavigationError>,
    ) -> Result<Option<Coordinate>, NavigationError> {
        if token != self.place_token || self.place_in_flight.is_none() {
            debug!(token, current = self.place_token, "Discarding stale place");
            return Ok(None);
        }
        self.place_in_flight = None;

        match result {
            Ok(coordinate) => {
                debug!(token, %coordinate, "Place resolved");
                Ok(Some(coordinate))
            },
            Err(err) => {
                warn!(token, error = %err, kind = %err.kind(), "Place lookup failed");
                Err(err)
            },
        }
    }

    /// Abandon every lookup in flight
    pub fn cancel(&mut self) {
        abort(&mut self.in_flight);
        abort(&mut self.place_in_flight);
        self.token += 1;
        self.place_token += 1;
        if self.phase == SearchPhase::Pending {
            self.phase = SearchPhase::Idle;
        }
    }

    /// Current query text
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Current suggestions
    #[must_use]
    pub fn suggestions(&self) -> &[PlaceSuggestion] {
        &self.suggestions
    }

    /// Whether a place lookup is outstanding
    #[must_use]
    pub const fn is_resolving_place(&self) -> bool {
        self.place_in_flight.is_some()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        abort(&mut self.in_flight);
        abort(&mut self.place_in_flight);
    }
}

fn abort(slot: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = slot.take() {
        handle.abort();
    }
}
