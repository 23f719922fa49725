//! Events processed by a navigation session
//!
//! User intents and task completions share one queue so that every state
//! change happens in the order the session dequeues them.

use domain::entities::{PlaceSuggestion, Route};
use domain::value_objects::Coordinate;
use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};

use crate::error::NavigationError;

/// An event for the session's queue
#[derive(Debug)]
pub enum NavigationEvent {
    /// The search text changed
    QueryChanged(String),
    /// The user picked a suggestion by its place reference
    SuggestionSelected(String),
    /// The device reported a new location
    LocationUpdated(Coordinate),
    /// Ask the location provider for a fresh fix
    RefreshLocation,
    /// Set the destination directly
    SetDestination(Coordinate),
    /// Stop the session
    Shutdown,
    /// An autocomplete request finished
    SuggestionsResolved {
        /// Token the request was issued with
        token: u64,
        /// Outcome
        result: Result<Vec<PlaceSuggestion>, NavigationError>,
    },
    /// A place details request finished
    PlaceResolved {
        /// Token the request was issued with
        token: u64,
        /// Outcome
        result: Result<Coordinate, NavigationError>,
    },
    /// A directions request finished
    RouteResolved {
        /// Generation the request was issued with
        generation: u64,
        /// Outcome
        result: Result<Route, NavigationError>,
    },
}

/// Sending side handed to the state machines
///
/// Holds the queue weakly so in-flight tasks never keep a session alive
/// after its last handle is gone.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: WeakUnboundedSender<NavigationEvent>,
}

impl EventSink {
    /// Create a sink feeding the given queue
    #[must_use]
    pub fn new(tx: &UnboundedSender<NavigationEvent>) -> Self {
        Self { tx: tx.downgrade() }
    }

    /// Deliver an event; returns false once the queue is gone
    pub fn send(&self, event: NavigationEvent) -> bool {
        self.tx
            .upgrade()
            .is_some_and(|tx| tx.send(event).is_ok())
    }
}
