//! Application services
//!
//! Single-owner state machines for search and routing, and the session actor
//! that drives them from one event queue.

pub mod events;
mod navigation_session;
mod navigation_state;
pub mod retry;
mod route_resolver;
mod search_session;

pub use events::{EventSink, NavigationEvent};
pub use navigation_session::{
    NavigationHandle, NavigationSession, NavigationSnapshot, Notice, NoticeKind, SessionClosed,
};
pub use navigation_state::NavigationState;
pub use retry::{RetryConfig, Retryable, with_retry};
pub use route_resolver::{RouteFetcher, RouteResolver, decode_route};
pub use search_session::{SearchPhase, SearchSession, SearchSettings};
