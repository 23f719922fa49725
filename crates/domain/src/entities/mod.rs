//! Domain entities - Objects produced and consumed by the navigation pipeline

mod place_suggestion;
mod route;

pub use place_suggestion::PlaceSuggestion;
pub use route::{Route, RouteRequest};
