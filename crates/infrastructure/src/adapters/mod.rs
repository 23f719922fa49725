//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod location_adapter;
mod maps_adapter;

pub use location_adapter::FixedLocationProvider;
pub use maps_adapter::{MapsAdapter, map_error};
