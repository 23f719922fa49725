//! Port definitions - Interfaces for external dependencies
//!
//! Ports define how the application layer talks to the outside world.
//! Adapters in the infrastructure layer implement these traits.

mod geo_port;
mod location_port;

pub use geo_port::{AutocompleteQuery, EncodedRoute, GeoPort};
#[cfg(test)]
pub use geo_port::MockGeoPort;
pub use location_port::LocationPort;
#[cfg(test)]
pub use location_port::MockLocationPort;
