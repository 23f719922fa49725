//! Domain layer for the navigation pipeline
//!
//! Contains the value types shared by every other crate (coordinates, place
//! suggestions, route requests and routes) plus the encoded-polyline codec.
//! This layer performs no I/O and has no async code.

pub mod entities;
pub mod errors;
pub mod polyline;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use polyline::PolylineError;
pub use value_objects::*;
