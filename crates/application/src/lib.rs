//! Application layer - Use cases and orchestration
//!
//! Holds the ports the navigation pipeline needs from the outside world and
//! the single-owner state machines that drive it: search, route resolution,
//! navigation state, and the per-session actor that serializes all of them.

pub mod config;
pub mod error;
pub mod ports;
pub mod services;

pub use config::{DestinationSource, NavigationConfig};
pub use error::{ErrorKind, NavigationError};
pub use ports::*;
pub use services::*;
