//! Mapping provider integration
//!
//! Provides place autocomplete, place details, and driving directions via the
//! [Google Maps Platform](https://developers.google.com/maps/documentation) JSON
//! web services.
//!
//! # Architecture
//!
//! The crate follows a client-trait pattern consistent with other integration crates.
//! [`MapsClient`] defines the three network operations, implemented by
//! [`GoogleMapsClient`]. Every failure is reported as a typed [`MapsError`] so
//! callers can decide between retrying and giving up; nothing is cached here.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_maps::{GoogleMapsClient, MapsClient, MapsConfig};
//!
//! let config = MapsConfig::with_api_key("...");
//! let client = GoogleMapsClient::new(&config)?;
//!
//! let predictions = client.autocomplete("Santa Ana Maya", Some("country:mx")).await?;
//! let destination = client.place_details(&predictions[0].place_id).await?;
//! let directions = client.directions(origin, destination).await?;
//! ```

mod client;
mod config;
mod error;
mod models;

pub use client::{GoogleMapsClient, MapsClient};
pub use config::MapsConfig;
pub use error::MapsError;
pub use models::{Directions, DirectionsLeg, Prediction};
