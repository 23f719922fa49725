//! Mapping provider data models
//!
//! Typed results handed to callers plus the raw JSON shapes they are parsed
//! from. Only the fields the navigation pipeline needs are modelled.

use serde::{Deserialize, Serialize};

/// A single autocomplete prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Human-readable description
    pub description: String,
    /// Provider place identifier
    pub place_id: String,
}

/// The first route returned by a directions request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directions {
    /// Legs of the route in travel order
    pub legs: Vec<DirectionsLeg>,
    /// Simplified whole-route polyline, if the provider sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview_polyline: Option<String>,
}

impl Directions {
    /// Encoded polylines of every step, in travel order
    ///
    /// Steps of all legs are concatenated, so a route through waypoints comes
    /// out as one continuous path; without waypoints there is a single leg.
    #[must_use]
    pub fn step_polylines(&self) -> Vec<String> {
        self.legs
            .iter()
            .flat_map(|leg| leg.step_polylines.iter().cloned())
            .collect()
    }

    /// Total distance in meters, when every leg reports one
    #[must_use]
    pub fn distance_m(&self) -> Option<u64> {
        self.legs.iter().map(|leg| leg.distance_m).sum()
    }

    /// Total duration in seconds, when every leg reports one
    #[must_use]
    pub fn duration_secs(&self) -> Option<u64> {
        self.legs.iter().map(|leg| leg.duration_secs).sum()
    }
}

/// A leg of a route (one per waypoint pair)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionsLeg {
    /// Encoded polyline of each step
    pub step_polylines: Vec<String>,
    /// Leg distance in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<u64>,
    /// Leg duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
pub(crate) struct RawAutocompleteResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub predictions: Vec<RawPrediction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPrediction {
    pub description: String,
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlaceDetailsResponse {
    pub status: String,
    pub error_message: Option<String>,
    pub result: Option<RawPlace>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlace {
    pub geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGeometry {
    pub location: RawLatLng,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDirectionsResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRoute {
    #[serde(default)]
    pub legs: Vec<RawLeg>,
    pub overview_polyline: Option<RawPolyline>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLeg {
    #[serde(default)]
    pub steps: Vec<RawStep>,
    pub distance: Option<RawValue>,
    pub duration: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStep {
    pub polyline: RawPolyline,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPolyline {
    pub points: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawValue {
    pub value: u64,
}

impl From<RawPrediction> for Prediction {
    fn from(raw: RawPrediction) -> Self {
        Self {
            description: raw.description,
            place_id: raw.place_id,
        }
    }
}

impl From<RawRoute> for Directions {
    fn from(raw: RawRoute) -> Self {
        let legs = raw
            .legs
            .into_iter()
            .map(|leg| DirectionsLeg {
                step_polylines: leg.steps.into_iter().map(|s| s.polyline.points).collect(),
                distance_m: leg.distance.map(|d| d.value),
                duration_secs: leg.duration.map(|d| d.value),
            })
            .collect();

        Self {
            legs,
            overview_polyline: raw.overview_polyline.map(|p| p.points),
        }
    }
}
