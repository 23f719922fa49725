//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Latitude or longitude outside the valid WGS84 range
    #[error(
        "Invalid coordinates ({latitude}, {longitude}): latitude must be -90 to 90, longitude must be -180 to 180"
    )]
    InvalidCoordinates {
        /// Rejected latitude
        latitude: f64,
        /// Rejected longitude
        longitude: f64,
    },

    /// A route request was built while one of its endpoints was unknown
    #[error("Incomplete route request: {missing} is not known")]
    IncompleteRouteRequest {
        /// Which endpoint is missing ("origin" or "destination")
        missing: &'static str,
    },
}

impl DomainError {
    /// Create an invalid coordinates error
    #[must_use]
    pub const fn invalid_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::InvalidCoordinates {
            latitude,
            longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_coordinates_message_contains_values() {
        let err = DomainError::invalid_coordinates(91.0, 10.0);
        let msg = err.to_string();
        assert!(msg.contains("91"));
        assert!(msg.contains("-90 to 90"));
    }

    #[test]
    fn incomplete_request_names_missing_side() {
        let err = DomainError::IncompleteRouteRequest {
            missing: "destination",
        };
        assert_eq!(
            err.to_string(),
            "Incomplete route request: destination is not known"
        );
    }
}
