//! Application-level errors

use std::fmt;

use domain::{DomainError, PolylineError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the navigation pipeline
///
/// Every failure keeps its kind on the way up so callers can branch on
/// [`NavigationError::kind`] instead of matching on messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// Transport failure or timeout
    #[error("Network error{}: {message}", timeout_suffix(.timeout))]
    Network {
        /// Transport detail
        message: String,
        /// Whether the request hit its deadline
        timeout: bool,
    },

    /// Non-2xx response, error status in the body, or an unparseable body
    #[error("Provider error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Provider {
        /// HTTP status code or provider status string
        status: String,
        /// Provider detail, if any
        message: Option<String>,
    },

    /// Provider quota exhausted
    #[error("Rate limited by provider")]
    RateLimited {
        /// Seconds to wait, when the provider said so
        retry_after_secs: Option<u64>,
    },

    /// Place reference did not resolve to a location
    #[error("Place not found: {0}")]
    PlaceNotFound(String),

    /// Provider found no route between the endpoints
    #[error("No route found")]
    NoRouteFound,

    /// Route geometry could not be decoded
    #[error("Route unavailable: {0}")]
    MalformedPolyline(String),

    /// Caller misuse, e.g. resolving a route with an unknown endpoint
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl NavigationError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timeout: false,
        }
    }

    /// Create a network timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timeout: true,
        }
    }

    /// Create a provider error
    pub fn provider(status: impl Into<String>, message: Option<String>) -> Self {
        Self::Provider {
            status: status.into(),
            message,
        }
    }

    /// The kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::PlaceNotFound(_) => ErrorKind::PlaceNotFound,
            Self::NoRouteFound => ErrorKind::NoRouteFound,
            Self::MalformedPolyline(_) => ErrorKind::MalformedPolyline,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::RateLimited { .. })
    }

    /// Whether this is a network timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { timeout: true, .. })
    }
}

const fn timeout_suffix(timeout: &bool) -> &'static str {
    if *timeout { " (timed out)" } else { "" }
}

impl From<PolylineError> for NavigationError {
    fn from(err: PolylineError) -> Self {
        Self::MalformedPolyline(err.to_string())
    }
}

impl From<DomainError> for NavigationError {
    fn from(err: DomainError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// Fieldless discriminant of [`NavigationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport failure or timeout
    Network,
    /// Provider-side failure
    Provider,
    /// Provider quota exhausted
    RateLimited,
    /// Place reference unknown
    PlaceNotFound,
    /// No route between the endpoints
    NoRouteFound,
    /// Undecodable route geometry
    MalformedPolyline,
    /// Caller misuse
    InvalidRequest,
}

impl ErrorKind {
    /// Stable snake_case name, used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Provider => "provider",
            Self::RateLimited => "rate_limited",
            Self::PlaceNotFound => "place_not_found",
            Self::NoRouteFound => "no_route_found",
            Self::MalformedPolyline => "malformed_polyline",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
