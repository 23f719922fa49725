//! Mapping provider error types

use thiserror::Error;

/// Errors that can occur while talking to the mapping provider
#[derive(Debug, Error)]
pub enum MapsError {
    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Rate limit exceeded (HTTP 429 or `OVER_QUERY_LIMIT`)
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by API)
        retry_after_secs: Option<u64>,
    },

    /// Non-2xx HTTP status
    #[error("Request failed: HTTP {status}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
    },

    /// Response body could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The provider answered with an error `status` in the body
    #[error("Provider returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    ProviderStatus {
        /// Provider status string, e.g. `REQUEST_DENIED`
        status: String,
        /// Provider `error_message`, if any
        message: Option<String>,
    },

    /// Place details carried no geometry
    #[error("Place not found: {0}")]
    PlaceNotFound(String),

    /// Directions returned zero routes
    #[error("No routes found from {from} to {to}")]
    NoRoutesFound {
        /// Origin as `lat,lng`
        from: String,
        /// Destination as `lat,lng`
        to: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl MapsError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Timeout { .. } | Self::RateLimitExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(MapsError::ConnectionFailed("reset".to_string()).is_retryable());
        assert!(MapsError::Timeout { timeout_secs: 10 }.is_retryable());
        assert!(
            MapsError::RateLimitExceeded {
                retry_after_secs: None
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!MapsError::HttpStatus { status: 500 }.is_retryable());
        assert!(!MapsError::ParseError("eof".to_string()).is_retryable());
        assert!(!MapsError::PlaceNotFound("abc".to_string()).is_retryable());
        assert!(
            !MapsError::NoRoutesFound {
                from: "a".to_string(),
                to: "b".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = MapsError::ProviderStatus {
            status: "REQUEST_DENIED".to_string(),
            message: Some("The provided API key is invalid.".to_string()),
        };
        assert!(err.to_string().contains("REQUEST_DENIED"));
        assert!(err.to_string().contains("API key is invalid"));

        let err = MapsError::ProviderStatus {
            status: "UNKNOWN_ERROR".to_string(),
            message: None,
        };
        assert!(err.to_string().contains("no details"));

        let err = MapsError::Timeout { timeout_secs: 10 };
        assert!(err.to_string().contains("10"));
    }
}
