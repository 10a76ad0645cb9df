//! Marketplace REST API client.
//!
//! # Architecture
//!
//! - One shared `reqwest` client with a per-request timeout and JSON headers
//! - Optional bearer token, swappable at runtime
//! - `429 Too Many Requests` is retried with exponential backoff; nothing else is
//! - Successful GET responses can be cached in `moka` (TTL from config)
//!
//! Paths are built by [`endpoints`], which URL-encodes every path segment.

mod client;
pub mod endpoints;

pub use client::ApiClient;

use thiserror::Error;

/// Errors raised by the HTTP client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// No response within the configured timeout.
    #[error("Request timeout")]
    Timeout,

    /// Non-success status code.
    #[error("HTTP Error: {status} {reason}")]
    Status { status: u16, reason: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Still rate limited after every retry.
    #[error("HTTP Error: 429 Too Many Requests")]
    RateLimited,

    /// Base URL and path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RateLimited => Some(429),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: 404,
            reason: "Not Found".to_owned(),
        };
        assert_eq!(err.to_string(), "HTTP Error: 404 Not Found");
        assert!(err.is_not_found());
        assert_eq!(ApiError::RateLimited.status(), Some(429));
        assert!(ApiError::Timeout.status().is_none());
    }
}
