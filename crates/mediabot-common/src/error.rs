//! Error taxonomy for the media lookup pipeline.
//!
//! Every failure a lookup can surface is one of five kinds. Callers branch on
//! the variant (or on [`Error::kind`]) to decide whether a job is dropped,
//! rescheduled, or reported to an operator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Unified error type for lookups.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An upstream catalog answered with a non-success status or a body that
    /// could not be decoded.
    #[error("{service} API error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Api {
        /// Name of the upstream service (e.g. "tmdb").
        service: String,
        /// HTTP status, when the failure came from a response.
        status: Option<u16>,
        /// Human-readable error description.
        message: String,
    },

    /// The per-service request budget is exhausted for the current window.
    #[error("Rate limit exceeded for {service}, retry in {}s", retry_after.as_secs())]
    RateLimit {
        /// Name of the service whose budget is exhausted.
        service: String,
        /// Time until the current window rolls over.
        retry_after: Duration,
    },

    /// Missing API key, unsupported media type, or other setup problem.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed input handed to the pipeline.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The cache or rate-window store failed.
    #[error("Cache error: {0}")]
    Cache(String),
}

/// Serializable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Api,
    RateLimit,
    Configuration,
    Validation,
    Cache,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Configuration => write!(f, "configuration"),
            Self::Validation => write!(f, "validation"),
            Self::Cache => write!(f, "cache"),
        }
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Api { .. } => ErrorKind::Api,
            Error::RateLimit { .. } => ErrorKind::RateLimit,
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Cache(_) => ErrorKind::Cache,
        }
    }

    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Api { .. } => 502,
            Error::RateLimit { .. } => 429,
            Error::Configuration(_) => 500,
            Error::Validation(_) => 422,
            Error::Cache(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::Api`] raised by an HTTP status.
    pub fn api_status(service: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            service: service.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Api`] without a status (transport
    /// failures, undecodable bodies).
    pub fn api(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Api {
            service: service.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::RateLimit`].
    pub fn rate_limit(service: impl Into<String>, retry_after: Duration) -> Self {
        Error::RateLimit {
            service: service.into(),
            retry_after,
        }
    }

    /// Convenience constructor for [`Error::Configuration`].
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Convenience constructor for [`Error::Cache`].
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        Self::Cache(msg.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_with_status() {
        let err = Error::api_status("tmdb", 500, "upstream failure");
        assert_eq!(err.to_string(), "tmdb API error (500): upstream failure");
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn api_error_display_without_status() {
        let err = Error::api("tvdb", "invalid JSON");
        assert_eq!(err.to_string(), "tvdb API error: invalid JSON");
    }

    #[test]
    fn rate_limit_display() {
        let err = Error::rate_limit("tmdb", Duration::from_secs(7));
        assert_eq!(err.to_string(), "Rate limit exceeded for tmdb, retry in 7s");
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.http_status(), 429);
    }

    #[test]
    fn validation_and_configuration() {
        assert_eq!(
            Error::validation("blank title").to_string(),
            "Validation error: blank title"
        );
        assert_eq!(Error::validation("x").http_status(), 422);
        assert_eq!(
            Error::configuration("no API key").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(Error::cache("disk full").kind(), ErrorKind::Cache);
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::RateLimit).unwrap();
        assert_eq!(json, "\"rate_limit\"");
        assert_eq!(ErrorKind::RateLimit.to_string(), "rate_limit");
    }
}
