//! # Error handling for the EYD checker
//!
//! This module defines the error type shared by the checker client, the
//! editing session, configuration and export code. The correction store and
//! the text compositor are total functions and never produce these errors;
//! failures only happen at the service boundary, on disk, or when a caller
//! refers to a correction that does not exist.

use thiserror::Error;

/// Result type used throughout EYD Core.
///
/// # Example
///
/// ```rust
/// use eyd_core::{Error, Result};
///
/// fn example_function() -> Result<String> {
///     Ok("Success".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for EYD Core.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The checker service answered with a non-success status
    #[error("Checker service error: HTTP {status}: {message}")]
    Service { status: u16, message: String },

    /// The checker service answered with a body that does not match the schema
    #[error("Malformed checker response: {message}")]
    MalformedResponse { message: String },

    /// A response arrived for a request that has since been superseded
    #[error("Stale response for check #{ticket} (latest is #{latest})")]
    StaleResponse { ticket: u64, latest: u64 },

    /// Network-related errors (connection refused, timeout, ...)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Export errors
    #[error("Export error: {message}")]
    Export { message: String },

    /// File I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// Not found errors
    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

impl Error {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eyd_core::Error;
    ///
    /// let error = Error::config("Invalid configuration file format");
    /// assert!(error.is_config());
    /// ```
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new checker service error from an HTTP status and body.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eyd_core::Error;
    ///
    /// let error = Error::service(400, "Text is empty");
    /// assert_eq!(error.category(), "Service");
    /// ```
    pub fn service<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    /// Create a new malformed response error.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new stale response error.
    pub fn stale(ticket: u64, latest: u64) -> Self {
        Self::StaleResponse { ticket, latest }
    }

    /// Create a new network error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eyd_core::Error;
    ///
    /// let error = Error::network("Connection refused");
    /// assert!(error.is_transport());
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new export error.
    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eyd_core::Error;
    ///
    /// let error = Error::validation("text", "Text is empty");
    /// assert!(error.is_validation());
    /// ```
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new not found error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eyd_core::Error;
    ///
    /// let error = Error::not_found("Correction #7");
    /// assert_eq!(error.category(), "NotFound");
    /// ```
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if this error is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Check if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Check if this error came from the checker service boundary.
    ///
    /// Malformed responses count as transport failures: in both cases
    /// nothing is loaded into the history.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Service { .. } | Self::MalformedResponse { .. }
        )
    }

    /// Check if this error reports a superseded check request.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResponse { .. })
    }

    /// Get the error category as a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eyd_core::Error;
    ///
    /// let error = Error::config("Invalid format");
    /// assert_eq!(error.category(), "Config");
    /// ```
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "Config",
            Self::Service { .. } => "Service",
            Self::MalformedResponse { .. } => "MalformedResponse",
            Self::StaleResponse { .. } => "StaleResponse",
            Self::Network { .. } => "Network",
            Self::Export { .. } => "Export",
            Self::Io(_) => "IO",
            Self::Validation { .. } => "Validation",
            Self::NotFound { .. } => "NotFound",
        }
    }
}

/// Connection failures and timeouts become [`Error::Network`]; body decoding
/// failures become [`Error::MalformedResponse`].
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed(err.to_string())
        } else if let Some(status) = err.status() {
            Self::service(status.as_u16(), err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let error = Error::config("Test message");
        assert!(error.is_config());
        assert_eq!(error.category(), "Config");
        assert!(error.to_string().contains("Test message"));
    }

    #[test]
    fn test_service_error_display() {
        let error = Error::service(503, "Service Unavailable");
        assert!(error.is_transport());
        assert_eq!(error.to_string(), "Checker service error: HTTP 503: Service Unavailable");
    }

    #[test]
    fn test_malformed_counts_as_transport() {
        let error = Error::malformed("missing field `corrections`");
        assert!(error.is_transport());
        assert_eq!(error.category(), "MalformedResponse");
    }

    #[test]
    fn test_stale_error() {
        let error = Error::stale(1, 3);
        assert!(error.is_stale());
        assert!(!error.is_transport());
        assert!(error.to_string().contains("#1"));
        assert!(error.to_string().contains("#3"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::from(io_error);
        assert!(error.is_io());
        assert_eq!(error.category(), "IO");
    }

    #[test]
    fn test_validation_error() {
        let error = Error::validation("text", "Text is empty");
        assert!(error.is_validation());
        assert_eq!(error.category(), "Validation");
        assert_eq!(error.to_string(), "Validation error: text: Text is empty");
    }
}
