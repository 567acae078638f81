//! Error types for client configuration.
//!
//! This module contains the error type used when building a
//! [`ClientConfig`](crate::ClientConfig) or loading one from YAML.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use drf_client::{ApiHost, ConfigError};
//!
//! let result = ApiHost::new("");
//! assert!(matches!(result, Err(ConfigError::InvalidHost { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The API host is empty or malformed.
    #[error("Invalid API host '{host}'. Expected a bare host with optional port (e.g., 'api.example.com:8000').")]
    InvalidHost {
        /// The invalid host that was provided.
        host: String,
    },

    /// Credentials were rejected while configuring authentication.
    #[error("{reason}")]
    InvalidCredentials {
        /// Why the credentials were rejected.
        reason: &'static str,
    },

    /// The pagination limits are inconsistent.
    #[error("Invalid pagination limits: {reason}")]
    InvalidLimits {
        /// The reason the limits are invalid.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("Could not read configuration file '{path}': {reason}")]
    Unreadable {
        /// The path that was requested.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// The configuration document is not valid YAML for this client.
    #[error("Invalid configuration document: {reason}")]
    InvalidDocument {
        /// The parser's description of the problem.
        reason: String,
    },
}
