//! HTTP-specific error types.
//!
//! This module contains error types for the transport layer and for
//! responses the API answered in a way the caller cannot use.
//!
//! # Error Handling
//!
//! - [`InvalidHttpRequestError`]: When a request fails validation before sending
//! - [`HttpError`]: Unified error type for everything that prevents a response
//! - [`ApiError`]: A response was received but was not ok, or did not have
//!   the expected shape; the response is kept for diagnostics
//!
//! # Example
//!
//! ```rust,ignore
//! use drf_client::clients::{HttpError, Transport};
//!
//! match transport.issue(&request) {
//!     Ok(response) if response.is_ok() => println!("Success: {}", response.body),
//!     Ok(response) => println!("API answered {}", response.code),
//!     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {e}"),
//!     Err(HttpError::Network(e)) => println!("Network error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::HttpResponse;

/// Error returned when an HTTP request fails validation.
///
/// This error is raised before a request is sent.
///
/// # Example
///
/// ```rust
/// use drf_client::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingBody {
///     method: "POST".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Cannot use POST without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The request URL is empty.
    #[error("Cannot issue a request without a URL.")]
    MissingUrl,
}

/// Unified error type for failures that prevent a response from being received.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Error returned when the API answered but the answer cannot be used.
///
/// Carries the original response so callers can inspect the status code and
/// body text.
///
/// # Example
///
/// ```rust
/// use drf_client::clients::{ApiError, HttpResponse};
/// use serde_json::json;
///
/// let error = ApiError::new(
///     "Could not delete Item(id=1)",
///     HttpResponse::json(404, json!({"detail": "Not found."})),
/// );
///
/// assert_eq!(
///     error.to_string(),
///     r#"Could not delete Item(id=1). Response: {"detail":"Not found."}"#
/// );
/// assert_eq!(error.response.code, 404);
/// ```
#[derive(Debug, Error, Clone)]
#[error("{}", describe(.message, .response))]
pub struct ApiError {
    /// What the client was trying to do.
    pub message: String,
    /// The response that caused the failure.
    pub response: HttpResponse,
}

impl ApiError {
    /// Creates a new API error for the given response.
    #[must_use]
    pub fn new(message: impl Into<String>, response: HttpResponse) -> Self {
        Self {
            message: message.into(),
            response,
        }
    }
}

fn describe(message: &str, response: &HttpResponse) -> String {
    if response.text.is_empty() {
        message.to_string()
    } else {
        format!("{message}. Response: {}", response.text)
    }
}
