//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated API host, with an optional port.
///
/// The host is stored without a scheme; the scheme is chosen by the
/// `use_https` setting when the API URL is built.
///
/// # Accepted Formats
///
/// - `api.example.com`
/// - `localhost:8000`
/// - `0.0.0.0:8000`
///
/// Surrounding whitespace and trailing slashes are trimmed.
///
/// # Example
///
/// ```rust
/// use drf_client::ApiHost;
///
/// let host = ApiHost::new("localhost:8000/").unwrap();
/// assert_eq!(host.as_ref(), "localhost:8000");
///
/// assert!(ApiHost::new("https://example.com").is_err());
/// assert!(ApiHost::new("bad host").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiHost(String);

impl ApiHost {
    /// Host used when none is configured.
    pub const DEFAULT: &'static str = "0.0.0.0:8000";

    /// Creates a new validated host.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHost`] if the host is empty, contains a
    /// scheme, or contains whitespace.
    pub fn new(host: impl Into<String>) -> Result<Self, ConfigError> {
        let host = host.into();
        let trimmed = host.trim().trim_end_matches('/');

        if trimmed.is_empty() || trimmed.contains("://") || trimmed.contains(char::is_whitespace)
        {
            return Err(ConfigError::InvalidHost { host });
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl Default for ApiHost {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl AsRef<str> for ApiHost {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ApiHost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ApiHost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(de::Error::custom)
    }
}
