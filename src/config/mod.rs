//! Configuration types for the REST client.
//!
//! This module provides the configuration used to reach the API and to
//! shape requests made on behalf of resources.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: The configuration struct holding all client settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ApiHost`]: A validated API host newtype
//!
//! Configuration can also be loaded from a YAML document with
//! [`ClientConfig::from_yaml_str`] or [`ClientConfig::from_yaml_file`].
//!
//! # Example
//!
//! ```rust
//! use drf_client::{ApiHost, Authentication, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .host(ApiHost::new("api.example.com").unwrap())
//!     .use_https(true)
//!     .authentication(Authentication::token("abcdef").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_url(), "https://api.example.com");
//! ```

mod newtypes;

pub use newtypes::ApiHost;

use std::path::Path;

use serde::Deserialize;

use crate::auth::Authentication;
use crate::error::ConfigError;

/// Requests for more resources than this are clamped down to it.
pub const MAX_PAGINATION_LIMIT: i64 = 500;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: i64 = 25;

/// Configuration for the REST client.
///
/// # Example
///
/// ```rust
/// use drf_client::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.api_url(), "http://0.0.0.0:8000");
/// assert!(config.ssl_verify());
/// assert_eq!(config.max_pagination_limit(), 500);
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    host: ApiHost,
    use_https: bool,
    ssl_verify: bool,
    max_pagination_limit: i64,
    default_limit: i64,
    authentication: Authentication,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Loads configuration from a YAML document.
    ///
    /// Recognized keys are `host`, `use_https`, `ssl_verify`,
    /// `max_pagination_limit`, `default_limit`, `token`, `username` and
    /// `password`. Upper-case spellings (`HOST`, `USE_HTTPS`, ...) are
    /// accepted as well. A token takes precedence over a username/password
    /// pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDocument`] if the YAML cannot be parsed,
    /// or any validation error raised while building the configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use drf_client::ClientConfig;
    ///
    /// let config = ClientConfig::from_yaml_str("HOST: localhost:8000\nUSE_HTTPS: false\n").unwrap();
    /// assert_eq!(config.api_url(), "http://localhost:8000");
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let document: ConfigDocument =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::InvalidDocument {
                reason: e.to_string(),
            })?;
        document.into_config()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unreadable`] if the file cannot be read, and
    /// otherwise the same errors as [`ClientConfig::from_yaml_str`].
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Returns the API host.
    #[must_use]
    pub const fn host(&self) -> &ApiHost {
        &self.host
    }

    /// Returns whether requests use HTTPS.
    #[must_use]
    pub const fn use_https(&self) -> bool {
        self.use_https
    }

    /// Returns the API base URL, e.g. `https://api.example.com`.
    #[must_use]
    pub fn api_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{scheme}://{}", self.host)
    }

    /// Returns whether TLS certificates are verified.
    #[must_use]
    pub const fn ssl_verify(&self) -> bool {
        self.ssl_verify
    }

    /// Returns the upper bound applied to the `limit` pagination parameter.
    #[must_use]
    pub const fn max_pagination_limit(&self) -> i64 {
        self.max_pagination_limit
    }

    /// Returns the page size used when none is requested.
    #[must_use]
    pub const fn default_limit(&self) -> i64 {
        self.default_limit
    }

    /// Returns the configured credentials.
    #[must_use]
    pub const fn authentication(&self) -> &Authentication {
        &self.authentication
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: ApiHost::default(),
            use_https: false,
            ssl_verify: true,
            max_pagination_limit: MAX_PAGINATION_LIMIT,
            default_limit: DEFAULT_PAGE_LIMIT,
            authentication: Authentication::None,
            user_agent_prefix: None,
        }
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// # Defaults
///
/// - `host`: `0.0.0.0:8000`
/// - `use_https`: `false`
/// - `ssl_verify`: `true`
/// - `max_pagination_limit`: 500
/// - `default_limit`: 25
/// - `authentication`: [`Authentication::None`]
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    host: Option<ApiHost>,
    use_https: Option<bool>,
    ssl_verify: Option<bool>,
    max_pagination_limit: Option<i64>,
    default_limit: Option<i64>,
    authentication: Option<Authentication>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API host.
    #[must_use]
    pub fn host(mut self, host: ApiHost) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets whether requests use HTTPS.
    #[must_use]
    pub const fn use_https(mut self, use_https: bool) -> Self {
        self.use_https = Some(use_https);
        self
    }

    /// Sets whether TLS certificates are verified.
    #[must_use]
    pub const fn ssl_verify(mut self, verify: bool) -> Self {
        self.ssl_verify = Some(verify);
        self
    }

    /// Sets the upper bound applied to the `limit` pagination parameter.
    #[must_use]
    pub const fn max_pagination_limit(mut self, limit: i64) -> Self {
        self.max_pagination_limit = Some(limit);
        self
    }

    /// Sets the page size used when none is requested.
    #[must_use]
    pub const fn default_limit(mut self, limit: i64) -> Self {
        self.default_limit = Some(limit);
        self
    }

    /// Sets the credentials attached to every request.
    #[must_use]
    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLimits`] if the maximum pagination limit
    /// is negative or the default page size falls outside `[0, max]`.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let max_pagination_limit = self.max_pagination_limit.unwrap_or(MAX_PAGINATION_LIMIT);
        if max_pagination_limit < 0 {
            return Err(ConfigError::InvalidLimits {
                reason: format!("max_pagination_limit must not be negative (got {max_pagination_limit})"),
            });
        }

        let default_limit = self.default_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(0..=max_pagination_limit).contains(&default_limit) {
            return Err(ConfigError::InvalidLimits {
                reason: format!(
                    "default_limit {default_limit} must be between 0 and {max_pagination_limit}"
                ),
            });
        }

        Ok(ClientConfig {
            host: self.host.unwrap_or_default(),
            use_https: self.use_https.unwrap_or(false),
            ssl_verify: self.ssl_verify.unwrap_or(true),
            max_pagination_limit,
            default_limit,
            authentication: self.authentication.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

/// On-disk shape of a configuration document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigDocument {
    #[serde(alias = "HOST")]
    host: Option<ApiHost>,
    #[serde(alias = "USE_HTTPS")]
    use_https: Option<bool>,
    #[serde(alias = "SSL_VERIFY")]
    ssl_verify: Option<bool>,
    #[serde(alias = "MAX_PAGINATION_LIMIT")]
    max_pagination_limit: Option<i64>,
    #[serde(alias = "DEFAULT_LIMIT")]
    default_limit: Option<i64>,
    #[serde(alias = "TOKEN")]
    token: Option<String>,
    #[serde(alias = "USERNAME")]
    username: Option<String>,
    #[serde(alias = "PASSWORD")]
    password: Option<String>,
    #[serde(alias = "USER_AGENT_PREFIX")]
    user_agent_prefix: Option<String>,
}

impl ConfigDocument {
    fn into_config(self) -> Result<ClientConfig, ConfigError> {
        let mut builder = ClientConfig::builder();

        if let Some(host) = self.host {
            builder = builder.host(host);
        }
        if let Some(use_https) = self.use_https {
            builder = builder.use_https(use_https);
        }
        if let Some(ssl_verify) = self.ssl_verify {
            builder = builder.ssl_verify(ssl_verify);
        }
        if let Some(limit) = self.max_pagination_limit {
            builder = builder.max_pagination_limit(limit);
        }
        if let Some(limit) = self.default_limit {
            builder = builder.default_limit(limit);
        }
        if let Some(prefix) = self.user_agent_prefix {
            builder = builder.user_agent_prefix(prefix);
        }

        let authentication = match (self.token, self.username, self.password) {
            (Some(token), _, _) => Authentication::token(token)?,
            (None, Some(username), Some(password)) => Authentication::basic(username, password)?,
            (None, Some(_), None) => {
                return Err(ConfigError::InvalidCredentials {
                    reason: "No password provided.",
                })
            }
            (None, None, Some(_)) => {
                return Err(ConfigError::InvalidCredentials {
                    reason: "No user provided.",
                })
            }
            (None, None, None) => Authentication::None,
        };

        builder.authentication(authentication).build()
    }
}
