//! Authentication header construction.
//!
//! The API accepts either a token (`Authorization: Token <token>`), a bearer
//! token, or HTTP basic credentials. [`Authentication`] captures which one is
//! configured and renders the corresponding header; the transport attaches it
//! to every request.
//!
//! # Example
//!
//! ```rust
//! use drf_client::Authentication;
//!
//! let auth = Authentication::token("abcdef").unwrap();
//! assert_eq!(
//!     auth.header(),
//!     Some(("Authorization".to_string(), "Token abcdef".to_string()))
//! );
//! ```

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::ConfigError;

/// Name of the header carrying credentials.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Credentials attached to every request.
///
/// The `Debug` implementation masks secrets.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Authentication {
    /// No credentials; no header is sent.
    #[default]
    None,
    /// `Authorization: Token <token>`.
    Token(String),
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// `Authorization: Basic <base64(username:password)>`.
    Basic {
        /// The account name.
        username: String,
        /// The account password.
        password: String,
    },
}

impl Authentication {
    /// Creates token authentication.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCredentials`] if the token is empty.
    pub fn token(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::InvalidCredentials {
                reason: "Incorrect format for API token.",
            });
        }
        Ok(Self::Token(token))
    }

    /// Creates bearer token authentication.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCredentials`] if the token is empty.
    pub fn bearer(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::InvalidCredentials {
                reason: "Incorrect format for API token.",
            });
        }
        Ok(Self::Bearer(token))
    }

    /// Creates basic authentication from a username and password.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCredentials`] if either value is empty.
    pub fn basic(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(ConfigError::InvalidCredentials {
                reason: "No user provided.",
            });
        }
        if password.is_empty() {
            return Err(ConfigError::InvalidCredentials {
                reason: "No password provided.",
            });
        }
        Ok(Self::Basic { username, password })
    }

    /// Returns the header name and value for these credentials.
    #[must_use]
    pub fn header(&self) -> Option<(String, String)> {
        let value = match self {
            Self::None => return None,
            Self::Token(token) => format!("Token {token}"),
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Basic { username, password } => {
                let credentials = format!("{username}:{password}");
                format!("Basic {}", STANDARD.encode(credentials.trim()))
            }
        };
        Some((AUTHORIZATION_HEADER.to_string(), value))
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("Authentication::None"),
            Self::Token(_) => f.write_str("Authentication::Token(*****)"),
            Self::Bearer(_) => f.write_str("Authentication::Bearer(*****)"),
            Self::Basic { username, .. } => {
                write!(f, "Authentication::Basic({username}:*****)")
            }
        }
    }
}
