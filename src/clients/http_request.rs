//! Requests handed to a [`Transport`](crate::clients::Transport).
//!
//! A request is a method, an absolute URL, query parameters kept in key
//! order, and an optional JSON body. Constructors exist per method so that
//! methods carrying data always get a body.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::clients::errors::InvalidHttpRequestError;

/// The methods the resource layer issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Returns the method token as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Returns `true` for methods that must carry a body.
    #[must_use]
    pub const fn sends_data(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call against the API.
///
/// # Example
///
/// ```rust
/// use drf_client::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let list = HttpRequest::get("http://localhost:8000/items")
///     .param("limit", "25")
///     .param("offset", "0");
/// assert_eq!(list.param_value("limit"), Some("25"));
///
/// let create = HttpRequest::post("http://localhost:8000/items", json!({"name": "New Item"}));
/// assert_eq!(create.method, HttpMethod::Post);
/// assert!(create.verify().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL, without query string.
    pub url: String,
    pub params: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl HttpRequest {
    fn new(method: HttpMethod, url: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            url: url.into(),
            params: BTreeMap::new(),
            body,
        }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url, None)
    }

    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, url, Some(body))
    }

    #[must_use]
    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, url, Some(body))
    }

    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url, None)
    }

    /// Sets one query parameter, replacing any earlier value.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Sets several query parameters.
    #[must_use]
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Returns the value of a query parameter, if set.
    #[must_use]
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Checks the request can be sent.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::MissingUrl`] for an empty URL and
    /// [`InvalidHttpRequestError::MissingBody`] for a POST or PUT without a
    /// body.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.url.trim().is_empty() {
            return Err(InvalidHttpRequestError::MissingUrl);
        }
        if self.method.sends_data() && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.method.to_string(),
            });
        }
        Ok(())
    }
}
