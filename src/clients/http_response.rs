//! HTTP response types.
//!
//! This module provides the [`HttpResponse`] type returned by a
//! [`Transport`](crate::clients::Transport).

use std::collections::HashMap;

/// An HTTP response from the API.
///
/// Header names are stored lower-cased; a header may carry several values.
/// The body is kept both as received text and parsed as JSON (`Null` when
/// the text is empty or not JSON).
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// The raw response text.
    pub text: String,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing `text` as JSON.
    ///
    /// # Example
    ///
    /// ```rust
    /// use drf_client::clients::HttpResponse;
    /// use std::collections::HashMap;
    /// use serde_json::json;
    ///
    /// let response = HttpResponse::new(200, HashMap::new(), r#"{"results": []}"#.to_string());
    /// assert_eq!(response.body, json!({"results": []}));
    ///
    /// let html = HttpResponse::new(502, HashMap::new(), "<html>Bad Gateway</html>".to_string());
    /// assert!(html.body.is_null());
    /// ```
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, text: String) -> Self {
        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::Null)
        };

        let headers = headers
            .into_iter()
            .map(|(name, values)| (name.to_lowercase(), values))
            .collect();

        Self {
            code,
            headers,
            body,
            text,
        }
    }

    /// Creates a response carrying a JSON body and no headers.
    #[must_use]
    pub fn json(code: u16, body: serde_json::Value) -> Self {
        Self {
            code,
            headers: HashMap::new(),
            text: body.to_string(),
            body,
        }
    }

    /// Adds a header value, returning the updated response.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header (case-insensitive), if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `Location` header value, if present.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}
