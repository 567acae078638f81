//! REST client implementation.
//!
//! This module provides the [`RestClient`] type: the handle every resource
//! loads through. It owns the configuration, the transport, the response
//! parsing strategy, the clock used for staleness, and the per-type field
//! set registry.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::clients::{HttpError, HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::config::ClientConfig;
use crate::rest::{
    Clock, Collection, FieldRegistry, FieldSet, KindInfo, ResourceKind, ResponseParser,
    ResultsParser, SystemClock,
};

struct ClientInner {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    parser: Box<dyn ResponseParser>,
    clock: Rc<dyn Clock>,
    registry: FieldRegistry,
    generation: Cell<u64>,
}

/// REST API client.
///
/// Cloning is cheap: clones share the transport, parser, clock and field
/// set registry.
///
/// # Thread Safety
///
/// `RestClient` is neither `Send` nor `Sync`. One logical caller drives one
/// client and the resources loaded through it.
///
/// # Example
///
/// ```rust,no_run
/// use drf_client::{ApiHost, ClientConfig, RestClient};
///
/// let config = ClientConfig::builder()
///     .host(ApiHost::new("api.example.com").unwrap())
///     .use_https(true)
///     .build()
///     .unwrap();
///
/// let client = RestClient::new(config).unwrap();
/// assert_eq!(client.api_url(), "https://api.example.com");
/// ```
#[derive(Clone)]
pub struct RestClient {
    inner: Rc<ClientInner>,
}

impl RestClient {
    /// Creates a client using the HTTP transport, the default results
    /// parser and the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the HTTP transport cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        Self::builder(config).build()
    }

    /// Creates a builder for a client with injected collaborators.
    #[must_use]
    pub fn builder(config: ClientConfig) -> RestClientBuilder {
        RestClientBuilder::new(config)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn api_url(&self) -> String {
        self.inner.config.api_url()
    }

    /// Returns the current time according to the client's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    /// Returns the response parsing strategy.
    #[must_use]
    pub fn parser(&self) -> &dyn ResponseParser {
        self.inner.parser.as_ref()
    }

    /// Returns the collection of kind `K`.
    #[must_use]
    pub fn collection<K: ResourceKind>(&self) -> Collection<K> {
        Collection::new(self)
    }

    /// Returns the field set of `kind`, building it on first use.
    #[must_use]
    pub fn field_set(&self, kind: &KindInfo) -> Rc<FieldSet> {
        self.inner.registry.field_set(kind)
    }

    pub(crate) fn next_generation(&self) -> u64 {
        let next = self.inner.generation.get() + 1;
        self.inner.generation.set(next);
        next
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if no response could be obtained.
    pub fn get(
        &self,
        url: &str,
        params: BTreeMap<String, String>,
    ) -> Result<HttpResponse, HttpError> {
        self.send(HttpRequest::get(url).params(params))
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if no response could be obtained.
    pub fn post(&self, url: &str, body: Value) -> Result<HttpResponse, HttpError> {
        self.send(HttpRequest::post(url, body))
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if no response could be obtained.
    pub fn put(&self, url: &str, body: Value) -> Result<HttpResponse, HttpError> {
        self.send(HttpRequest::put(url, body))
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if no response could be obtained.
    pub fn delete(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.send(HttpRequest::delete(url))
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = request.method;
        tracing::debug!(%method, url = %request.url, params = ?request.params, "Issuing request");

        let response = self.inner.transport.issue(&request)?;
        tracing::debug!(%method, url = %request.url, code = response.code, "Received response");

        Ok(response)
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RestClient`].
///
/// Unset collaborators default to [`HttpTransport`], [`ResultsParser`] and
/// [`SystemClock`].
pub struct RestClientBuilder {
    config: ClientConfig,
    transport: Option<Box<dyn Transport>>,
    parser: Option<Box<dyn ResponseParser>>,
    clock: Option<Rc<dyn Clock>>,
}

impl RestClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            parser: None,
            clock: None,
        }
    }

    /// Uses `transport` to issue requests.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Uses `parser` to extract records from responses.
    #[must_use]
    pub fn parser(mut self, parser: impl ResponseParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Uses `clock` for staleness checks.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Rc::new(clock));
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if no transport was given and the HTTP
    /// transport cannot be created.
    pub fn build(self) -> Result<RestClient, HttpError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(&self.config)?),
        };

        Ok(RestClient {
            inner: Rc::new(ClientInner {
                config: self.config,
                transport,
                parser: self.parser.unwrap_or_else(|| Box::new(ResultsParser)),
                clock: self.clock.unwrap_or_else(|| Rc::new(SystemClock)),
                registry: FieldRegistry::default(),
                generation: Cell::new(0),
            }),
        })
    }
}

impl fmt::Debug for RestClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClientBuilder")
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .field("custom_parser", &self.parser.is_some())
            .field("custom_clock", &self.clock.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use crate::rest::ManualClock;
    use std::cell::RefCell;

    #[derive(Clone, Default)]
    struct Recorder {
        requests: Rc<RefCell<Vec<HttpRequest>>>,
    }

    impl Transport for Recorder {
        fn issue(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
            self.requests.borrow_mut().push(request.clone());
            Ok(HttpResponse::json(200, serde_json::json!({})))
        }
    }

    #[test]
    fn test_requests_go_through_transport() {
        let recorder = Recorder::default();
        let client = RestClient::builder(ClientConfig::default())
            .transport(recorder.clone())
            .build()
            .unwrap();

        client
            .get("http://0.0.0.0:8000/items", BTreeMap::new())
            .unwrap();
        client
            .post("http://0.0.0.0:8000/items", serde_json::json!({"name": "x"}))
            .unwrap();
        client
            .put("http://0.0.0.0:8000/items/1", serde_json::json!({"name": "y"}))
            .unwrap();
        client.delete("http://0.0.0.0:8000/items/1").unwrap();

        let requests = recorder.requests.borrow();
        let methods: Vec<HttpMethod> = requests.iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![
                HttpMethod::Get,
                HttpMethod::Post,
                HttpMethod::Put,
                HttpMethod::Delete
            ]
        );
        assert_eq!(requests[1].body, Some(serde_json::json!({"name": "x"})));
    }

    #[test]
    fn test_generation_is_monotonic() {
        let client = RestClient::builder(ClientConfig::default())
            .transport(Recorder::default())
            .build()
            .unwrap();
        let clone = client.clone();

        let first = client.next_generation();
        let second = clone.next_generation();
        assert!(second > first);
    }

    #[test]
    fn test_clock_is_injected() {
        let clock = ManualClock::new();
        let client = RestClient::builder(ClientConfig::default())
            .transport(Recorder::default())
            .clock(clock.clone())
            .build()
            .unwrap();

        clock.advance(chrono::Duration::hours(1));
        assert_eq!(client.now(), clock.now());
    }

    #[test]
    fn test_default_client_uses_http_transport() {
        let client = RestClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.api_url(), "http://0.0.0.0:8000");
    }
}
