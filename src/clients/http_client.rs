//! Blocking HTTP transport.
//!
//! This module provides the [`Transport`] seam through which every request
//! flows, and [`HttpTransport`], its production implementation on
//! `reqwest::blocking`.

use std::collections::HashMap;

use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ClientConfig;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Performs one HTTP call and returns the response.
///
/// Implementations block until a response or transport failure is available.
/// Non-2xx answers are responses, not errors; the caller decides what a
/// non-ok status means.
pub trait Transport {
    /// Issues the request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request is invalid, or if no response
    /// could be obtained or its body could not be read.
    fn issue(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// HTTP transport backed by a blocking reqwest client.
///
/// The transport handles:
/// - Default headers including User-Agent, Accept and Authorization
/// - TLS certificate verification according to `ssl_verify`
/// - JSON request bodies
///
/// # Example
///
/// ```rust,no_run
/// use drf_client::clients::{HttpRequest, HttpTransport, Transport};
/// use drf_client::ClientConfig;
///
/// let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
/// let request = HttpRequest::get("http://0.0.0.0:8000/items").param("limit", "25");
///
/// let response = transport.issue(&request).unwrap();
/// println!("{}", response.code);
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    default_headers: HashMap<String, String>,
}

impl HttpTransport {
    /// Creates a new transport for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g., TLS initialization failure).
    pub fn new(config: &ClientConfig) -> Result<Self, HttpError> {
        let mut default_headers = HashMap::from([
            ("User-Agent".to_string(), user_agent(config.user_agent_prefix())),
            ("Accept".to_string(), "application/json".to_string()),
        ]);
        default_headers.extend(config.authentication().header());

        let client = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .danger_accept_invalid_certs(!config.ssl_verify())
            .build()?;

        Ok(Self {
            client,
            default_headers,
        })
    }

    /// Returns the default headers for this transport.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }
}

/// `[prefix | ]drf-client v{version} | Rust {rust-version}`
fn user_agent(prefix: Option<&str>) -> String {
    let crate_part = format!(
        "drf-client v{SDK_VERSION} | Rust {}",
        env!("CARGO_PKG_RUST_VERSION")
    );
    match prefix {
        Some(prefix) => format!("{prefix} | {crate_part}"),
        None => crate_part,
    }
}

/// Header names are lower-cased; repeated headers keep every value.
fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
    headers.iter().fold(HashMap::new(), |mut acc, (name, value)| {
        acc.entry(name.as_str().to_lowercase())
            .or_insert_with(Vec::new)
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        acc
    })
}

fn wire_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for HttpTransport {
    fn issue(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let mut outgoing = self
            .default_headers
            .iter()
            .fold(
                self.client.request(wire_method(request.method), &request.url),
                |builder, (name, value)| builder.header(name, value),
            );
        if !request.params.is_empty() {
            outgoing = outgoing.query(&request.params);
        }
        // Sets Content-Type: application/json as well.
        if let Some(body) = &request.body {
            outgoing = outgoing.json(body);
        }

        let response = outgoing.send()?;
        let code = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let text = response.text()?;

        Ok(HttpResponse::new(code, headers, text))
    }
}
