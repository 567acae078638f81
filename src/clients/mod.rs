//! HTTP client types for API communication.
//!
//! This module provides the request/response layer the resource engine is
//! built on.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Transport`]: The seam through which every request is issued
//! - [`HttpTransport`]: The blocking reqwest implementation of [`Transport`]
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`RestClient`]: The higher-level client resources load through
//! - [`ApiError`]: A non-ok or malformed response, carrying the response
//!
//! # Example
//!
//! ```rust,no_run
//! use drf_client::clients::{HttpRequest, HttpTransport, Transport};
//! use drf_client::ClientConfig;
//!
//! let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
//!
//! let request = HttpRequest::get("http://0.0.0.0:8000/items/1");
//!
//! let response = transport.issue(&request).unwrap();
//! assert!(response.is_ok());
//! ```
//!
//! # Non-ok Responses
//!
//! Transports never turn a status code into an error. Callers decide what a
//! non-ok response means and report it as an [`ApiError`].

mod errors;
mod http_client;
mod http_request;
mod http_response;
pub mod rest;

pub use errors::{ApiError, HttpError, InvalidHttpRequestError};
pub use http_client::{HttpTransport, Transport, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest};
pub use http_response::HttpResponse;

pub use rest::{RestClient, RestClientBuilder};
