//! REST client for the resource layer.
//!
//! This module provides [`RestClient`], the handle every resource loads
//! through, and [`RestClientBuilder`] for injecting a custom transport,
//! response parser or clock.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//!
//! use drf_client::clients::RestClient;
//! use drf_client::rest::NamedResultsParser;
//! use drf_client::ClientConfig;
//!
//! let client = RestClient::builder(ClientConfig::default())
//!     .parser(NamedResultsParser)
//!     .build()
//!     .unwrap();
//!
//! let response = client.get("http://0.0.0.0:8000/items", BTreeMap::new()).unwrap();
//! println!("{}", response.body);
//! ```

mod client;

pub use client::{RestClient, RestClientBuilder};
