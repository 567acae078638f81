//! # drf-client
//!
//! Lazy-loading client-side resource models for paginated JSON REST APIs.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`],
//!   loadable from YAML
//! - Token, bearer and basic authentication via [`Authentication`]
//! - A blocking HTTP transport behind the [`clients::Transport`] seam
//! - Declarative resource types via [`rest::ResourceKind`], whose fields load
//!   on first access and reload once stale
//! - Embedded and list relations that re-derive their data from their parent
//!   instead of fetching on their own
//! - Paginated listing and validated creation via [`rest::Collection`]
//!
//! ## Quick Start
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
//!
//! ## Configuration From YAML
//!
//! ```rust
//! use drf_client::ClientConfig;
//!
//! let config = ClientConfig::from_yaml_str(
//!     "HOST: api.example.com\nUSE_HTTPS: true\nTOKEN: abcdef\n",
//! )
//! .unwrap();
//!
//! assert_eq!(config.api_url(), "https://api.example.com");
//! ```
//!
//! ## Defining And Loading Resources
//!
//! ```rust,ignore
//! use drf_client::rest::{Field, FieldSetBuilder, GetParams, Resource, ResourceKind};
//! use drf_client::{ClientConfig, RestClient};
//!
//! struct Item;
//!
//! impl ResourceKind for Item {
//!     const NAME: &'static str = "Item";
//!     const ROUTE: &'static str = "items";
//!
//!     fn declare_fields(fields: &mut FieldSetBuilder) {
//!         fields
//!             .insert("name", Field::plain().required())
//!             .insert("created", Field::datetime());
//!     }
//! }
//!
//! let client = RestClient::new(ClientConfig::default())?;
//!
//! // Nothing is fetched until a field is read.
//! let item = Resource::<Item>::new(&client, 1);
//! println!("{}", item.value("name")?);
//!
//! // One page of the collection.
//! let page = Resource::<Item>::get(&client, GetParams::new().limit(25))?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Configuration newtypes validate on construction
//! - **Synchronous**: Every network operation blocks its caller
//! - **Single-threaded resources**: Resource graphs are `!Send`; one logical
//!   caller drives a client and the resources loaded through it

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use auth::Authentication;
pub use config::{ApiHost, ClientConfig, ClientConfigBuilder};
pub use error::ConfigError;

// Re-export client types
pub use clients::{
    ApiError, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, RestClient,
    RestClientBuilder, Transport,
};

// Re-export the resource engine's entry points
pub use rest::{AnyResource, Collection, Field, GetParams, Resource, ResourceError, ResourceKind};
