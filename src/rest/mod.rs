//! Lazy-loading resource models.
//!
//! This module provides the resource engine:
//!
//! - **[`ResourceKind`] trait**: declares a resource type's name, route,
//!   data expiration and fields
//! - **[`Resource<K>`] / [`AnyResource`]**: handles on one API object that
//!   load on field access and reload once stale
//! - **[`Field`]**: plain, date-time, link, embedded and list projections of
//!   a resource's raw data
//! - **[`ListResource`]**: the relationship table that lets list entries
//!   re-derive their data from their parent
//! - **[`ResponseParser`]**: extraction of records from response bodies
//! - **[`Collection<K>`]**: paginated listing and creation
//! - **[`ResourceError`]**: errors for all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use drf_client::rest::{Field, FieldSetBuilder, GetParams, Resource, ResourceKind};
//!
//! struct Tag;
//!
//! impl ResourceKind for Tag {
//!     const NAME: &'static str = "Tag";
//!     const ROUTE: &'static str = "tags";
//!
//!     fn declare_fields(fields: &mut FieldSetBuilder) {
//!         fields.insert("label", Field::plain());
//!     }
//! }
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
//!             .insert("created", Field::datetime())
//!             .insert("owner_link", Field::link())
//!             .insert("tags", Field::many::<Tag>());
//!     }
//! }
//!
//! let items = Resource::<Item>::get(&client, GetParams::new().limit(10))?;
//! for item in &items {
//!     println!("{} created {:?}", item.value("name")?, item.datetime("created")?);
//!     for tag in item.many("tags")? {
//!         println!("  - {}", tag.value("label")?);
//!     }
//! }
//! ```

mod clock;
mod collection;
mod errors;
mod field;
mod fieldset;
mod id;
mod kind;
mod list;
mod parser;
mod resource;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::{clamp, collection_url, Collection, GetParams};
pub use errors::ResourceError;
pub use field::{is_truthy, link_key, parse_datetime, Field, FieldValue, LINKS_KEY, LINK_SUFFIX};
pub use fieldset::{FieldSet, FieldSetBuilder};
pub use id::ResourceId;
pub use kind::{KindInfo, Record, ResourceKind, DEFAULT_DATA_EXPIRATION};
pub use list::ListResource;
pub use parser::{extract_location, NamedResultsParser, ResponseParser, ResultsParser, RESULTS_KEY};
pub use resource::{AnyResource, Resource};

pub(crate) use fieldset::FieldRegistry;
