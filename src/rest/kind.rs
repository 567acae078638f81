//! Resource type declarations.
//!
//! Every concrete resource type is a zero-sized marker implementing
//! [`ResourceKind`]. The trait carries the type's name, route, expiration
//! window and declared fields; [`KindInfo`] is its runtime form, used where
//! the concrete type is not known statically (nested resources, parsers).
//!
//! # Example
//!
//! ```rust
//! use drf_client::rest::{Field, FieldSetBuilder, ResourceKind};
//!
//! struct Person;
//!
//! impl ResourceKind for Person {
//!     const NAME: &'static str = "Person";
//!     const ROUTE: &'static str = "people";
//!
//!     fn declare_fields(fields: &mut FieldSetBuilder) {
//!         fields
//!             .insert("name", Field::plain().required())
//!             .insert("joined", Field::datetime().source("date_joined"));
//!     }
//! }
//!
//! // A derived type starts from its base's fields.
//! struct Employee;
//!
//! impl ResourceKind for Employee {
//!     const NAME: &'static str = "Employee";
//!     const ROUTE: &'static str = "employees";
//!
//!     fn declare_fields(fields: &mut FieldSetBuilder) {
//!         Person::declare_fields(fields);
//!         fields.insert("manager", Field::embedded::<Person>());
//!     }
//! }
//! ```

use std::any::TypeId;
use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::rest::errors::ResourceError;
use crate::rest::fieldset::FieldSetBuilder;

/// A JSON record: the raw data of one resource.
pub type Record = serde_json::Map<String, Value>;

/// How long loaded data stays fresh unless a type says otherwise.
pub const DEFAULT_DATA_EXPIRATION: Duration = Duration::from_secs(120);

/// Static description of a resource type.
pub trait ResourceKind: 'static {
    /// The type name, used in messages and `Display` output.
    const NAME: &'static str;

    /// Path of the type's collection below the API URL.
    const ROUTE: &'static str = "";

    /// How long loaded data is used before it is refreshed.
    const DATA_EXPIRATION: Duration = DEFAULT_DATA_EXPIRATION;

    /// Key under `results` holding records of this type, for parsers that
    /// nest records by collection.
    #[must_use]
    fn collection_name() -> &'static str {
        Self::ROUTE
    }

    /// Declares the type's fields, in order.
    fn declare_fields(fields: &mut FieldSetBuilder);

    /// Checks one field of the data passed to `create`.
    ///
    /// Called for every declared field, after required fields were checked.
    ///
    /// # Errors
    ///
    /// Return [`ResourceError::Validation`] to reject the data.
    #[allow(unused_variables)]
    fn validate_field(name: &str, value: Option<&Value>) -> Result<(), ResourceError> {
        Ok(())
    }

    /// Checks the whole record passed to `create`.
    ///
    /// # Errors
    ///
    /// Return [`ResourceError::Validation`] to reject the data.
    #[allow(unused_variables)]
    fn validate(data: &Record) -> Result<(), ResourceError> {
        Ok(())
    }
}

type FieldValidator = fn(&str, Option<&Value>) -> Result<(), ResourceError>;
type RecordValidator = fn(&Record) -> Result<(), ResourceError>;

/// Runtime description of a [`ResourceKind`].
#[derive(Clone, Copy)]
pub struct KindInfo {
    type_id: TypeId,
    name: &'static str,
    route: &'static str,
    data_expiration: Duration,
    collection_name: fn() -> &'static str,
    declare: fn(&mut FieldSetBuilder),
    validate_field: FieldValidator,
    validate: RecordValidator,
}

impl KindInfo {
    /// Captures the description of `K`.
    #[must_use]
    pub fn of<K: ResourceKind>() -> Self {
        Self {
            type_id: TypeId::of::<K>(),
            name: K::NAME,
            route: K::ROUTE,
            data_expiration: K::DATA_EXPIRATION,
            collection_name: K::collection_name,
            declare: K::declare_fields,
            validate_field: K::validate_field,
            validate: K::validate,
        }
    }

    /// Returns the `TypeId` of the marker type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the collection route.
    #[must_use]
    pub const fn route(&self) -> &'static str {
        self.route
    }

    /// Returns the freshness window.
    #[must_use]
    pub const fn data_expiration(&self) -> Duration {
        self.data_expiration
    }

    /// Returns the collection name used by nested-results parsers.
    #[must_use]
    pub fn collection_name(&self) -> &'static str {
        (self.collection_name)()
    }

    /// Returns `true` if this describes `K`.
    #[must_use]
    pub fn is<K: ResourceKind>(&self) -> bool {
        self.type_id == TypeId::of::<K>()
    }

    pub(crate) fn declare_fields(&self, builder: &mut FieldSetBuilder) {
        (self.declare)(builder);
    }

    pub(crate) fn validate_field(&self, name: &str, value: Option<&Value>) -> Result<(), ResourceError> {
        (self.validate_field)(name, value)
    }

    pub(crate) fn validate(&self, data: &Record) -> Result<(), ResourceError> {
        (self.validate)(data)
    }
}

impl PartialEq for KindInfo {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for KindInfo {}

impl fmt::Debug for KindInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindInfo")
            .field("name", &self.name)
            .field("route", &self.route)
            .field("data_expiration", &self.data_expiration)
            .finish_non_exhaustive()
    }
}
