//! Lazily loaded resources.
//!
//! A resource is a client-side proxy for one API object. It caches the
//! object's raw JSON record and refreshes it when a field is read and the
//! cache is absent or stale. Resources derived from another resource's data
//! (embedded objects and list entries) never issue requests of their own:
//! they re-derive their record from their parent's current data.
//!
//! # States
//!
//! - **Unloaded**: no record; the next field read loads it.
//! - **Loaded**: a non-empty record younger than the type's
//!   [`DATA_EXPIRATION`](crate::rest::ResourceKind::DATA_EXPIRATION).
//! - **Stale**: the record is older than the expiration window, or the
//!   parent it was derived from has been reloaded since. The next field read
//!   reloads it exactly once.
//!
//! # Handles
//!
//! [`Resource<K>`] is the typed handle for a resource of kind `K`;
//! [`AnyResource`] is the untyped handle used for nested resources. Cloning
//! either clones the handle, not the state: all clones observe the same
//! record, and [`AnyResource::ptr_eq`] tells them apart from a separate
//! instance with equal id.
//!
//! # Example
//!
//! ```rust,ignore
//! use drf_client::rest::{Field, FieldSetBuilder, Resource, ResourceKind};
//!
//! struct Item;
//!
//! impl ResourceKind for Item {
//!     const NAME: &'static str = "Item";
//!     const ROUTE: &'static str = "items";
//!
//!     fn declare_fields(fields: &mut FieldSetBuilder) {
//!         fields.insert("name", Field::plain());
//!     }
//! }
//!
//! let item = Resource::<Item>::new(&client, 1);
//! let name = item.value("name")?;            // GET {api_url}/items/1
//! let again = item.value("name")?;           // served from cache
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::clients::{ApiError, RestClient};
use crate::rest::collection::{collection_url, Collection, GetParams};
use crate::rest::errors::ResourceError;
use crate::rest::field::{expect_record, is_truthy, FieldValue};
use crate::rest::fieldset::FieldSet;
use crate::rest::id::ResourceId;
use crate::rest::kind::{KindInfo, Record, ResourceKind};
use crate::rest::list::ListResource;

/// Where a derived resource takes its data from.
enum ParentRef {
    /// An embedded object of another resource.
    Resource(Weak<ResourceCell>),
    /// An entry of a list field.
    List(Rc<ListResource>),
}

/// Shared state of one resource instance.
pub(crate) struct ResourceCell {
    kind: KindInfo,
    client: RestClient,
    id: RefCell<Option<ResourceId>>,
    data: RefCell<Option<Record>>,
    last_loaded: Cell<Option<DateTime<Utc>>>,
    /// Bumped on every assignment of `data`.
    generation: Cell<u64>,
    /// The parent's generation `data` was derived from.
    parent_generation: Cell<u64>,
    parent: Option<ParentRef>,
    field_name: Option<String>,
    source: Option<String>,
}

impl ResourceCell {
    fn new(
        client: RestClient,
        kind: KindInfo,
        parent: Option<ParentRef>,
        field_name: Option<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            kind,
            client,
            id: RefCell::new(None),
            data: RefCell::new(None),
            last_loaded: Cell::new(None),
            generation: Cell::new(0),
            parent_generation: Cell::new(0),
            parent,
            field_name,
            source,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.get()
    }

    fn set_raw_data(&self, data: Option<Record>) {
        let loaded = data.as_ref().is_some_and(|record| !record.is_empty());

        if let Some(id) = data
            .as_ref()
            .and_then(|record| record.get("id"))
            .and_then(ResourceId::from_value)
        {
            *self.id.borrow_mut() = Some(id);
        }

        *self.data.borrow_mut() = data;
        self.last_loaded.set(loaded.then(|| self.client.now()));
        self.generation.set(self.client.next_generation());
    }

    fn has_data(&self) -> bool {
        self.data
            .borrow()
            .as_ref()
            .is_some_and(|record| !record.is_empty())
    }

    fn is_stale(&self) -> bool {
        let Some(loaded) = self.last_loaded.get() else {
            return true;
        };
        (self.client.now() - loaded)
            .to_std()
            .is_ok_and(|elapsed| elapsed > self.kind.data_expiration())
    }

    fn current_parent(&self) -> Option<Rc<ResourceCell>> {
        match self.parent.as_ref()? {
            ParentRef::Resource(parent) => parent.upgrade(),
            ParentRef::List(list) => list.associated_parent(self),
        }
    }

    /// `true` when a living parent was reloaded after this record was
    /// derived, or is itself due for a reload. Checked up to the root, so a
    /// top-level reload reaches every descendant.
    fn parent_changed(&self) -> bool {
        self.current_parent().is_some_and(|parent| {
            parent.generation() != self.parent_generation.get() || parent.needs_reload()
        })
    }

    fn needs_reload(&self) -> bool {
        !self.has_data() || self.is_stale() || self.parent_changed()
    }
}

/// Untyped handle to a resource of any kind.
///
/// Obtained from nested fields, or from a [`Resource<K>`] through `Deref`.
#[derive(Clone)]
pub struct AnyResource {
    cell: Rc<ResourceCell>,
}

impl AnyResource {
    pub(crate) fn top_level(
        client: &RestClient,
        kind: KindInfo,
        id: Option<ResourceId>,
        data: Option<Record>,
    ) -> Self {
        let cell = ResourceCell::new(client.clone(), kind, None, None, None);
        *cell.id.borrow_mut() = id;
        if data.is_some() {
            cell.set_raw_data(data);
        }
        Self {
            cell: Rc::new(cell),
        }
    }

    pub(crate) fn nested(
        owner: &Self,
        kind: KindInfo,
        field_name: &str,
        source: &str,
        record: Record,
    ) -> Self {
        let cell = ResourceCell::new(
            owner.cell.client.clone(),
            kind,
            Some(ParentRef::Resource(Rc::downgrade(&owner.cell))),
            Some(field_name.to_string()),
            Some(source.to_string()),
        );
        cell.set_raw_data(Some(record));
        cell.parent_generation.set(owner.cell.generation());
        Self {
            cell: Rc::new(cell),
        }
    }

    pub(crate) fn listed(
        list: &Rc<ListResource>,
        owner: &Self,
        record: Record,
        parent_generation: u64,
    ) -> Self {
        let cell = ResourceCell::new(
            owner.cell.client.clone(),
            list.child_kind(),
            Some(ParentRef::List(Rc::clone(list))),
            Some(list.field_name().to_string()),
            Some(list.source().to_string()),
        );
        cell.set_raw_data(Some(record));
        cell.parent_generation.set(parent_generation);
        Self {
            cell: Rc::new(cell),
        }
    }

    pub(crate) const fn from_cell(cell: Rc<ResourceCell>) -> Self {
        Self { cell }
    }

    pub(crate) const fn cell(&self) -> &Rc<ResourceCell> {
        &self.cell
    }

    /// Returns the resource's kind.
    #[must_use]
    pub fn kind(&self) -> KindInfo {
        self.cell.kind
    }

    /// Returns the kind's name.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.cell.kind.name()
    }

    /// Returns `true` if this resource is of kind `K`.
    #[must_use]
    pub fn is<K: ResourceKind>(&self) -> bool {
        self.cell.kind.is::<K>()
    }

    /// Returns a typed handle if this resource is of kind `K`.
    #[must_use]
    pub fn downcast<K: ResourceKind>(&self) -> Option<Resource<K>> {
        self.is::<K>().then(|| Resource {
            inner: self.clone(),
            _kind: PhantomData,
        })
    }

    /// Returns the client this resource loads through.
    #[must_use]
    pub fn client(&self) -> &RestClient {
        &self.cell.client
    }

    /// Returns the primary key, if known.
    ///
    /// Never triggers a load.
    #[must_use]
    pub fn id(&self) -> Option<ResourceId> {
        self.cell.id.borrow().clone()
    }

    /// Returns the cached record without loading.
    #[must_use]
    pub fn raw_data(&self) -> Option<Record> {
        self.cell.data.borrow().clone()
    }

    /// Replaces the cached record.
    ///
    /// A non-empty record marks the resource loaded now and, if it carries
    /// an `id`, replaces the known id. An empty or absent record marks it
    /// unloaded.
    pub fn set_raw_data(&self, data: Option<Record>) {
        self.cell.set_raw_data(data);
    }

    /// Returns when the cached record was last assigned, if it is non-empty.
    #[must_use]
    pub fn last_loaded(&self) -> Option<DateTime<Utc>> {
        self.cell.last_loaded.get()
    }

    /// Returns `true` if the cached record is older than the expiration
    /// window (or there is none).
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.cell.is_stale()
    }

    /// Returns `true` if the next field read will reload the record.
    #[must_use]
    pub fn needs_reload(&self) -> bool {
        self.cell.needs_reload()
    }

    /// Returns the parent field name this resource was derived from.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.cell.field_name.as_deref()
    }

    /// Returns the living resource this one was derived from, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.cell.current_parent().map(Self::from_cell)
    }

    /// Returns `true` if both handles refer to the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// Returns the kind's field set.
    #[must_use]
    pub fn field_set(&self) -> Rc<FieldSet> {
        self.cell.client.field_set(&self.cell.kind)
    }

    /// Returns the URL of this instance, `{collection_url}/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if the id is unknown.
    pub fn absolute_url(&self) -> Result<String, ResourceError> {
        let id = self.id().ok_or(ResourceError::MissingId {
            resource: self.kind_name(),
        })?;
        Ok(format!(
            "{}/{}",
            collection_url(&self.cell.client, &self.cell.kind),
            id.to_path_segment()
        ))
    }

    fn ensure_fresh(&self) -> Result<(), ResourceError> {
        if self.cell.needs_reload() {
            self.reload()?;
        }
        Ok(())
    }

    /// Returns the raw value under `key`, loading first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingField`] naming the available keys if
    /// `key` is absent, or any error from loading.
    pub fn raw_field(&self, key: &str) -> Result<Value, ResourceError> {
        self.ensure_fresh()?;

        let data = self.cell.data.borrow();
        let record = data.as_ref();
        record
            .and_then(|record| record.get(key))
            .cloned()
            .ok_or_else(|| ResourceError::MissingField {
                field: key.to_string(),
                available: record
                    .map(|record| record.keys().cloned().collect::<Vec<_>>().join(", "))
                    .unwrap_or_default(),
            })
    }

    /// Like [`raw_field`](Self::raw_field), with absence reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns any error from loading.
    pub fn raw_field_opt(&self, key: &str) -> Result<Option<Value>, ResourceError> {
        self.ensure_fresh()?;
        Ok(self
            .cell
            .data
            .borrow()
            .as_ref()
            .and_then(|record| record.get(key))
            .cloned())
    }

    /// Returns the representation of the declared field `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownField`] if the kind declares no such
    /// field, or any error from [`Field::to_representation`](crate::rest::Field::to_representation).
    pub fn field(&self, name: &str) -> Result<FieldValue, ResourceError> {
        let fields = self.field_set();
        let field = fields.get(name).ok_or_else(|| ResourceError::UnknownField {
            resource: self.kind_name(),
            field: name.to_string(),
        })?;
        field.to_representation(self)
    }

    /// Returns a plain field's raw value.
    ///
    /// # Errors
    ///
    /// As [`field`](Self::field); a type error if `name` is not a plain field.
    pub fn value(&self, name: &str) -> Result<Value, ResourceError> {
        match self.field(name)? {
            FieldValue::Raw(value) => Ok(value),
            other => Err(mismatch(name, "a raw value", &other)),
        }
    }

    /// Returns a date-time field's value.
    ///
    /// # Errors
    ///
    /// As [`field`](Self::field); a type error if `name` is not a date-time
    /// field.
    pub fn datetime(&self, name: &str) -> Result<Option<DateTime<Utc>>, ResourceError> {
        match self.field(name)? {
            FieldValue::DateTime(value) => Ok(value),
            other => Err(mismatch(name, "a date-time", &other)),
        }
    }

    /// Returns a link field's value.
    ///
    /// # Errors
    ///
    /// As [`field`](Self::field); a type error if `name` is not a link field.
    pub fn link(&self, name: &str) -> Result<Option<Value>, ResourceError> {
        match self.field(name)? {
            FieldValue::Link(value) => Ok(value),
            other => Err(mismatch(name, "a link", &other)),
        }
    }

    /// Returns an embedded resource.
    ///
    /// Every call produces a new instance.
    ///
    /// # Errors
    ///
    /// As [`field`](Self::field); a type error if `name` is not an embedded
    /// field.
    pub fn related(&self, name: &str) -> Result<Option<Self>, ResourceError> {
        match self.field(name)? {
            FieldValue::Resource(value) => Ok(value),
            other => Err(mismatch(name, "a resource", &other)),
        }
    }

    /// Returns the resources of a list field.
    ///
    /// Every call produces new instances.
    ///
    /// # Errors
    ///
    /// As [`field`](Self::field); a type error if `name` is not a list field.
    pub fn many(&self, name: &str) -> Result<Vec<Self>, ResourceError> {
        match self.field(name)? {
            FieldValue::List(value) => Ok(value),
            other => Err(mismatch(name, "a list of resources", &other)),
        }
    }

    /// Fetches a fresh record and caches it.
    ///
    /// Top-level resources issue a GET against their absolute URL and
    /// require the returned record to carry the known id. Derived resources
    /// re-derive their record from their parent.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::DataNotFound`] if the fetched record has another id
    ///   or none, or a list entry's id is gone from its parent's array
    /// - [`ResourceError::NoAssociatedParent`] / [`ResourceError::ParentReleased`]
    ///   if the parent is gone
    /// - API errors from the request or response parsing
    pub fn reload(&self) -> Result<(), ResourceError> {
        tracing::debug!("Reloading {}", self);
        let (record, parent_generation) = self.fetch()?;

        if self.cell.parent.is_none() {
            if let Some(known) = self.id() {
                let fetched = record.get("id").and_then(ResourceId::from_value);
                if fetched.as_ref() != Some(&known) {
                    return Err(ResourceError::DataNotFound {
                        resource: self.to_string(),
                    });
                }
            }
        }

        self.cell.set_raw_data(Some(record));
        self.cell.parent_generation.set(parent_generation);
        Ok(())
    }

    /// Fetches a fresh record without caching it.
    ///
    /// # Errors
    ///
    /// As [`reload`](Self::reload), without the id check.
    pub fn fetch_data(&self) -> Result<Record, ResourceError> {
        self.fetch().map(|(record, _)| record)
    }

    fn fetch(&self) -> Result<(Record, u64), ResourceError> {
        match &self.cell.parent {
            Some(ParentRef::Resource(parent)) => {
                let parent = parent
                    .upgrade()
                    .map(Self::from_cell)
                    .ok_or_else(|| ResourceError::ParentReleased {
                        resource: self.to_string(),
                    })?;
                let source = self.cell.source.as_deref().unwrap_or_default();
                let raw = parent.raw_field(source)?;
                if raw.is_null() {
                    return Err(ResourceError::DataNotFound {
                        resource: self.to_string(),
                    });
                }
                let field = self.field_name().unwrap_or(source);
                let record = expect_record(field, raw)?;
                Ok((record, parent.cell.generation()))
            }
            Some(ParentRef::List(list)) => list.lookup(self),
            None => {
                let url = self.absolute_url()?;
                let response = self.cell.client.get(&url, BTreeMap::new())?;
                let record = self.cell.client.parser().record(&response, &self.cell.kind)?;
                Ok((record, 0))
            }
        }
    }

    /// Deletes the resource on the server.
    ///
    /// # Errors
    ///
    /// Returns an API error containing "Could not delete" for a non-ok
    /// response, or [`ResourceError::MissingId`] if the id is unknown.
    pub fn delete(&self) -> Result<(), ResourceError> {
        let url = self.absolute_url()?;
        let response = self.cell.client.delete(&url)?;
        if !response.is_ok() {
            return Err(ApiError::new(format!("Could not delete {self}"), response).into());
        }
        tracing::debug!("Deleted {}", self);
        Ok(())
    }

    /// Validates data intended for creation.
    ///
    /// Checks, in order: every required field has a truthy value; the
    /// kind's per-field validator accepts each declared field; the kind's
    /// whole-record validator accepts the data.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] (or whatever a validator
    /// returns) for the first failure.
    pub fn run_validation(&self, data: &Record) -> Result<(), ResourceError> {
        let fields = self.field_set();

        for field in fields.iter().filter(|field| field.is_required()) {
            let name = field.field_name()?;
            if !data.get(name).is_some_and(is_truthy) {
                return Err(ResourceError::validation(format!(
                    "No value provided for '{name}'"
                )));
            }
        }

        for field in fields.iter() {
            let name = field.field_name()?;
            self.cell.kind.validate_field(name, data.get(name))?;
        }

        self.cell.kind.validate(data)
    }
}

fn mismatch(field: &str, expected: &'static str, found: &FieldValue) -> ResourceError {
    ResourceError::UnexpectedType {
        field: field.to_string(),
        expected,
        found: found.kind_name().to_string(),
    }
}

impl PartialEq for AnyResource {
    fn eq(&self, other: &Self) -> bool {
        self.cell.kind == other.cell.kind && self.id() == other.id()
    }
}

impl fmt::Display for AnyResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}(id={id})", self.kind_name()),
            None => write!(f, "{}(id=None)", self.kind_name()),
        }
    }
}

impl fmt::Debug for AnyResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.cell.data.borrow();
        match data.as_ref().filter(|record| !record.is_empty()) {
            Some(record) => {
                let pretty = serde_json::to_string_pretty(record).map_err(|_| fmt::Error)?;
                write!(f, "{}({pretty})", self.kind_name())
            }
            None => write!(f, "{self} - Not Loaded"),
        }
    }
}

/// Typed handle to a resource of kind `K`.
///
/// Dereferences to [`AnyResource`] for field access and lifecycle calls.
///
/// # Equality
///
/// Two handles are equal when they are of the same kind and have the same
/// id. Handles of different kinds are never equal, even when one kind
/// declares its fields on top of the other's.
pub struct Resource<K: ResourceKind> {
    inner: AnyResource,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> Resource<K> {
    fn wrap(inner: AnyResource) -> Self {
        Self {
            inner,
            _kind: PhantomData,
        }
    }

    /// Creates an unloaded resource with a known id.
    ///
    /// The first field read fetches `{collection_url}/{id}`.
    #[must_use]
    pub fn new(client: &RestClient, id: impl Into<ResourceId>) -> Self {
        Self::wrap(AnyResource::top_level(
            client,
            KindInfo::of::<K>(),
            Some(id.into()),
            None,
        ))
    }

    /// Creates a resource from a record; its id is taken from `data["id"]`.
    #[must_use]
    pub fn with_data(client: &RestClient, data: Record) -> Self {
        Self::wrap(AnyResource::top_level(
            client,
            KindInfo::of::<K>(),
            None,
            Some(data),
        ))
    }

    /// Creates a resource with neither id nor data.
    #[must_use]
    pub fn empty(client: &RestClient) -> Self {
        Self::wrap(AnyResource::top_level(client, KindInfo::of::<K>(), None, None))
    }

    /// Returns the collection of kind `K`.
    #[must_use]
    pub fn collection(client: &RestClient) -> Collection<K> {
        Collection::new(client)
    }

    /// Lists resources of kind `K`. See [`Collection::get`].
    ///
    /// # Errors
    ///
    /// As [`Collection::get`].
    pub fn get(client: &RestClient, params: GetParams) -> Result<Vec<Self>, ResourceError> {
        Collection::new(client).get(params)
    }

    /// Creates a resource of kind `K`. See [`Collection::create`].
    ///
    /// # Errors
    ///
    /// As [`Collection::create`].
    pub fn create(client: &RestClient, data: Record) -> Result<Self, ResourceError> {
        Collection::new(client).create(data)
    }

    /// Returns the untyped handle.
    #[must_use]
    pub const fn as_any(&self) -> &AnyResource {
        &self.inner
    }

    /// Converts into the untyped handle.
    #[must_use]
    pub fn into_any(self) -> AnyResource {
        self.inner
    }
}

impl<K: ResourceKind> Clone for Resource<K> {
    fn clone(&self) -> Self {
        Self::wrap(self.inner.clone())
    }
}

impl<K: ResourceKind> Deref for Resource<K> {
    type Target = AnyResource;

    fn deref(&self) -> &AnyResource {
        &self.inner
    }
}

impl<A: ResourceKind, B: ResourceKind> PartialEq<Resource<B>> for Resource<A> {
    fn eq(&self, other: &Resource<B>) -> bool {
        self.inner == other.inner
    }
}

impl<K: ResourceKind> From<Resource<K>> for AnyResource {
    fn from(resource: Resource<K>) -> Self {
        resource.inner
    }
}

impl<K: ResourceKind> fmt::Display for Resource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<K: ResourceKind> fmt::Debug for Resource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}
