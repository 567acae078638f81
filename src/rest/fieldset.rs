//! Ordered field registration.
//!
//! A resource type's fields are collected once per client into a
//! [`FieldSet`]: an ordered mapping from field name to a [`Field`] bound to
//! that name.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::rest::field::Field;
use crate::rest::kind::KindInfo;

/// Collects field declarations for a resource type.
///
/// Inserting a name that is already declared replaces that field but keeps
/// its position, so a derived type can override an inherited field.
///
/// # Example
///
/// ```rust
/// use drf_client::rest::{Field, FieldSetBuilder};
///
/// let mut builder = FieldSetBuilder::new();
/// builder
///     .insert("name", Field::plain())
///     .insert("created", Field::plain())
///     .insert("name", Field::plain().required());
///
/// assert_eq!(builder.names(), vec!["name", "created"]);
/// ```
#[derive(Debug, Default)]
pub struct FieldSetBuilder {
    fields: Vec<(String, Field)>,
}

impl FieldSetBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field, replacing any earlier declaration of `name`.
    pub fn insert(&mut self, name: impl Into<String>, field: Field) -> &mut Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    /// Removes a declared field, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Field> {
        let index = self.fields.iter().position(|(existing, _)| existing == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Returns the declared names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Binds every field to its name and freezes the set.
    #[must_use]
    pub fn build(self) -> FieldSet {
        let fields = self
            .fields
            .into_iter()
            .map(|(name, field)| field.bind(&name))
            .collect();
        FieldSet { fields }
    }
}

/// The bound, ordered fields of one resource type.
#[derive(Debug, Default)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    /// Builds the field set of `kind` from its declarations.
    #[must_use]
    pub fn of(kind: &KindInfo) -> Self {
        let mut builder = FieldSetBuilder::new();
        kind.declare_fields(&mut builder);
        builder.build()
    }

    /// Returns the field bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.bound_name() == Some(name))
    }

    /// Iterates over the fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Returns the field names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().filter_map(Field::bound_name).collect()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Per-client cache of field sets, built once per resource type.
#[derive(Debug, Default)]
pub(crate) struct FieldRegistry {
    sets: RefCell<HashMap<TypeId, Rc<FieldSet>>>,
}

impl FieldRegistry {
    pub(crate) fn field_set(&self, kind: &KindInfo) -> Rc<FieldSet> {
        if let Some(set) = self.sets.borrow().get(&kind.type_id()) {
            return Rc::clone(set);
        }

        // Declarations never consult the registry.
        let set = Rc::new(FieldSet::of(kind));
        tracing::debug!("Registered {} fields for {}", set.len(), kind.name());
        self.sets
            .borrow_mut()
            .entry(kind.type_id())
            .or_insert(set)
            .clone()
    }
}
