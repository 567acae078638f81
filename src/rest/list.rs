//! One-to-many embedded resources.
//!
//! A [`ListResource`] backs every list field of a resource type. Each time
//! the field is read on some parent, it materializes one new child per array
//! element and remembers which parent produced which children. Children
//! never fetch on their own: when their data is absent or stale they ask the
//! list to find their entry, by id, in their parent's current array.
//!
//! The association table holds only weak references in both directions, so
//! it keeps neither parents nor children alive. Children hold the list
//! itself strongly; the list is owned by the field set and never points back
//! to them strongly.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::rest::errors::ResourceError;
use crate::rest::field::expect_record;
use crate::rest::id::ResourceId;
use crate::rest::kind::{KindInfo, Record};
use crate::rest::resource::{AnyResource, ResourceCell};

struct Association {
    parent: Weak<ResourceCell>,
    children: Vec<Weak<ResourceCell>>,
}

impl Association {
    fn is_live(&self) -> bool {
        self.parent.strong_count() > 0
    }
}

/// The list-field implementation shared by all parents of one field.
pub struct ListResource {
    field_name: String,
    source: String,
    child: KindInfo,
    relationships: RefCell<Vec<Association>>,
}

impl ListResource {
    pub(crate) fn new(field_name: &str, source: String, child: KindInfo) -> Rc<Self> {
        Rc::new(Self {
            field_name: field_name.to_string(),
            source,
            child,
            relationships: RefCell::new(Vec::new()),
        })
    }

    /// Returns the name of the field this list backs.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the raw-data key holding the array.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the kind of the produced children.
    #[must_use]
    pub const fn child_kind(&self) -> KindInfo {
        self.child
    }

    /// Produces one new child per element of `owner`'s array.
    ///
    /// A `null` array yields no children.
    pub(crate) fn materialize(
        this: &Rc<Self>,
        owner: &AnyResource,
    ) -> Result<Vec<AnyResource>, ResourceError> {
        let raw = owner.raw_field(&this.source)?;
        let items = match raw {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            other => {
                return Err(ResourceError::UnexpectedType {
                    field: this.field_name.clone(),
                    expected: "an array",
                    found: other.to_string(),
                })
            }
        };

        let parent_generation = owner.cell().generation();
        let children = items
            .into_iter()
            .map(|item| {
                let record = expect_record(&this.field_name, item)?;
                Ok(AnyResource::listed(this, owner, record, parent_generation))
            })
            .collect::<Result<Vec<_>, ResourceError>>()?;

        this.associate(owner.cell(), &children);
        tracing::debug!(
            "Materialized {} {} for {}",
            children.len(),
            this.child.name(),
            owner
        );

        Ok(children)
    }

    fn associate(&self, parent: &Rc<ResourceCell>, children: &[AnyResource]) {
        let mut relationships = self.relationships.borrow_mut();
        relationships.retain(Association::is_live);

        let parent_ptr = Rc::as_ptr(parent);
        let index = relationships
            .iter()
            .position(|association| association.parent.as_ptr() == parent_ptr);
        let association = match index {
            Some(index) => &mut relationships[index],
            None => {
                relationships.push(Association {
                    parent: Rc::downgrade(parent),
                    children: Vec::new(),
                });
                let last = relationships.len() - 1;
                &mut relationships[last]
            }
        };

        association.children.retain(|child| child.strong_count() > 0);
        association
            .children
            .extend(children.iter().map(|child| Rc::downgrade(child.cell())));
    }

    /// Finds the living parent `child` was materialized from.
    pub(crate) fn associated_parent(&self, child: &ResourceCell) -> Option<Rc<ResourceCell>> {
        let child_ptr: *const ResourceCell = child;
        self.relationships
            .borrow()
            .iter()
            .find(|association| {
                association
                    .children
                    .iter()
                    .any(|candidate| candidate.as_ptr() == child_ptr)
            })
            .and_then(|association| association.parent.upgrade())
    }

    /// Finds `child`'s entry, by id, in its parent's current array.
    ///
    /// Returns the entry together with the parent's data generation it was
    /// read from.
    pub(crate) fn lookup(&self, child: &AnyResource) -> Result<(Record, u64), ResourceError> {
        let parent = self.associated_parent(child.cell()).ok_or_else(|| {
            tracing::warn!("{} is no longer associated with a parent", child);
            ResourceError::NoAssociatedParent {
                resource: child.to_string(),
            }
        })?;
        let parent = AnyResource::from_cell(parent);

        let not_found = || {
            tracing::warn!(
                "{} is missing from the {} of {}",
                child,
                self.field_name,
                parent
            );
            ResourceError::DataNotFound {
                resource: child.to_string(),
            }
        };

        let id = child.id().ok_or_else(not_found)?;
        let raw = parent.raw_field(&self.source)?;
        let entry = raw
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .find(|item| {
                        item.get("id").and_then(ResourceId::from_value).as_ref() == Some(&id)
                    })
                    .cloned()
            })
            .ok_or_else(not_found)?;

        let record = expect_record(&self.field_name, entry)?;
        Ok((record, parent.cell().generation()))
    }

    /// Returns the number of living parents with recorded children.
    #[must_use]
    pub fn parent_count(&self) -> usize {
        self.relationships
            .borrow()
            .iter()
            .filter(|association| association.is_live())
            .count()
    }
}

impl fmt::Debug for ListResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListResource")
            .field("field_name", &self.field_name)
            .field("source", &self.source)
            .field("child", &self.child.name())
            .finish_non_exhaustive()
    }
}
