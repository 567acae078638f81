//! Resource-specific error types.
//!
//! This module contains the error type returned by field access, reloads,
//! validation and collection calls.
//!
//! # Error Handling
//!
//! Errors fall into four categories:
//!
//! - **Validation** ([`ResourceError::is_validation`]): a required field was
//!   missing or falsy, or a custom validator rejected the data
//! - **Lookup** ([`ResourceError::is_lookup`]): a field is absent from the
//!   raw data, a child resource is detached from its parent's current data,
//!   or a reload returned a different object
//! - **API** ([`ResourceError::is_api`]): the API answered with a non-ok
//!   status or an unexpected body shape, or no response was obtained
//! - **Type** ([`ResourceError::is_type_error`]): a raw value cannot be
//!   coerced to the field's representation
//!
//! # Example
//!
//! ```rust,ignore
//! use drf_client::rest::ResourceError;
//!
//! match item.field("name") {
//!     Ok(value) => println!("Name: {value:?}"),
//!     Err(e) if e.is_lookup() => println!("Item is gone: {e}"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::{ApiError, HttpError};

/// Error type for resource operations.
///
/// # Example
///
/// ```rust
/// use drf_client::rest::ResourceError;
///
/// let error = ResourceError::DataNotFound {
///     resource: "Item(id=2)".to_string(),
/// };
/// assert_eq!(error.to_string(), "Did not find data for Item(id=2)");
/// assert!(error.is_lookup());
/// ```
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Data supplied for creation failed validation.
    #[error("{message}")]
    Validation {
        /// Why the data was rejected.
        message: String,
    },

    /// The raw data has no value under the requested key.
    #[error("No '{field}' field found on the resource. Available fields: {available}")]
    MissingField {
        /// The key that was looked up.
        field: String,
        /// Comma-separated keys present in the raw data.
        available: String,
    },

    /// No data matching this resource exists in the current snapshot.
    ///
    /// Returned when a reload yields a record with a different id, or when a
    /// child's id is no longer present in its parent's array.
    #[error("Did not find data for {resource}")]
    DataNotFound {
        /// The offending instance, e.g. `Item(id=2)`.
        resource: String,
    },

    /// A child resource is no longer associated with any living parent.
    #[error("Unable to find associated parent for one of many {resource}")]
    NoAssociatedParent {
        /// The offending instance.
        resource: String,
    },

    /// The resource this one was derived from has been dropped.
    #[error("The parent of {resource} is no longer available")]
    ParentReleased {
        /// The offending instance.
        resource: String,
    },

    /// A top-level resource has neither data nor an id to fetch it by.
    #[error("Cannot load {resource} without an id")]
    MissingId {
        /// The type name of the resource.
        resource: &'static str,
    },

    /// The resource type declares no field with this name.
    #[error("{resource} has no field named '{field}'")]
    UnknownField {
        /// The type name of the resource.
        resource: &'static str,
        /// The requested field name.
        field: String,
    },

    /// A field was used before it was bound to a name.
    #[error("Field is not bound to a resource yet")]
    UnboundField,

    /// A date-time field received something that is not a date string.
    #[error("Invalid date format provided: {input}")]
    InvalidDateTime {
        /// The offending raw value, rendered as JSON.
        input: String,
    },

    /// A raw value has the wrong JSON type for its field.
    #[error("Expected {expected} for '{field}', found {found}")]
    UnexpectedType {
        /// The field being coerced.
        field: String,
        /// The JSON type the field needs.
        expected: &'static str,
        /// The raw value, rendered as JSON.
        found: String,
    },

    /// The API answered with an unusable response.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No response could be obtained.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ResourceError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns `true` for validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` for lookup failures.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::DataNotFound { .. }
                | Self::NoAssociatedParent { .. }
                | Self::ParentReleased { .. }
                | Self::MissingId { .. }
                | Self::UnknownField { .. }
                | Self::UnboundField
        )
    }

    /// Returns `true` for API and transport failures.
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Http(_))
    }

    /// Returns `true` for coercion failures.
    #[must_use]
    pub const fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDateTime { .. } | Self::UnexpectedType { .. }
        )
    }

    /// Returns the response attached to an API error, if any.
    #[must_use]
    pub const fn response(&self) -> Option<&crate::clients::HttpResponse> {
        match self {
            Self::Api(error) => Some(&error.response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpResponse;
    use serde_json::json;

    #[test]
    fn test_missing_field_lists_available_keys() {
        let error = ResourceError::MissingField {
            field: "color".to_string(),
            available: "id, name".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No 'color' field found on the resource. Available fields: id, name"
        );
        assert!(error.is_lookup());
    }

    #[test]
    fn test_no_associated_parent_message() {
        let error = ResourceError::NoAssociatedParent {
            resource: "Item(id=3)".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unable to find associated parent for one of many Item(id=3)"
        );
    }

    #[test]
    fn test_invalid_datetime_names_input() {
        let error = ResourceError::InvalidDateTime {
            input: "12345".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid date format provided: 12345");
        assert!(error.is_type_error());
        assert!(!error.is_lookup());
    }

    #[test]
    fn test_validation_category() {
        let error = ResourceError::validation("No value provided for 'name'");
        assert!(error.is_validation());
        assert!(!error.is_api());
        assert_eq!(error.to_string(), "No value provided for 'name'");
    }

    #[test]
    fn test_api_error_is_transparent() {
        let error: ResourceError = ApiError::new(
            "Could not delete Item(id=1)",
            HttpResponse::json(500, json!({"detail": "boom"})),
        )
        .into();

        assert!(error.is_api());
        assert!(error.to_string().starts_with("Could not delete Item(id=1)"));
        assert_eq!(error.response().map(|r| r.code), Some(500));
    }
}
