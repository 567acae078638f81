//! Resource identifiers.

use std::fmt;

use serde_json::Value;

/// The primary key of a resource: an integer or a string.
///
/// # Example
///
/// ```rust
/// use drf_client::rest::ResourceId;
/// use serde_json::json;
///
/// assert_eq!(ResourceId::from_value(&json!(7)), Some(ResourceId::Int(7)));
/// assert_eq!(ResourceId::from(7).to_string(), "7");
/// assert_eq!(ResourceId::from("abc").to_value(), json!("abc"));
/// assert_eq!(ResourceId::from_value(&json!(null)), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// A numeric id.
    Int(i64),
    /// A string id (slug, uuid, ...).
    Str(String),
}

impl ResourceId {
    /// Reads an id from a JSON value.
    ///
    /// Integers and strings are ids; everything else (null included) is not.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map_or_else(
                || Some(Self::Str(number.to_string())),
                |int| Some(Self::Int(int)),
            ),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    /// Returns the id as the JSON value a record would carry.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(int) => Value::from(*int),
            Self::Str(s) => Value::from(s.as_str()),
        }
    }

    /// Returns the id as a URL path segment.
    #[must_use]
    pub fn to_path_segment(&self) -> String {
        match self {
            Self::Int(int) => int.to_string(),
            Self::Str(s) => urlencoding::encode(s).into_owned(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(int) => write!(f, "{int}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ResourceId {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for ResourceId {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}
