//! Field declarations and value projection.
//!
//! A [`Field`] knows how to project one value out of its owning resource's
//! raw data. Reading a field goes through the owner's staleness-aware
//! accessor, so it may trigger a reload.
//!
//! Five kinds of field exist:
//!
//! | Constructor              | Raw data                          | Representation                  |
//! |--------------------------|-----------------------------------|---------------------------------|
//! | [`Field::plain`]         | any value under `source`          | [`FieldValue::Raw`]             |
//! | [`Field::datetime`]      | a date string under `source`      | [`FieldValue::DateTime`]        |
//! | [`Field::link`]          | `links[source without "_link"]`   | [`FieldValue::Link`]            |
//! | [`Field::embedded`]      | an object under `source`          | [`FieldValue::Resource`]        |
//! | [`Field::many`]          | an array of objects under `source`| [`FieldValue::List`]            |

use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::rest::errors::ResourceError;
use crate::rest::kind::{KindInfo, Record, ResourceKind};
use crate::rest::list::ListResource;
use crate::rest::resource::AnyResource;

/// Key of the sub-mapping holding link values.
pub const LINKS_KEY: &str = "links";

/// Suffix removed from a link field's source to find its key in `links`.
pub const LINK_SUFFIX: &str = "_link";

#[derive(Clone)]
enum FieldKind {
    Plain,
    DateTime,
    Link,
    Embedded(KindInfo),
    Many {
        child: KindInfo,
        list: Option<Rc<ListResource>>,
    },
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("Plain"),
            Self::DateTime => f.write_str("DateTime"),
            Self::Link => f.write_str("Link"),
            Self::Embedded(child) => write!(f, "Embedded({})", child.name()),
            Self::Many { child, .. } => write!(f, "Many({})", child.name()),
        }
    }
}

/// A declared field of a resource type.
///
/// Fields are declared unbound in
/// [`ResourceKind::declare_fields`](crate::rest::ResourceKind::declare_fields)
/// and bound to their name when the type's field set is built.
///
/// # Example
///
/// ```rust
/// use drf_client::rest::Field;
///
/// let field = Field::plain().source("display_name").required();
/// assert!(field.is_required());
/// assert_eq!(field.source_name().unwrap(), "display_name");
/// assert!(field.field_name().is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Field {
    kind: FieldKind,
    name: Option<String>,
    source: Option<String>,
    required: bool,
}

impl Field {
    const fn with_kind(kind: FieldKind) -> Self {
        Self {
            kind,
            name: None,
            source: None,
            required: false,
        }
    }

    /// A field returning its raw JSON value.
    #[must_use]
    pub const fn plain() -> Self {
        Self::with_kind(FieldKind::Plain)
    }

    /// A field parsing a date/time string into a UTC timestamp.
    #[must_use]
    pub const fn datetime() -> Self {
        Self::with_kind(FieldKind::DateTime)
    }

    /// A field read from the record's `links` mapping.
    #[must_use]
    pub const fn link() -> Self {
        Self::with_kind(FieldKind::Link)
    }

    /// A single nested resource of kind `K`, embedded as an object.
    #[must_use]
    pub fn embedded<K: ResourceKind>() -> Self {
        Self::with_kind(FieldKind::Embedded(KindInfo::of::<K>()))
    }

    /// A list of nested resources of kind `K`, embedded as an array.
    #[must_use]
    pub fn many<K: ResourceKind>() -> Self {
        Self::with_kind(FieldKind::Many {
            child: KindInfo::of::<K>(),
            list: None,
        })
    }

    /// Reads the value from `source` instead of the field's own name.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Rejects creation data lacking a truthy value for this field.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns `true` if creation requires this field.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns `true` for list fields.
    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(self.kind, FieldKind::Many { .. })
    }

    /// Returns the name the field is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnboundField`] before binding.
    pub fn field_name(&self) -> Result<&str, ResourceError> {
        self.name.as_deref().ok_or(ResourceError::UnboundField)
    }

    /// Returns the raw-data key this field reads.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnboundField`] if no explicit source was
    /// given and the field is not bound yet.
    pub fn source_name(&self) -> Result<&str, ResourceError> {
        self.source
            .as_deref()
            .or(self.name.as_deref())
            .ok_or(ResourceError::UnboundField)
    }

    pub(crate) fn bound_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Binds the field to `name`.
    pub(crate) fn bind(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        if let FieldKind::Many { child, list } = &mut self.kind {
            let source = self.source.clone().unwrap_or_else(|| name.to_string());
            *list = Some(ListResource::new(name, source, *child));
        }
        self
    }

    /// Projects this field's value out of `owner`'s raw data.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::UnboundField`] if the field was never bound
    /// - any error from loading `owner` or its parents
    /// - a lookup error if the value is absent from the raw data
    /// - a type error if the value cannot be coerced
    pub fn to_representation(&self, owner: &AnyResource) -> Result<FieldValue, ResourceError> {
        let name = self.field_name()?;
        let source = self.source_name()?;

        match &self.kind {
            FieldKind::Plain => owner.raw_field(source).map(FieldValue::Raw),
            FieldKind::DateTime => {
                let raw = owner.raw_field(source)?;
                parse_datetime(&raw).map(FieldValue::DateTime)
            }
            FieldKind::Link => {
                let links = owner.raw_field_opt(LINKS_KEY)?;
                let key = link_key(source);
                let value = links
                    .as_ref()
                    .and_then(Value::as_object)
                    .and_then(|links| links.get(key))
                    .filter(|value| !value.is_null())
                    .cloned();
                Ok(FieldValue::Link(value))
            }
            FieldKind::Embedded(child) => {
                let raw = owner.raw_field(source)?;
                if raw.is_null() {
                    return Ok(FieldValue::Resource(None));
                }
                let record = expect_record(name, raw)?;
                let nested = AnyResource::nested(owner, *child, name, source, record);
                Ok(FieldValue::Resource(Some(nested)))
            }
            FieldKind::Many { list, .. } => {
                let list = list.as_ref().ok_or(ResourceError::UnboundField)?;
                ListResource::materialize(list, owner).map(FieldValue::List)
            }
        }
    }
}

/// The representation of a field value.
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// A plain field's raw JSON value.
    Raw(Value),
    /// A date-time field; `None` for empty input.
    DateTime(Option<DateTime<Utc>>),
    /// A link field; `None` when the link is absent.
    Link(Option<Value>),
    /// An embedded resource; `None` when the data holds `null`.
    Resource(Option<AnyResource>),
    /// The resources of a list field.
    List(Vec<AnyResource>),
}

impl FieldValue {
    /// Returns the name of the representation, for messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Raw(_) => "a raw value",
            Self::DateTime(_) => "a date-time",
            Self::Link(_) => "a link",
            Self::Resource(_) => "a resource",
            Self::List(_) => "a list of resources",
        }
    }
}

/// Strips the link suffix from a source name.
///
/// # Example
///
/// ```rust
/// use drf_client::rest::link_key;
///
/// assert_eq!(link_key("owner_link"), "owner");
/// assert_eq!(link_key("owner"), "owner");
/// assert_eq!(link_key("blink"), "blink");
/// ```
#[must_use]
pub fn link_key(source: &str) -> &str {
    source.strip_suffix(LINK_SUFFIX).unwrap_or(source)
}

/// Coerces a raw value into a UTC timestamp.
///
/// Falsy input (`null`, `""`, `false`, `0`, `[]`, `{}`) yields `None`.
/// Strings are read as RFC 3339, RFC 2822, `YYYY-MM-DDTHH:MM:SS[.f]` with an
/// optional numeric offset, `YYYY-MM-DD HH:MM:SS[.f]`, or `YYYY-MM-DD`.
/// Values without an offset are taken as UTC. Numbers are never read as
/// timestamps.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidDateTime`] for any other input.
///
/// # Example
///
/// ```rust
/// use drf_client::rest::parse_datetime;
/// use serde_json::json;
///
/// let parsed = parse_datetime(&json!("2016-01-01T10:00:00+02:00")).unwrap().unwrap();
/// assert_eq!(parsed.to_rfc3339(), "2016-01-01T08:00:00+00:00");
///
/// assert_eq!(parse_datetime(&json!(null)).unwrap(), None);
/// assert!(parse_datetime(&json!(1451606400)).is_err());
/// ```
pub fn parse_datetime(value: &Value) -> Result<Option<DateTime<Utc>>, ResourceError> {
    if !is_truthy(value) {
        return Ok(None);
    }

    let Value::String(input) = value else {
        return Err(ResourceError::InvalidDateTime {
            input: value.to_string(),
        });
    };
    let input = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(input) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    if let Ok(parsed) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Some(Utc.from_utc_datetime(&naive)));
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(Utc.from_utc_datetime(&naive)));
    }

    Err(ResourceError::InvalidDateTime {
        input: input.to_string(),
    })
}

/// Returns `false` for `null`, `false`, zero, and empty strings, arrays and
/// objects.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub(crate) fn expect_record(field: &str, value: Value) -> Result<Record, ResourceError> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(ResourceError::UnexpectedType {
            field: field.to_string(),
            expected: "an object",
            found: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    struct Child;

    impl ResourceKind for Child {
        const NAME: &'static str = "Child";

        fn declare_fields(_fields: &mut crate::rest::FieldSetBuilder) {}
    }

    #[test]
    fn test_source_defaults_to_bound_name() {
        let field = Field::plain().bind("title");
        assert_eq!(field.field_name().unwrap(), "title");
        assert_eq!(field.source_name().unwrap(), "title");
    }

    #[test]
    fn test_explicit_source_survives_binding() {
        let field = Field::datetime().source("created_at").bind("created");
        assert_eq!(field.field_name().unwrap(), "created");
        assert_eq!(field.source_name().unwrap(), "created_at");
    }

    #[test]
    fn test_unbound_source_is_an_error() {
        assert!(matches!(
            Field::plain().source_name(),
            Err(ResourceError::UnboundField)
        ));
    }

    #[test]
    fn test_many_field_creates_list_on_bind() {
        let field = Field::many::<Child>();
        assert!(field.is_many());
        assert!(matches!(&field.kind, FieldKind::Many { list: None, .. }));

        let bound = field.bind("children");
        assert!(matches!(&bound.kind, FieldKind::Many { list: Some(_), .. }));
    }

    #[test]
    fn test_link_key_strips_exact_suffix() {
        assert_eq!(link_key("author_link"), "author");
        assert_eq!(link_key("author"), "author");
        assert_eq!(link_key("link"), "link");
        assert_eq!(link_key("_link"), "");
        assert_eq!(link_key("kil_link"), "kil");
    }

    #[test]
    fn test_rfc3339_is_converted_to_utc() {
        let parsed = parse_datetime(&json!("2015-06-30T23:30:00-05:00"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.year(), 2015);
        assert_eq!(parsed.month(), 7);
        assert_eq!(parsed.day(), 1);
        assert_eq!(parsed.hour(), 4);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn test_fractional_seconds_and_zulu() {
        let parsed = parse_datetime(&json!("2016-02-03T04:05:06.789Z"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 789);
    }

    #[test]
    fn test_naive_formats_are_utc() {
        let t = parse_datetime(&json!("2016-02-03T04:05:06")).unwrap().unwrap();
        let space = parse_datetime(&json!("2016-02-03 04:05:06")).unwrap().unwrap();
        assert_eq!(t, space);
        assert_eq!(t.to_rfc3339(), "2016-02-03T04:05:06+00:00");
    }

    #[test]
    fn test_offset_without_colon() {
        let parsed = parse_datetime(&json!("2016-02-03T04:05:06+0100"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.hour(), 3);
    }

    #[test]
    fn test_rfc2822() {
        let parsed = parse_datetime(&json!("Wed, 03 Feb 2016 04:05:06 +0000"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.day(), 3);
    }

    #[test]
    fn test_date_only_is_midnight() {
        let parsed = parse_datetime(&json!("2016-02-03")).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2016-02-03T00:00:00+00:00");
    }

    #[test]
    fn test_falsy_values_yield_none() {
        for value in [json!(null), json!(""), json!(false), json!(0), json!([]), json!({})] {
            assert_eq!(parse_datetime(&value).unwrap(), None, "for {value}");
        }
    }

    #[test]
    fn test_integer_timestamp_is_rejected() {
        let error = parse_datetime(&json!(1_451_606_400)).unwrap_err();
        assert!(error.is_type_error());
        assert_eq!(error.to_string(), "Invalid date format provided: 1451606400");
    }

    #[test]
    fn test_unparseable_string_is_rejected() {
        let error = parse_datetime(&json!("next tuesday")).unwrap_err();
        assert!(matches!(
            error,
            ResourceError::InvalidDateTime { input } if input == "next tuesday"
        ));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!([0])));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
    }

    #[test]
    fn test_expect_record_rejects_scalars() {
        assert!(expect_record("owner", json!({"id": 1})).is_ok());
        let error = expect_record("owner", json!(5)).unwrap_err();
        assert!(error.is_type_error());
    }
}
