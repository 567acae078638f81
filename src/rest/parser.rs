//! Response parsing strategies.
//!
//! A [`ResponseParser`] turns an API response into the records it carries.
//! The strategy is chosen once, when the [`RestClient`](crate::RestClient)
//! is built:
//!
//! - [`ResultsParser`] (default): `{"results": [ {record}, ... ]}`
//! - [`NamedResultsParser`]: `{"results": {collection_name: [ {record}, ... ]}}`
//!
//! Every failure is an [`ApiError`] carrying the response.

use serde_json::Value;

use crate::clients::{ApiError, HttpResponse};
use crate::rest::kind::{KindInfo, Record};

/// Key under which responses carry their records.
pub const RESULTS_KEY: &str = "results";

/// Extracts records from responses.
pub trait ResponseParser {
    /// Returns every record in `response`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the response is not ok, the records cannot
    /// be found, or there are none.
    fn records(&self, response: &HttpResponse, kind: &KindInfo) -> Result<Vec<Record>, ApiError>;

    /// Returns the first record in `response`.
    ///
    /// # Errors
    ///
    /// As [`records`](Self::records).
    fn record(&self, response: &HttpResponse, kind: &KindInfo) -> Result<Record, ApiError> {
        self.records(response, kind)?
            .into_iter()
            .next()
            .ok_or_else(|| no_records(response, kind))
    }
}

/// Parses `{"results": [ ... ]}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResultsParser;

impl ResponseParser for ResultsParser {
    fn records(&self, response: &HttpResponse, kind: &KindInfo) -> Result<Vec<Record>, ApiError> {
        ensure_ok(response, kind)?;
        let results = response.body.get(RESULTS_KEY);
        collect_records(results, response, kind)
    }
}

/// Parses `{"results": {collection_name: [ ... ]}}`.
///
/// The collection name comes from
/// [`ResourceKind::collection_name`](crate::rest::ResourceKind::collection_name).
#[derive(Clone, Copy, Debug, Default)]
pub struct NamedResultsParser;

impl ResponseParser for NamedResultsParser {
    fn records(&self, response: &HttpResponse, kind: &KindInfo) -> Result<Vec<Record>, ApiError> {
        ensure_ok(response, kind)?;
        let results = response
            .body
            .get(RESULTS_KEY)
            .and_then(|results| results.get(kind.collection_name()));
        collect_records(results, response, kind)
    }
}

fn ensure_ok(response: &HttpResponse, kind: &KindInfo) -> Result<(), ApiError> {
    if response.is_ok() {
        Ok(())
    } else {
        Err(ApiError::new(
            format!("Unable to parse {}", kind.name()),
            response.clone(),
        ))
    }
}

fn collect_records(
    results: Option<&Value>,
    response: &HttpResponse,
    kind: &KindInfo,
) -> Result<Vec<Record>, ApiError> {
    let not_found = || {
        ApiError::new(
            format!("Unable to find the {} data", kind.name()),
            response.clone(),
        )
    };

    let items = results.and_then(Value::as_array).ok_or_else(not_found)?;
    if items.is_empty() {
        return Err(no_records(response, kind));
    }

    items
        .iter()
        .map(|item| item.as_object().cloned().ok_or_else(not_found))
        .collect()
}

fn no_records(response: &HttpResponse, kind: &KindInfo) -> ApiError {
    ApiError::new(format!("No {} found", kind.name()), response.clone())
}

/// Returns the `Location` header of a creation response.
///
/// # Errors
///
/// Returns an [`ApiError`] if the response is not ok or has no location.
///
/// # Example
///
/// ```rust
/// use drf_client::clients::HttpResponse;
/// use drf_client::rest::extract_location;
/// use serde_json::json;
///
/// let response = HttpResponse::json(201, json!({}))
///     .with_header("Location", "http://api/items/7");
/// assert_eq!(extract_location(&response).unwrap(), "http://api/items/7");
/// ```
pub fn extract_location(response: &HttpResponse) -> Result<String, ApiError> {
    if !response.is_ok() {
        return Err(ApiError::new(
            "Could not retrieve location header.",
            response.clone(),
        ));
    }

    response
        .location()
        .filter(|location| !location.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::new(
                "No valid location found in response headers",
                response.clone(),
            )
        })
}
