//! Collection endpoints: listing and creation.
//!
//! A [`Collection<K>`] targets `{api_url}/{K::ROUTE}`. Listing is
//! paginated with `limit`/`offset` query parameters, clamped into the range
//! the API accepts.
//!
//! # Example
//!
//! ```rust,ignore
//! use drf_client::rest::{Collection, GetParams};
//!
//! let items = Collection::<Item>::new(&client).get(
//!     GetParams::new().limit(10).sort("-created").filter("owner", "7"),
//! )?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::clients::RestClient;
use crate::rest::errors::ResourceError;
use crate::rest::id::ResourceId;
use crate::rest::kind::{KindInfo, Record, ResourceKind};
use crate::rest::resource::Resource;

/// Returns `{api_url}/{route}` for `kind`.
#[must_use]
pub fn collection_url(client: &RestClient, kind: &KindInfo) -> String {
    format!("{}/{}", client.api_url(), kind.route())
}

/// Clamps `value` to at least `min` and, if given, at most `max`.
///
/// # Example
///
/// ```rust
/// use drf_client::rest::clamp;
///
/// assert_eq!(clamp(-5, 0, Some(500)), 0);
/// assert_eq!(clamp(510, 0, Some(500)), 500);
/// assert_eq!(clamp(10_000, 0, None), 10_000);
/// ```
#[must_use]
pub fn clamp(value: i64, min: i64, max: Option<i64>) -> i64 {
    let value = value.max(min);
    max.map_or(value, |max| value.min(max))
}

/// Prefixes `+` unless the sort already names a direction.
fn normalize_sort(sort: &str) -> Option<String> {
    if sort.is_empty() {
        None
    } else if sort.starts_with('+') || sort.starts_with('-') {
        Some(sort.to_string())
    } else {
        Some(format!("+{sort}"))
    }
}

/// Parameters of a listing request.
///
/// `limit` defaults to the client's configured page size, `offset` to 0.
/// Filters are passed through verbatim as query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetParams {
    limit: Option<i64>,
    offset: Option<i64>,
    sort: Option<String>,
    filters: BTreeMap<String, String>,
}

impl GetParams {
    /// Creates parameters with every value defaulted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of records to skip.
    #[must_use]
    pub const fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the sort field; a leading `-` sorts descending.
    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Adds a filter parameter.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    fn into_query(self, default_limit: i64, max_limit: i64) -> BTreeMap<String, String> {
        let mut query = self.filters;

        let limit = clamp(self.limit.unwrap_or(default_limit), 0, Some(max_limit));
        let offset = clamp(self.offset.unwrap_or(0), 0, None);
        query.insert("limit".to_string(), limit.to_string());
        query.insert("offset".to_string(), offset.to_string());

        if let Some(sort) = self.sort.as_deref().and_then(normalize_sort) {
            query.insert("sort".to_string(), sort);
        }

        query
    }
}

/// The collection endpoint of resource kind `K`.
pub struct Collection<K: ResourceKind> {
    client: RestClient,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> Collection<K> {
    /// Creates the collection for `client`.
    #[must_use]
    pub fn new(client: &RestClient) -> Self {
        Self {
            client: client.clone(),
            _kind: PhantomData,
        }
    }

    /// Returns `{api_url}/{K::ROUTE}`.
    #[must_use]
    pub fn url(&self) -> String {
        collection_url(&self.client, &KindInfo::of::<K>())
    }

    /// Lists one page of resources.
    ///
    /// # Errors
    ///
    /// Returns an API error for a non-ok or malformed response, and also
    /// when the page is empty.
    pub fn get(&self, params: GetParams) -> Result<Vec<Resource<K>>, ResourceError> {
        let config = self.client.config();
        let query = params.into_query(config.default_limit(), config.max_pagination_limit());
        let response = self.client.get(&self.url(), query)?;
        self.parse_many(&response)
    }

    /// Fetches several resources by id in one request, from
    /// `{collection_url}/{id1,id2,...}`.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get).
    pub fn get_by_ids(&self, ids: &[ResourceId]) -> Result<Vec<Resource<K>>, ResourceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(ResourceId::to_path_segment)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/{joined}", self.url());
        let response = self.client.get(&url, BTreeMap::new())?;
        self.parse_many(&response)
    }

    /// Validates `data`, POSTs it, and returns the created resource.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request is made, or an API
    /// error for a non-ok or malformed response.
    pub fn create(&self, data: Record) -> Result<Resource<K>, ResourceError> {
        let instance = Resource::<K>::empty(&self.client);
        instance.run_validation(&data)?;

        let response = self.client.post(&self.url(), Value::Object(data))?;
        let record = self
            .client
            .parser()
            .record(&response, &KindInfo::of::<K>())?;

        let created = Resource::with_data(&self.client, record);
        tracing::debug!("Created {}", created);
        Ok(created)
    }

    fn parse_many(
        &self,
        response: &crate::clients::HttpResponse,
    ) -> Result<Vec<Resource<K>>, ResourceError> {
        let records = self
            .client
            .parser()
            .records(response, &KindInfo::of::<K>())?;
        Ok(records
            .into_iter()
            .map(|record| Resource::with_data(&self.client, record))
            .collect())
    }
}

impl<K: ResourceKind> Clone for Collection<K> {
    fn clone(&self) -> Self {
        Self::new(&self.client)
    }
}

impl<K: ResourceKind> fmt::Debug for Collection<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &K::NAME)
            .field("url", &self.url())
            .finish()
    }
}
