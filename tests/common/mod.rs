//! Shared fixtures for the integration tests: a scripted transport and a
//! small set of resource kinds.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use drf_client::clients::{HttpError, HttpRequest, HttpResponse, Transport};
use drf_client::rest::{Field, FieldSetBuilder, ManualClock, Record, ResourceError, ResourceKind};
use drf_client::{ClientConfig, RestClient};
use serde_json::{json, Value};

#[derive(Default)]
struct Script {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// A transport that answers from a queue and records every request.
///
/// Clones share the queue and the log. An exhausted queue answers 500.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    script: Rc<RefCell<Script>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON response.
    pub fn respond(&self, code: u16, body: Value) -> &Self {
        self.respond_with(HttpResponse::json(code, body))
    }

    /// Queues a prepared response.
    pub fn respond_with(&self, response: HttpResponse) -> &Self {
        self.script.borrow_mut().responses.push_back(response);
        self
    }

    /// Queues `{"results": [record]}`.
    pub fn respond_record(&self, record: Value) -> &Self {
        self.respond(200, json!({ "results": [record] }))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.borrow().requests.len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.script.borrow().requests.last().cloned()
    }
}

impl Transport for RecordingTransport {
    fn issue(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut script = self.script.borrow_mut();
        script.requests.push(request.clone());
        Ok(script
            .responses
            .pop_front()
            .unwrap_or_else(|| HttpResponse::json(500, json!({"detail": "no scripted response"}))))
    }
}

/// A client on the default configuration, wired to `transport` and `clock`.
pub fn client(transport: &RecordingTransport, clock: &ManualClock) -> RestClient {
    RestClient::builder(ClientConfig::default())
        .transport(transport.clone())
        .clock(clock.clone())
        .build()
        .unwrap()
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub struct Person;

impl ResourceKind for Person {
    const NAME: &'static str = "Person";
    const ROUTE: &'static str = "people";

    fn declare_fields(fields: &mut FieldSetBuilder) {
        fields.insert("name", Field::plain());
    }
}

pub struct Part;

impl ResourceKind for Part {
    const NAME: &'static str = "Part";
    const ROUTE: &'static str = "parts";

    fn declare_fields(fields: &mut FieldSetBuilder) {
        fields
            .insert("name", Field::plain())
            .insert("supplier", Field::embedded::<Person>());
    }
}

pub struct Item;

impl ResourceKind for Item {
    const NAME: &'static str = "Item";
    const ROUTE: &'static str = "items";

    fn declare_fields(fields: &mut FieldSetBuilder) {
        fields
            .insert("name", Field::plain().required())
            .insert("created", Field::datetime())
            .insert("owner_link", Field::link())
            .insert("owner", Field::embedded::<Person>())
            .insert("parts", Field::many::<Part>());
    }

    fn validate_field(name: &str, value: Option<&Value>) -> Result<(), ResourceError> {
        if name == "name" && value.and_then(Value::as_str).is_some_and(|s| s.len() > 20) {
            return Err(ResourceError::validation("name is too long"));
        }
        Ok(())
    }
}

/// An item kind whose cached data expires after five seconds.
pub struct ShortLivedItem;

impl ResourceKind for ShortLivedItem {
    const NAME: &'static str = "ShortLivedItem";
    const ROUTE: &'static str = "items";
    const DATA_EXPIRATION: Duration = Duration::from_secs(5);

    fn declare_fields(fields: &mut FieldSetBuilder) {
        Item::declare_fields(fields);
    }
}

/// An item kind with extra fields, sharing the item route.
pub struct SpecialItem;

impl ResourceKind for SpecialItem {
    const NAME: &'static str = "SpecialItem";
    const ROUTE: &'static str = "items";

    fn declare_fields(fields: &mut FieldSetBuilder) {
        Item::declare_fields(fields);
        fields.insert("grade", Field::plain());
    }

    fn validate(data: &Record) -> Result<(), ResourceError> {
        if data.get("grade").is_none() {
            return Err(ResourceError::validation("A special item needs a grade"));
        }
        Ok(())
    }
}
