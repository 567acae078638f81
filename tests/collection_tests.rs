//! Integration tests for collection listing and creation.
//!
//! These tests verify pagination parameters, result parsing with both
//! parsers, and validation before creation.

mod common;

use common::{client, record, Item, RecordingTransport, SpecialItem};
use drf_client::clients::HttpMethod;
use drf_client::rest::{GetParams, ManualClock, NamedResultsParser, Resource, ResourceId};
use drf_client::{ClientConfig, RestClient};
use serde_json::json;

// ============================================================================
// Listing Tests
// ============================================================================

#[test]
fn test_get_returns_one_resource_per_record() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(200, json!({"results": [{"id": 1, "name": "x"}]}));

    let items = Resource::<Item>::get(&client, GetParams::new().limit(25)).unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id(), Some(ResourceId::Int(1)));
    assert_eq!(items[0].value("name").unwrap(), json!("x"));
    assert_eq!(transport.request_count(), 1);

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, "http://0.0.0.0:8000/items");
    assert_eq!(request.param_value("limit"), Some("25"));
    assert_eq!(request.param_value("offset"), Some("0"));
}

#[test]
fn test_get_clamps_pagination() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport
        .respond(200, json!({"results": [{"id": 1}]}))
        .respond(200, json!({"results": [{"id": 1}]}));

    client
        .collection::<Item>()
        .get(GetParams::new().limit(-5).offset(-5))
        .unwrap();
    client
        .collection::<Item>()
        .get(GetParams::new().limit(510))
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].param_value("limit"), Some("0"));
    assert_eq!(requests[0].param_value("offset"), Some("0"));
    assert_eq!(requests[1].param_value("limit"), Some("500"));
}

#[test]
fn test_get_uses_configured_limits() {
    let transport = RecordingTransport::new();
    let config = ClientConfig::builder()
        .max_pagination_limit(50)
        .default_limit(10)
        .build()
        .unwrap();
    let client = RestClient::builder(config)
        .transport(transport.clone())
        .build()
        .unwrap();
    transport
        .respond(200, json!({"results": [{"id": 1}]}))
        .respond(200, json!({"results": [{"id": 1}]}));

    client.collection::<Item>().get(GetParams::new()).unwrap();
    client
        .collection::<Item>()
        .get(GetParams::new().limit(100))
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].param_value("limit"), Some("10"));
    assert_eq!(requests[1].param_value("limit"), Some("50"));
}

#[test]
fn test_get_passes_sort_and_filters() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(200, json!({"results": [{"id": 1}]}));

    client
        .collection::<Item>()
        .get(GetParams::new().sort("name").filter("owner", "7"))
        .unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.param_value("sort"), Some("+name"));
    assert_eq!(request.param_value("owner"), Some("7"));
}

#[test]
fn test_empty_page_is_an_error() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(200, json!({"results": []}));

    let error = Resource::<Item>::get(&client, GetParams::new()).unwrap_err();
    assert!(error.is_api());
    assert!(error.to_string().starts_with("No Item found"));
}

#[test]
fn test_get_by_ids_joins_ids() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(200, json!({"results": [{"id": 1}, {"id": 2}]}));

    let items = client
        .collection::<Item>()
        .get_by_ids(&[ResourceId::from(1), ResourceId::from(2)])
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(
        transport.last_request().unwrap().url,
        "http://0.0.0.0:8000/items/1,2"
    );

    assert!(client.collection::<Item>().get_by_ids(&[]).unwrap().is_empty());
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn test_named_results_parser() {
    let transport = RecordingTransport::new();
    let client = RestClient::builder(ClientConfig::default())
        .transport(transport.clone())
        .parser(NamedResultsParser)
        .build()
        .unwrap();
    transport.respond(200, json!({"results": {"items": [{"id": 4, "name": "y"}]}}));

    let items = Resource::<Item>::get(&client, GetParams::new()).unwrap();
    assert_eq!(items[0].value("name").unwrap(), json!("y"));
}

// ============================================================================
// Creation Tests
// ============================================================================

#[test]
fn test_create_posts_validated_data() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(201, json!({"results": [{"id": 11, "name": "Widget"}]}));

    let created =
        Resource::<Item>::create(&client, record(json!({"name": "Widget"}))).unwrap();

    assert_eq!(created.id(), Some(ResourceId::Int(11)));
    assert_eq!(created.value("name").unwrap(), json!("Widget"));

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, "http://0.0.0.0:8000/items");
    assert_eq!(request.body, Some(json!({"name": "Widget"})));
}

#[test]
fn test_create_rejects_missing_required_field_without_request() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);

    let error = Resource::<Item>::create(&client, record(json!({"name": ""}))).unwrap_err();

    assert!(error.is_validation());
    assert_eq!(error.to_string(), "No value provided for 'name'");
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_create_runs_field_and_record_validators() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);

    let too_long = Resource::<Item>::create(
        &client,
        record(json!({"name": "a name that is far too long"})),
    )
    .unwrap_err();
    assert_eq!(too_long.to_string(), "name is too long");

    let ungraded =
        Resource::<SpecialItem>::create(&client, record(json!({"name": "Widget"}))).unwrap_err();
    assert_eq!(ungraded.to_string(), "A special item needs a grade");
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_failed_create_carries_the_response() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(400, json!({"name": ["This field is required."]}));

    let error = Resource::<Item>::create(&client, record(json!({"name": "Widget"}))).unwrap_err();

    assert!(error.is_api());
    assert_eq!(error.response().map(|r| r.code), Some(400));
    assert!(error.to_string().contains("This field is required."));
}
