//! Integration tests for lazy loading and reloading of top-level resources.
//!
//! These tests verify when field access fetches, that a reload keeps the
//! caller's instance, and how failed reloads and deletes are reported.

mod common;

use chrono::Duration;
use common::{client, record, Item, RecordingTransport, ShortLivedItem, SpecialItem};
use drf_client::clients::HttpMethod;
use drf_client::rest::{Clock, ManualClock, Resource, ResourceError, ResourceId};
use serde_json::json;

// ============================================================================
// Staleness Tests
// ============================================================================

#[test]
fn test_first_access_fetches_the_instance_url() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond_record(json!({"id": 1, "name": "Widget"}));

    let item = Resource::<Item>::new(&client, 1);
    assert_eq!(transport.request_count(), 0);

    assert_eq!(item.value("name").unwrap(), json!("Widget"));

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, "http://0.0.0.0:8000/items/1");
}

#[test]
fn test_fresh_data_is_served_from_cache() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond_record(json!({"id": 1, "name": "Widget"}));

    let item = Resource::<Item>::new(&client, 1);
    item.value("name").unwrap();
    item.value("name").unwrap();

    clock.advance(Duration::seconds(120));
    item.value("name").unwrap();

    assert_eq!(transport.request_count(), 1);
}

#[test]
fn test_stale_access_reloads_exactly_once() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport
        .respond_record(json!({"id": 1, "name": "Widget"}))
        .respond_record(json!({"id": 1, "name": "Gadget"}));

    let item = Resource::<Item>::new(&client, 1);
    assert_eq!(item.value("name").unwrap(), json!("Widget"));

    clock.advance(Duration::seconds(121));
    assert!(item.is_stale());

    assert_eq!(item.value("name").unwrap(), json!("Gadget"));
    assert_eq!(item.value("name").unwrap(), json!("Gadget"));
    assert_eq!(transport.request_count(), 2);
    assert_eq!(item.last_loaded(), Some(clock.now()));
}

#[test]
fn test_expiration_window_is_per_kind() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond_record(json!({"id": 1, "name": "Gadget"}));

    let short =
        Resource::<ShortLivedItem>::with_data(&client, record(json!({"id": 1, "name": "Widget"})));
    let long = Resource::<Item>::with_data(&client, record(json!({"id": 1, "name": "Widget"})));

    clock.advance(Duration::seconds(4));
    assert!(!short.is_stale());
    assert_eq!(short.value("name").unwrap(), json!("Widget"));
    assert_eq!(transport.request_count(), 0);

    clock.advance(Duration::seconds(2));
    assert!(short.is_stale());
    assert!(!long.is_stale());
    assert_eq!(short.value("name").unwrap(), json!("Gadget"));
    assert_eq!(long.value("name").unwrap(), json!("Widget"));
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn test_resource_built_from_data_does_not_fetch() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);

    let item = Resource::<Item>::with_data(&client, record(json!({"id": 7, "name": "Widget"})));

    assert_eq!(item.id(), Some(ResourceId::Int(7)));
    assert_eq!(item.value("name").unwrap(), json!("Widget"));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_clearing_data_forces_a_reload() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond_record(json!({"id": 7, "name": "Reloaded"}));

    let item = Resource::<Item>::with_data(&client, record(json!({"id": 7, "name": "Widget"})));
    item.set_raw_data(None);
    assert_eq!(item.last_loaded(), None);
    assert_eq!(item.id(), Some(ResourceId::Int(7)));

    assert_eq!(item.value("name").unwrap(), json!("Reloaded"));
    assert_eq!(transport.request_count(), 1);
}

// ============================================================================
// Reload Tests
// ============================================================================

#[test]
fn test_reload_keeps_every_handle_on_the_same_instance() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond_record(json!({"id": 1, "name": "Gadget"}));

    let item = Resource::<Item>::with_data(&client, record(json!({"id": 1, "name": "Widget"})));
    let alias = item.clone();

    item.reload().unwrap();

    assert!(alias.ptr_eq(&item));
    assert_eq!(alias.value("name").unwrap(), json!("Gadget"));
}

#[test]
fn test_reload_rejects_a_different_object() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond_record(json!({"id": 2, "name": "Imposter"}));

    let item = Resource::<Item>::with_data(&client, record(json!({"id": 1, "name": "Widget"})));
    let error = item.reload().unwrap_err();

    assert!(error.is_lookup());
    assert_eq!(error.to_string(), "Did not find data for Item(id=1)");
    assert_eq!(item.value("name").unwrap(), json!("Widget"));
}

#[test]
fn test_reload_rejects_a_record_without_id() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond_record(json!({"name": "Imposter"}));

    let item = Resource::<Item>::new(&client, 1);
    let error = item.reload().unwrap_err();

    assert!(matches!(
        &error,
        ResourceError::DataNotFound { resource } if resource == "Item(id=1)"
    ));
    assert!(item.raw_data().is_none());
    assert_eq!(item.id(), Some(ResourceId::Int(1)));
}

#[test]
fn test_fetch_data_does_not_cache() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond_record(json!({"id": 1, "name": "Gadget"}));

    let item = Resource::<Item>::with_data(&client, record(json!({"id": 1, "name": "Widget"})));
    let fetched = item.fetch_data().unwrap();

    assert_eq!(fetched["name"], json!("Gadget"));
    assert_eq!(item.value("name").unwrap(), json!("Widget"));
}

#[test]
fn test_failed_load_surfaces_the_api_error() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(404, json!({"detail": "Not found."}));

    let item = Resource::<Item>::new(&client, 1);
    let error = item.value("name").unwrap_err();

    assert!(error.is_api());
    assert_eq!(error.response().map(|r| r.code), Some(404));
    assert!(error.to_string().starts_with("Unable to parse Item. Response: "));
}

#[test]
fn test_missing_key_names_available_fields() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);

    let item = Resource::<Item>::with_data(&client, record(json!({"id": 1, "name": "Widget"})));
    let error = item.datetime("created").unwrap_err();

    assert!(matches!(error, ResourceError::MissingField { .. }));
    assert!(error.to_string().contains("Available fields: id, name"));
}

// ============================================================================
// Equality Tests
// ============================================================================

#[test]
fn test_equality_is_by_kind_and_id() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);

    let a = Resource::<Item>::new(&client, 1);
    let b = Resource::<Item>::with_data(&client, record(json!({"id": 1, "name": "Widget"})));
    let c = Resource::<Item>::new(&client, 2);
    let special = Resource::<SpecialItem>::new(&client, 1);

    assert!(a == b);
    assert!(a != c);
    assert!(a != special);
    assert!(special != a);
    assert_eq!(transport.request_count(), 0);
}

// ============================================================================
// Delete Tests
// ============================================================================

#[test]
fn test_delete_issues_delete_on_the_instance_url() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(204, json!(null));

    let item = Resource::<Item>::new(&client, 3);
    item.delete().unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, HttpMethod::Delete);
    assert_eq!(request.url, "http://0.0.0.0:8000/items/3");
}

#[test]
fn test_failed_delete_carries_the_response() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);
    transport.respond(403, json!({"detail": "Forbidden"}));

    let item = Resource::<Item>::new(&client, 3);
    let error = item.delete().unwrap_err();

    assert!(error.to_string().contains("Could not delete Item(id=3)"));
    assert!(error.to_string().contains("Forbidden"));
    assert_eq!(error.response().map(|r| r.code), Some(403));
}

#[test]
fn test_delete_without_id_is_rejected_before_any_request() {
    let transport = RecordingTransport::new();
    let clock = ManualClock::new();
    let client = client(&transport, &clock);

    let item = Resource::<Item>::empty(&client);
    assert!(matches!(
        item.delete(),
        Err(ResourceError::MissingId { resource: "Item" })
    ));
    assert_eq!(transport.request_count(), 0);
}
