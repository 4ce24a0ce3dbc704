// crates/request-gate-http/src/server/tests.rs
// ============================================================================
// Module: Gate Server Tests
// Description: Unit tests for fragment extraction and request handling.
// Purpose: Validate the boundary plumbing without a live listener.
// Dependencies: request-gate-core, axum, serde_json
// ============================================================================

//! ## Overview
//! Exercises the request path by invoking the handler plumbing directly:
//! query parsing, origin derivation, fragment extraction with the body-size
//! precheck, and the full guard/pipeline/render sequence.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use request_gate_core::ApiError;
use request_gate_core::EndpointPath;
use request_gate_core::ErrorCode;
use request_gate_core::FragmentKind;
use request_gate_core::FragmentSet;
use request_gate_core::ValidationPipeline;
use request_gate_core::ValidationRateLimits;
use request_gate_core::ValidationStage;
use serde_json::Value;
use serde_json::json;

use super::EndpointState;
use super::GateHandler;
use super::GateServerError;
use super::build_fragments;
use super::handle_endpoint;
use super::method_filter;
use super::parse_query;
use super::request_origin;
use crate::audit::NoopAuditSink;
use crate::gate::RequestGate;
use crate::schema::JsonSchemaContract;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Handler echoing the validated body fragment.
struct EchoHandler;

impl GateHandler for EchoHandler {
    fn handle(&self, fragments: &FragmentSet) -> Result<Value, ApiError> {
        Ok(fragments.body.clone().unwrap_or(Value::Null))
    }
}

/// Throttling policy used across tests: 3 failures per minute block.
fn limits() -> ValidationRateLimits {
    ValidationRateLimits {
        max_failures_per_minute: 3,
        max_failures_per_hour: 100,
        block_duration_ms: 60_000,
        clear_on_success: false,
        max_entries: 16,
    }
}

/// Builds endpoint state for a login route with a body schema.
fn login_state() -> EndpointState {
    let schema = json!({
        "type": "object",
        "properties": {
            "email": { "type": "string", "pattern": "^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$" },
            "password": { "type": "string", "minLength": 8 }
        },
        "required": ["email", "password"]
    });
    let contract = Arc::new(JsonSchemaContract::build(schema).expect("schema compiles"));
    let stage = ValidationStage::new(FragmentKind::Body, contract);
    EndpointState {
        gate: Arc::new(RequestGate::new(limits(), 0, Arc::new(NoopAuditSink))),
        pipeline: ValidationPipeline::new(vec![stage]),
        handler: Arc::new(EchoHandler),
        endpoint: EndpointPath::new("/login"),
        max_body_bytes: 4_096,
    }
}

/// Loopback peer address.
fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 4_000))
}

/// Invokes the handler plumbing with body bytes only.
fn post_body(state: &EndpointState, headers: &HeaderMap, body: &[u8]) -> (StatusCode, Value) {
    handle_endpoint(state, peer(), &HashMap::new(), None, headers, body)
}

// ============================================================================
// SECTION: Extraction Tests
// ============================================================================

#[test]
fn query_strings_parse_into_objects_with_last_value_winning() {
    let parsed = parse_query("page=2&sort=desc&page=3");
    assert_eq!(parsed, json!({ "page": "3", "sort": "desc" }));
}

#[test]
fn query_values_are_percent_decoded() {
    let parsed = parse_query("name=J%C3%BCrgen&tag=a%20b");
    assert_eq!(parsed, json!({ "name": "J\u{fc}rgen", "tag": "a b" }));
}

#[test]
fn origin_combines_peer_ip_and_identity_header() {
    let mut headers = HeaderMap::new();
    headers.insert("x-user-id", HeaderValue::from_static("alice"));
    let origin = request_origin(peer(), &headers);
    assert_eq!(origin.ip, Some(peer().ip()));
    assert_eq!(origin.user_id.as_deref(), Some("alice"));

    let origin = request_origin(peer(), &HeaderMap::new());
    assert_eq!(origin.user_id, None);
}

#[test]
fn fragments_always_carry_a_query_object() {
    let fragments = build_fragments(1_024, &HashMap::new(), None, b"").expect("extraction");
    assert_eq!(fragments.body, None);
    assert_eq!(fragments.query, Some(json!({})));
    assert_eq!(fragments.params, None);
}

#[test]
fn path_parameters_become_a_params_fragment() {
    let mut params = HashMap::new();
    params.insert("id".to_string(), "42".to_string());
    let fragments = build_fragments(1_024, &params, None, b"").expect("extraction");
    assert_eq!(fragments.params, Some(json!({ "id": "42" })));
}

#[test]
fn malformed_body_json_is_a_validation_error() {
    let error = build_fragments(1_024, &HashMap::new(), None, b"{not json").unwrap_err();
    assert_eq!(error.code, ErrorCode::ValidationError);
    assert_eq!(error.details.unwrap()[0]["path"], json!("body"));
}

#[test]
fn oversized_body_is_rejected_before_parsing() {
    let body = vec![b'x'; 2_048];
    let error = build_fragments(1_024, &HashMap::new(), None, &body).unwrap_err();
    assert_eq!(error.code, ErrorCode::ValidationSizeExceeded);
}

#[test]
fn unsupported_methods_are_rejected_at_registration() {
    assert!(method_filter(&Method::GET).is_ok());
    assert!(method_filter(&Method::POST).is_ok());
    assert!(matches!(method_filter(&Method::TRACE), Err(GateServerError::Route(_))));
}

// ============================================================================
// SECTION: Request Flow Tests
// ============================================================================

#[test]
fn valid_login_body_returns_the_success_envelope() {
    let state = login_state();
    let body = br#"{"email":"a@b.co","password":"hunter22!"}"#;
    let (status, payload) = post_body(&state, &HeaderMap::new(), body);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["data"]["email"], json!("a@b.co"));
    assert_eq!(payload["endpoint"], json!("/login"));
}

#[test]
fn invalid_login_body_returns_the_failure_envelope() {
    let state = login_state();
    let body = br#"{"email":"nope","password":"short"}"#;
    let (status, payload) = post_body(&state, &HeaderMap::new(), body);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["error"]["code"], json!(1100));
    assert!(payload["error"]["details"].as_array().is_some_and(|list| !list.is_empty()));
}

#[test]
fn repeated_failures_block_the_origin_with_429() {
    let state = login_state();
    let body = br#"{"email":"nope","password":"short"}"#;
    for _ in 0..3 {
        let (status, _) = post_body(&state, &HeaderMap::new(), body);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let valid = br#"{"email":"a@b.co","password":"hunter22!"}"#;
    let (status, payload) = post_body(&state, &HeaderMap::new(), valid);
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(payload["error"]["code"], json!(1001));
    assert!(payload["error"]["details"]["retry_after_ms"].is_u64());
}

#[test]
fn identity_header_separates_tracking_keys() {
    let state = login_state();
    let bad = br#"{"email":"nope","password":"short"}"#;
    let mut alice = HeaderMap::new();
    alice.insert("x-user-id", HeaderValue::from_static("alice"));
    for _ in 0..3 {
        let (status, _) = post_body(&state, &alice, bad);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let (status, _) = post_body(&state, &alice, bad);
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Same peer, different identity: not blocked.
    let mut bob = HeaderMap::new();
    bob.insert("x-user-id", HeaderValue::from_static("bob"));
    let valid = br#"{"email":"a@b.co","password":"hunter22!"}"#;
    let (status, payload) = post_body(&state, &bob, valid);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));
}

#[test]
fn malformed_body_feeds_the_failure_tracker() {
    let state = login_state();
    for _ in 0..3 {
        let (status, _) = post_body(&state, &HeaderMap::new(), b"{broken");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let (status, payload) = post_body(&state, &HeaderMap::new(), b"{broken");
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(payload["error"]["code"], json!(1001));
}
