// crates/request-gate-http/tests/validation.rs
// ============================================================================
// Module: Gate Validation E2E Tests
// Description: End-to-end scenarios through the public gate API.
// Purpose: Validate login and pagination flows with envelopes and throttling.
// Dependencies: request-gate-core, request-gate-http, serde_json
// ============================================================================

//! End-to-end validation gate scenarios using the public API surface.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::sync::Arc;

use request_gate_core::ApiError;
use request_gate_core::ClientOrigin;
use request_gate_core::EndpointPath;
use request_gate_core::ErrorCode;
use request_gate_core::FragmentKind;
use request_gate_core::FragmentSet;
use request_gate_core::Timestamp;
use request_gate_core::ValidationPipeline;
use request_gate_core::ValidationRateLimits;
use request_gate_core::ValidationStage;
use request_gate_http::JsonSchemaContract;
use request_gate_http::NoopAuditSink;
use request_gate_http::RequestGate;
use request_gate_http::failure_envelope;
use request_gate_http::success_envelope;
use serde_json::Value;
use serde_json::json;

/// Throttling policy: three failures within a minute block for five seconds.
fn limits() -> ValidationRateLimits {
    ValidationRateLimits {
        max_failures_per_minute: 3,
        max_failures_per_hour: 100,
        block_duration_ms: 5_000,
        clear_on_success: false,
        max_entries: 64,
    }
}

/// Builds the login body pipeline.
fn login_pipeline() -> ValidationPipeline {
    let schema = json!({
        "type": "object",
        "properties": {
            "email": { "type": "string", "pattern": "^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$" },
            "password": { "type": "string", "minLength": 8 }
        },
        "required": ["email", "password"]
    });
    let contract = Arc::new(JsonSchemaContract::build(schema).expect("schema compiles"));
    ValidationPipeline::new(vec![ValidationStage::new(FragmentKind::Body, contract)])
}

/// Builds the pagination query pipeline with defaults and coercion.
fn pagination_pipeline() -> ValidationPipeline {
    let schema = json!({
        "type": "object",
        "properties": {
            "page": { "type": "integer", "minimum": 1, "default": 1 },
            "limit": { "type": "integer", "minimum": 1, "maximum": 100, "default": 10 },
            "sort": { "type": "string", "enum": ["asc", "desc"], "default": "asc" }
        }
    });
    let contract = Arc::new(
        JsonSchemaContract::build(schema)
            .expect("schema compiles")
            .with_defaults()
            .with_scalar_coercion(),
    );
    ValidationPipeline::new(vec![ValidationStage::new(FragmentKind::Query, contract)])
}

/// Test origin.
fn origin() -> ClientOrigin {
    ClientOrigin::from_ip(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 14)))
}

/// Millisecond timestamp shorthand.
const fn at(millis: u64) -> Timestamp {
    Timestamp::from_unix_millis(millis)
}

#[test]
fn valid_login_flows_through_to_the_success_envelope() {
    let gate = RequestGate::new(limits(), 0, Arc::new(NoopAuditSink));
    let endpoint = EndpointPath::new("/login");
    let pipeline = login_pipeline();
    let fragments =
        FragmentSet::new().with_body(json!({ "email": "a@b.co", "password": "hunter22!" }));
    let data = gate
        .handle(&origin(), &endpoint, &pipeline, fragments, at(0), |coerced| {
            let email = coerced
                .body
                .as_ref()
                .and_then(|body| body.get("email"))
                .cloned()
                .unwrap_or(Value::Null);
            Ok(json!({ "session": "issued", "email": email }))
        })
        .expect("login succeeds");
    let envelope = success_envelope(data, &endpoint, at(0));
    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["data"]["email"], json!("a@b.co"));
    assert_eq!(envelope["data"]["session"], json!("issued"));
}

#[test]
fn invalid_login_renders_a_field_level_failure_envelope() {
    let gate = RequestGate::new(limits(), 0, Arc::new(NoopAuditSink));
    let endpoint = EndpointPath::new("/login");
    let pipeline = login_pipeline();
    let fragments =
        FragmentSet::new().with_body(json!({ "email": "not-an-email", "password": "pw" }));
    let error = gate
        .handle(&origin(), &endpoint, &pipeline, fragments, at(0), |_| Ok(Value::Null))
        .unwrap_err();
    let (status, envelope) = failure_envelope(&error, &endpoint, at(0));
    assert_eq!(status, 400);
    assert_eq!(envelope["error"]["code"], json!(1100));
    let details = envelope["error"]["details"].as_array().expect("details present");
    assert!(!details.is_empty());
    for violation in details {
        assert!(!violation["path"].as_str().unwrap_or_default().is_empty());
        assert!(!violation["message"].as_str().unwrap_or_default().is_empty());
    }
}

#[test]
fn pagination_defaults_fill_absent_query_parameters() {
    let gate = RequestGate::new(limits(), 0, Arc::new(NoopAuditSink));
    let endpoint = EndpointPath::new("/items");
    let pipeline = pagination_pipeline();
    let fragments = FragmentSet::new().with_query(json!({}));
    let coerced = gate
        .handle(&origin(), &endpoint, &pipeline, fragments, at(0), |coerced| {
            Ok(coerced.query.clone().unwrap_or(Value::Null))
        })
        .expect("pagination succeeds");
    assert_eq!(coerced, json!({ "page": 1, "limit": 10, "sort": "asc" }));
}

#[test]
fn pagination_query_strings_coerce_to_integers() {
    let gate = RequestGate::new(limits(), 0, Arc::new(NoopAuditSink));
    let endpoint = EndpointPath::new("/items");
    let pipeline = pagination_pipeline();
    let fragments = FragmentSet::new().with_query(json!({ "page": "3", "limit": "25" }));
    let coerced = gate
        .handle(&origin(), &endpoint, &pipeline, fragments, at(0), |coerced| {
            Ok(coerced.query.clone().unwrap_or(Value::Null))
        })
        .expect("pagination succeeds");
    assert_eq!(coerced, json!({ "page": 3, "limit": 25, "sort": "asc" }));
}

#[test]
fn out_of_range_pagination_values_fail_validation() {
    let gate = RequestGate::new(limits(), 0, Arc::new(NoopAuditSink));
    let endpoint = EndpointPath::new("/items");
    let pipeline = pagination_pipeline();
    let fragments = FragmentSet::new().with_query(json!({ "limit": "500" }));
    let error = gate
        .handle(&origin(), &endpoint, &pipeline, fragments, at(0), |_| Ok(Value::Null))
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ValidationError);
}

#[test]
fn fourth_failure_in_a_minute_is_rejected_with_retry_information() {
    let gate = RequestGate::new(limits(), 0, Arc::new(NoopAuditSink));
    let endpoint = EndpointPath::new("/login");
    let pipeline = login_pipeline();
    let bad = json!({ "email": "nope", "password": "pw" });
    for attempt in 0..3_u64 {
        let fragments = FragmentSet::new().with_body(bad.clone());
        let error = gate
            .handle(&origin(), &endpoint, &pipeline, fragments, at(attempt * 1_000), |_| {
                Ok(Value::Null)
            })
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::ValidationError);
    }

    // Even a well-formed request is rejected while the block holds.
    let good =
        FragmentSet::new().with_body(json!({ "email": "a@b.co", "password": "hunter22!" }));
    let error = gate
        .handle(&origin(), &endpoint, &pipeline, good, at(3_000), |_| Ok(Value::Null))
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::RateLimitExceeded);
    let (status, envelope) = failure_envelope(&error, &endpoint, at(3_000));
    assert_eq!(status, 429);
    assert_eq!(envelope["error"]["code"], json!(1001));
    assert_eq!(envelope["error"]["details"]["retry_after_ms"], json!(4_000));
}

#[test]
fn origin_recovers_after_the_block_duration() {
    let gate = RequestGate::new(limits(), 0, Arc::new(NoopAuditSink));
    let endpoint = EndpointPath::new("/login");
    let pipeline = login_pipeline();
    let bad = json!({ "email": "nope", "password": "pw" });
    for attempt in 0..3_u64 {
        let fragments = FragmentSet::new().with_body(bad.clone());
        let _ = gate
            .handle(&origin(), &endpoint, &pipeline, fragments, at(attempt * 1_000), |_| {
                Ok(Value::Null)
            })
            .unwrap_err();
    }

    // Block started at 2_000 and lasts 5_000ms; at 7_200 it has expired.
    let good =
        FragmentSet::new().with_body(json!({ "email": "a@b.co", "password": "hunter22!" }));
    let data = gate
        .handle(&origin(), &endpoint, &pipeline, good, at(7_200), |_| Ok(json!({ "ok": true })))
        .expect("request allowed after block expiry");
    assert_eq!(data, json!({ "ok": true }));
}

#[test]
fn memoization_serves_repeated_identical_payloads() {
    let gate = RequestGate::new(limits(), 64, Arc::new(NoopAuditSink));
    let endpoint = EndpointPath::new("/login");
    let pipeline = login_pipeline();
    let payload = json!({ "email": "a@b.co", "password": "hunter22!" });
    for _ in 0..5 {
        let fragments = FragmentSet::new().with_body(payload.clone());
        let _ = gate
            .handle(&origin(), &endpoint, &pipeline, fragments, at(0), |_| Ok(Value::Null))
            .expect("login succeeds");
    }
    let stats = gate.memo().snapshot();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 4);
    assert_eq!(stats.keys, 1);
}

#[test]
fn unknown_faults_coerce_to_the_generic_envelope() {
    let endpoint = EndpointPath::new("/login");
    let error = ApiError::unknown("downstream exploded");
    let (status, envelope) = failure_envelope(&error, &endpoint, at(0));
    assert_eq!(status, 500);
    assert_eq!(envelope["error"]["code"], json!(1999));
    assert_eq!(envelope["error"]["message"], json!("internal error"));
    assert!(envelope["error"].get("details").is_none());
}
