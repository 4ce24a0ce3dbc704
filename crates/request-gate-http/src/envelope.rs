// crates/request-gate-http/src/envelope.rs
// ============================================================================
// Module: Response Envelopes
// Description: Uniform success and failure response rendering.
// Purpose: Give every endpoint one response shape regardless of failure source.
// Dependencies: request-gate-core, serde_json
// ============================================================================

//! ## Overview
//! Every response leaves the gate in one of two envelopes: success wraps the
//! handler's data, failure wraps the taxonomy error. The failure envelope
//! carries only client-safe content: caller-caused faults keep their message
//! and detail payload, system-caused faults are reduced to the code plus a
//! generic message. The boundary attaches the endpoint path and the request
//! timestamp to both shapes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use request_gate_core::ApiError;
use request_gate_core::EndpointPath;
use request_gate_core::Timestamp;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the success envelope for handler data.
#[must_use]
pub fn success_envelope(data: Value, endpoint: &EndpointPath, now: Timestamp) -> Value {
    json!({
        "success": true,
        "data": data,
        "endpoint": endpoint.as_str(),
        "timestamp": now.as_unix_millis(),
    })
}

/// Renders the failure envelope and HTTP status for a taxonomy error.
///
/// The status is taken from the error but clamped to the 400..=599 range;
/// anything outside falls back to the code's default status so a bad
/// override can never turn a failure into a success response.
#[must_use]
pub fn failure_envelope(error: &ApiError, endpoint: &EndpointPath, now: Timestamp) -> (u16, Value) {
    let status = if (400..=599).contains(&error.status) {
        error.status
    } else {
        error.code.default_status()
    };
    let mut payload = json!({
        "code": error.code.value(),
        "message": error.client_message(),
    });
    if let Some(details) = error.client_details()
        && let Some(object) = payload.as_object_mut()
    {
        object.insert("details".to_string(), details.clone());
    }
    let envelope = json!({
        "success": false,
        "error": payload,
        "endpoint": endpoint.as_str(),
        "timestamp": now.as_unix_millis(),
    });
    (status, envelope)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
