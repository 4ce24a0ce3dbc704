// crates/request-gate-http/src/audit.rs
// ============================================================================
// Module: Gate Audit
// Description: Audit event model and sinks for gate decisions.
// Purpose: Record operator-facing gate activity without leaking to clients.
// Dependencies: request-gate-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every gate decision can be recorded as a structured audit event: requests
//! allowed through, validation rejections, block transitions, rejected
//! blocked origins, and system faults. Events are JSON lines. Redaction
//! rule: violation details never appear in audit output; only the taxonomy
//! code, status, and (for system faults) the operator-facing message do.
//! Sinks must never fail the request path; write errors are swallowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use request_gate_core::ApiError;
use request_gate_core::ClientOrigin;
use request_gate_core::EndpointPath;
use request_gate_core::Timestamp;
use serde::Serialize;

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// One gate decision recorded for operators.
///
/// # Invariants
/// - `decision` is one of `allow`, `reject`, `block`, `blocked_reject`,
///   `fault`; labels are stable for log tooling.
/// - Violation detail payloads are never included.
#[derive(Debug, Serialize)]
pub struct GateAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Decision outcome label.
    decision: &'static str,
    /// Endpoint path template.
    endpoint: String,
    /// Client origin label.
    origin: String,
    /// Taxonomy code for failure decisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u16>,
    /// HTTP status for failure decisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    /// Retry hint for blocked rejections, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_ms: Option<u64>,
    /// Operator-facing detail for system faults.
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    /// Event timestamp in unix milliseconds.
    timestamp: u64,
}

impl GateAuditEvent {
    /// Builds the common event frame.
    fn frame(
        decision: &'static str,
        origin: &ClientOrigin,
        endpoint: &EndpointPath,
        now: Timestamp,
    ) -> Self {
        Self {
            event: "gate_request",
            decision,
            endpoint: endpoint.to_string(),
            origin: origin.to_string(),
            code: None,
            status: None,
            retry_after_ms: None,
            detail: None,
            timestamp: now.as_unix_millis(),
        }
    }

    /// Builds an allow event for a request that passed the gate.
    #[must_use]
    pub fn allowed(origin: &ClientOrigin, endpoint: &EndpointPath, now: Timestamp) -> Self {
        Self::frame("allow", origin, endpoint, now)
    }

    /// Builds a reject event for a caller-caused failure.
    ///
    /// Only the code and status are recorded; violation details stay out of
    /// audit output.
    #[must_use]
    pub fn rejected(
        origin: &ClientOrigin,
        endpoint: &EndpointPath,
        error: &ApiError,
        now: Timestamp,
    ) -> Self {
        let mut event = Self::frame("reject", origin, endpoint, now);
        event.code = Some(error.code.value());
        event.status = Some(error.status);
        event
    }

    /// Builds a block event for a `Tracking -> Blocked` transition.
    #[must_use]
    pub fn blocked(origin: &ClientOrigin, endpoint: &EndpointPath, now: Timestamp) -> Self {
        Self::frame("block", origin, endpoint, now)
    }

    /// Builds a rejection event for a request from a blocked origin.
    #[must_use]
    pub fn blocked_rejection(
        origin: &ClientOrigin,
        endpoint: &EndpointPath,
        retry_after_ms: u64,
        now: Timestamp,
    ) -> Self {
        let mut event = Self::frame("blocked_reject", origin, endpoint, now);
        event.code = Some(request_gate_core::ErrorCode::RateLimitExceeded.value());
        event.status = Some(429);
        event.retry_after_ms = Some(retry_after_ms);
        event
    }

    /// Builds a fault event for a system-caused failure.
    ///
    /// The raw internal message is preserved here and only here; clients see
    /// the generic message.
    #[must_use]
    pub fn system_fault(
        origin: &ClientOrigin,
        endpoint: &EndpointPath,
        error: &ApiError,
        now: Timestamp,
    ) -> Self {
        let mut event = Self::frame("fault", origin, endpoint, now);
        event.code = Some(error.code.value());
        event.status = Some(error.status);
        event.detail = Some(error.message.clone());
        event
    }

    /// Returns the decision label.
    #[must_use]
    pub const fn decision(&self) -> &'static str {
        self.decision
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for gate decisions.
pub trait GateAuditSink: Send + Sync {
    /// Records one gate audit event.
    fn record(&self, event: &GateAuditEvent);
}

/// Shared handle to an audit sink.
pub type SharedAuditSink = Arc<dyn GateAuditSink>;

/// No-op audit sink for tests and embedded use.
pub struct NoopAuditSink;

impl GateAuditSink for NoopAuditSink {
    fn record(&self, _event: &GateAuditEvent) {}
}

/// Audit sink that writes JSON lines to stderr.
pub struct StderrAuditSink;

impl GateAuditSink for StderrAuditSink {
    fn record(&self, event: &GateAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// Append-mode file handle.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens (or creates) the audit file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl GateAuditSink for FileAuditSink {
    fn record(&self, event: &GateAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut file = self.file.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let _ = writeln!(file, "{payload}");
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
