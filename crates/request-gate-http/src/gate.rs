// crates/request-gate-http/src/gate.rs
// ============================================================================
// Module: Request Gate Orchestrator
// Description: Guard check, pipeline execution, and failure bookkeeping.
// Purpose: Run one request through the full gate with uniform accounting.
// Dependencies: request-gate-core, request-gate-config
// ============================================================================

//! ## Overview
//! [`RequestGate`] owns the long-lived gate state: the per-origin failure
//! tracker and the memoized-outcome store. One call to [`RequestGate::handle`]
//! runs the full sequence for a request: abuse-guard check first (blocked
//! origins never reach schema evaluation), then the validation pipeline and
//! handler, then failure or success bookkeeping. Every decision is audited.
//!
//! Validation failures feed the tracker; system faults and authentication
//! failures do not: an origin is throttled for sending invalid payloads,
//! never for the gate's own faults. Timestamps are supplied by the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use request_gate_config::RequestGateConfig;
use request_gate_core::ApiError;
use request_gate_core::ClientOrigin;
use request_gate_core::EndpointPath;
use request_gate_core::FailureTracker;
use request_gate_core::FragmentSet;
use request_gate_core::GateDecision;
use request_gate_core::OutcomeMemo;
use request_gate_core::Timestamp;
use request_gate_core::ValidationPipeline;
use request_gate_core::ValidationRateLimits;
use serde_json::Value;

use crate::audit::GateAuditEvent;
use crate::audit::SharedAuditSink;

// ============================================================================
// SECTION: Request Gate
// ============================================================================

/// Long-lived gate state shared across requests.
///
/// # Invariants
/// - Constructed once and shared behind an `Arc`; per-request state never
///   lives here.
/// - The guard runs before any schema evaluation for every request.
pub struct RequestGate {
    /// Per-(origin, endpoint) failure tracker.
    tracker: FailureTracker,
    /// Memoized validation outcomes and attempt counters.
    memo: OutcomeMemo,
    /// Audit sink for gate decisions.
    audit: SharedAuditSink,
}

impl RequestGate {
    /// Creates a gate with an explicit policy and memo capacity.
    #[must_use]
    pub fn new(limits: ValidationRateLimits, memo_capacity: usize, audit: SharedAuditSink) -> Self {
        Self {
            tracker: FailureTracker::new(limits),
            memo: OutcomeMemo::new(memo_capacity),
            audit,
        }
    }

    /// Creates a gate from validated configuration.
    #[must_use]
    pub fn from_config(config: &RequestGateConfig, audit: SharedAuditSink) -> Self {
        Self::new(config.rate_limits.to_limits(), config.validation.memo_capacity, audit)
    }

    /// Returns the failure tracker.
    #[must_use]
    pub const fn tracker(&self) -> &FailureTracker {
        &self.tracker
    }

    /// Returns the memoized-outcome store.
    #[must_use]
    pub const fn memo(&self) -> &OutcomeMemo {
        &self.memo
    }

    /// Checks the abuse guard for one request.
    ///
    /// Must run before any parsing or schema evaluation so blocked origins
    /// spend no validation cost.
    ///
    /// # Errors
    ///
    /// Returns a `RATE_LIMIT_EXCEEDED` [`ApiError`] carrying retry
    /// information when the origin is blocked for this endpoint.
    pub fn guard(
        &self,
        origin: &ClientOrigin,
        endpoint: &EndpointPath,
        now: Timestamp,
    ) -> Result<(), ApiError> {
        match self.tracker.check(origin, endpoint, now) {
            GateDecision::Allow => Ok(()),
            GateDecision::Blocked {
                retry_after_ms,
            } => {
                self.audit.record(&GateAuditEvent::blocked_rejection(
                    origin,
                    endpoint,
                    retry_after_ms,
                    now,
                ));
                Err(ApiError::rate_limited(retry_after_ms))
            }
        }
    }

    /// Runs one request through guard, pipeline, and bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns the guard rejection, the first failing stage's error, or the
    /// handler's own error, with tracker and audit bookkeeping applied.
    pub fn handle<H>(
        &self,
        origin: &ClientOrigin,
        endpoint: &EndpointPath,
        pipeline: &ValidationPipeline,
        fragments: FragmentSet,
        now: Timestamp,
        handler: H,
    ) -> Result<Value, ApiError>
    where
        H: FnOnce(&FragmentSet) -> Result<Value, ApiError>,
    {
        self.guard(origin, endpoint, now)?;
        match pipeline.run(fragments, &self.memo, handler) {
            Ok(value) => {
                self.tracker.record_success(origin, endpoint, now);
                self.audit.record(&GateAuditEvent::allowed(origin, endpoint, now));
                Ok(value)
            }
            Err(error) => Err(self.reject(origin, endpoint, error, now)),
        }
    }

    /// Applies failure bookkeeping for an error determined at the boundary.
    ///
    /// Validation failures feed the tracker and may trigger a block; system
    /// faults are audited with their operator detail and never feed the
    /// tracker. Returns the error unchanged for rendering.
    #[must_use]
    pub fn reject(
        &self,
        origin: &ClientOrigin,
        endpoint: &EndpointPath,
        error: ApiError,
        now: Timestamp,
    ) -> ApiError {
        if error.code.is_validation_failure() {
            let recorded = self.tracker.record_failure(origin, endpoint, now);
            self.audit.record(&GateAuditEvent::rejected(origin, endpoint, &error, now));
            if recorded.newly_blocked {
                self.audit.record(&GateAuditEvent::blocked(origin, endpoint, now));
            }
        } else if error.code.is_caller_fault() {
            self.audit.record(&GateAuditEvent::rejected(origin, endpoint, &error, now));
        } else {
            self.audit.record(&GateAuditEvent::system_fault(origin, endpoint, &error, now));
        }
        error
    }

    /// Evicts stale tracker records.
    pub fn sweep(&self, now: Timestamp) {
        self.tracker.sweep(now);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
