// crates/request-gate-core/src/core/error.rs
// ============================================================================
// Module: Error Taxonomy
// Description: Closed numeric error codes and the canonical ApiError payload.
// Purpose: Provide a stable failure vocabulary for clients and audit sinks.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The error taxonomy is the single vocabulary for gate failures. Codes are
//! numeric, closed, and stable across versions; external clients depend on
//! the values and they are never renumbered. HTTP status defaults are
//! derived from the code class, and any fault not recognized by the taxonomy
//! must be coerced to [`ErrorCode::UnknownError`] at the outermost boundary.
//!
//! Caller-caused faults carry enough detail to correct the request (field
//! path plus message). System-caused faults are surfaced to clients only as
//! a generic message plus the code; raw internal text stays in audit logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;

use crate::core::outcome::Violation;

// ============================================================================
// SECTION: Error Codes
// ============================================================================

/// Closed set of gate error codes with stable numeric wire values.
///
/// # Invariants
/// - Numeric values are stable across versions and never renumbered.
/// - Every code maps to exactly one default HTTP status class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Caller could not be authenticated.
    AuthenticationFailed,
    /// Caller is blocked by the abuse guard.
    RateLimitExceeded,
    /// Request fragment violated its schema.
    ValidationError,
    /// Schema evaluation exceeded its time budget.
    ValidationTimeout,
    /// Payload nesting exceeded the configured depth limit.
    ValidationDepthExceeded,
    /// Payload size exceeded the configured byte limit.
    ValidationSizeExceeded,
    /// Schema contract failed for host-environment reasons.
    SchemaError,
    /// Upstream API collaborator failed.
    ApiError,
    /// Network-level failure reaching a collaborator.
    NetworkError,
    /// Unrecognized or internal fault coerced at the boundary.
    UnknownError,
}

/// All taxonomy codes in stable declaration order.
pub const ALL_ERROR_CODES: &[ErrorCode] = &[
    ErrorCode::AuthenticationFailed,
    ErrorCode::RateLimitExceeded,
    ErrorCode::ValidationError,
    ErrorCode::ValidationTimeout,
    ErrorCode::ValidationDepthExceeded,
    ErrorCode::ValidationSizeExceeded,
    ErrorCode::SchemaError,
    ErrorCode::ApiError,
    ErrorCode::NetworkError,
    ErrorCode::UnknownError,
];

impl ErrorCode {
    /// Returns the stable numeric wire value for this code.
    #[must_use]
    pub const fn value(self) -> u16 {
        match self {
            Self::AuthenticationFailed => 1000,
            Self::RateLimitExceeded => 1001,
            Self::ValidationError => 1100,
            Self::ValidationTimeout => 1101,
            Self::ValidationDepthExceeded => 1102,
            Self::ValidationSizeExceeded => 1103,
            Self::SchemaError => 1200,
            Self::ApiError => 1300,
            Self::NetworkError => 1301,
            Self::UnknownError => 1999,
        }
    }

    /// Resolves a wire value back to a code, coercing unknown values.
    ///
    /// Unrecognized values map to [`Self::UnknownError`] so the taxonomy
    /// stays closed at deserialization boundaries.
    #[must_use]
    pub const fn from_value(value: u16) -> Self {
        match value {
            1000 => Self::AuthenticationFailed,
            1001 => Self::RateLimitExceeded,
            1100 => Self::ValidationError,
            1101 => Self::ValidationTimeout,
            1102 => Self::ValidationDepthExceeded,
            1103 => Self::ValidationSizeExceeded,
            1200 => Self::SchemaError,
            1300 => Self::ApiError,
            1301 => Self::NetworkError,
            _ => Self::UnknownError,
        }
    }

    /// Returns the default HTTP status for this code class.
    #[must_use]
    pub const fn default_status(self) -> u16 {
        match self {
            Self::AuthenticationFailed => 401,
            Self::RateLimitExceeded => 429,
            Self::ValidationError
            | Self::ValidationTimeout
            | Self::ValidationDepthExceeded
            | Self::ValidationSizeExceeded
            | Self::SchemaError => 400,
            Self::ApiError | Self::NetworkError => 502,
            Self::UnknownError => 500,
        }
    }

    /// Returns true when the fault is caused by the caller's request.
    ///
    /// Caller-caused faults are surfaced with corrective detail and are
    /// never retried automatically.
    #[must_use]
    pub const fn is_caller_fault(self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::RateLimitExceeded
                | Self::ValidationError
                | Self::ValidationTimeout
                | Self::ValidationDepthExceeded
                | Self::ValidationSizeExceeded
        )
    }

    /// Returns true when the code counts as a validation failure for
    /// abuse tracking.
    ///
    /// Schema host faults are system-caused and do not feed the tracker.
    #[must_use]
    pub const fn is_validation_failure(self) -> bool {
        matches!(
            self,
            Self::ValidationError
                | Self::ValidationTimeout
                | Self::ValidationDepthExceeded
                | Self::ValidationSizeExceeded
        )
    }

    /// Returns a stable label for this code.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::ValidationError => "validation_error",
            Self::ValidationTimeout => "validation_timeout",
            Self::ValidationDepthExceeded => "validation_depth_exceeded",
            Self::ValidationSizeExceeded => "validation_size_exceeded",
            Self::SchemaError => "schema_error",
            Self::ApiError => "api_error",
            Self::NetworkError => "network_error",
            Self::UnknownError => "unknown_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.value())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u16::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

// ============================================================================
// SECTION: Api Error
// ============================================================================

/// Canonical gate error payload.
///
/// # Invariants
/// - `code` is always drawn from the closed [`ErrorCode`] set.
/// - `status` defaults by code class and stays within 400..=599.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Taxonomy code for the failure.
    pub code: ErrorCode,
    /// Human-readable failure message.
    pub message: String,
    /// Optional structured detail payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// HTTP-equivalent status for boundary rendering.
    pub status: u16,
}

impl ApiError {
    /// Creates an error with the default status for its code class.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            status: code.default_status(),
        }
    }

    /// Returns a copy with an explicit status override.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Returns a copy with a structured detail payload attached.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Builds a validation error carrying an ordered violation list.
    ///
    /// The violations are attached as the detail payload so clients can
    /// correct the request field by field.
    #[must_use]
    pub fn validation(violations: &[Violation]) -> Self {
        let details = serde_json::to_value(violations).unwrap_or(Value::Null);
        Self::new(ErrorCode::ValidationError, "request validation failed").with_details(details)
    }

    /// Builds a rate-limit rejection carrying retry information.
    #[must_use]
    pub fn rate_limited(retry_after_ms: u64) -> Self {
        Self::new(ErrorCode::RateLimitExceeded, "too many validation failures")
            .with_details(serde_json::json!({ "retry_after_ms": retry_after_ms }))
    }

    /// Builds a schema host-fault error.
    ///
    /// The detail text is operator-facing; boundaries must render the
    /// client-safe message instead.
    #[must_use]
    pub fn schema_fault(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaError, detail.into())
    }

    /// Coerces an unrecognized fault into the taxonomy.
    ///
    /// The raw detail is preserved for audit sinks only; the boundary
    /// renders the generic client-safe message.
    #[must_use]
    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, detail.into())
    }

    /// Returns the message safe to surface to clients.
    ///
    /// Caller-caused faults surface their real message; system-caused
    /// faults surface a generic message so internal detail never leaks.
    #[must_use]
    pub fn client_message(&self) -> &str {
        if self.code.is_caller_fault() {
            &self.message
        } else {
            "internal error"
        }
    }

    /// Returns the detail payload safe to surface to clients.
    #[must_use]
    pub const fn client_details(&self) -> Option<&Value> {
        if self.code.is_caller_fault() {
            self.details.as_ref()
        } else {
            None
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.code.value(), self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// SECTION: Tests
// ============================================================================
