// crates/request-gate-http/src/schema.rs
// ============================================================================
// Module: JSON Schema Contracts
// Description: jsonschema-backed implementation of the schema contract seam.
// Purpose: Evaluate fragments against Draft 2020-12 schemas with coercion.
// Dependencies: request-gate-core, jsonschema, serde_json, sha2
// ============================================================================

//! ## Overview
//! [`JsonSchemaContract`] compiles a JSON Schema (Draft 2020-12) once at
//! registration time and evaluates request fragments against it. Evaluation
//! is deterministic and total: schema violations become an ordered violation
//! list, never an error. Payload size and nesting depth are checked before
//! the schema engine runs so adversarial payloads are rejected at bounded
//! cost.
//!
//! Coercion is opt-in per contract: `with_defaults` fills absent top-level
//! properties from schema `default` values, and `with_scalar_coercion`
//! parses top-level string scalars into the property's declared numeric or
//! boolean type (query strings arrive as text). Coercion happens on a copy;
//! the raw fragment is never mutated in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Draft;
use jsonschema::Validator;
use request_gate_core::ContractFault;
use request_gate_core::SchemaContract;
use request_gate_core::ValidationOutcome;
use request_gate_core::Violation;
use serde_json::Map;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default payload nesting depth limit.
const DEFAULT_MAX_DEPTH: usize = 32;
/// Default payload size limit in bytes (1 MiB).
const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema compilation errors raised at registration time.
#[derive(Debug, Error)]
pub enum SchemaBuildError {
    /// The schema document is not a valid Draft 2020-12 schema.
    #[error("invalid schema: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Contract
// ============================================================================

/// Schema contract backed by a compiled JSON Schema validator.
///
/// # Invariants
/// - The validator is compiled exactly once; evaluation never recompiles.
/// - Size and depth limits are enforced before the engine sees the payload.
/// - The fingerprint is stable for a given schema document, so memoized
///   outcomes survive process restarts with the same schema.
pub struct JsonSchemaContract {
    /// Compiled Draft 2020-12 validator.
    validator: Validator,
    /// Original schema document, retained for defaults and coercion hints.
    schema: Value,
    /// Hex SHA-256 fingerprint of the schema document.
    fingerprint: String,
    /// Whether absent top-level properties are filled from schema defaults.
    apply_defaults: bool,
    /// Whether top-level string scalars are parsed into declared types.
    coerce_scalars: bool,
    /// Maximum payload nesting depth.
    max_depth: usize,
    /// Maximum serialized payload size in bytes.
    max_bytes: usize,
}

impl JsonSchemaContract {
    /// Compiles a schema contract from a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError`] when the document is not a valid
    /// Draft 2020-12 schema.
    pub fn build(schema: Value) -> Result<Self, SchemaBuildError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| SchemaBuildError::Invalid(err.to_string()))?;
        let fingerprint = schema_fingerprint(&schema)?;
        Ok(Self {
            validator,
            schema,
            fingerprint,
            apply_defaults: false,
            coerce_scalars: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_bytes: DEFAULT_MAX_BYTES,
        })
    }

    /// Returns a copy that fills absent top-level properties from schema
    /// `default` values during coercion.
    #[must_use]
    pub const fn with_defaults(mut self) -> Self {
        self.apply_defaults = true;
        self
    }

    /// Returns a copy that parses top-level string scalars into the
    /// property's declared numeric or boolean type.
    #[must_use]
    pub const fn with_scalar_coercion(mut self) -> Self {
        self.coerce_scalars = true;
        self
    }

    /// Returns a copy with an explicit nesting depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns a copy with an explicit payload size limit in bytes.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Applies defaults and scalar coercion to a top-level object copy.
    fn coerce(&self, raw: &Value) -> Value {
        let mut candidate = raw.clone();
        let Some(object) = candidate.as_object_mut() else {
            return candidate;
        };
        let Some(properties) = self.schema.get("properties").and_then(Value::as_object) else {
            return candidate;
        };
        for (name, property) in properties {
            if self.coerce_scalars
                && let Some(coerced) = object.get(name).and_then(|value| coerce_scalar(value, property))
            {
                object.insert(name.clone(), coerced);
            }
            if self.apply_defaults
                && !object.contains_key(name)
                && let Some(default) = property.get("default")
            {
                object.insert(name.clone(), default.clone());
            }
        }
        candidate
    }
}

impl SchemaContract for JsonSchemaContract {
    fn evaluate(&self, raw: &Value) -> Result<ValidationOutcome, ContractFault> {
        let bytes = serialized_size(raw)?;
        if bytes > self.max_bytes {
            return Err(ContractFault::SizeExceeded {
                bytes,
                max: self.max_bytes,
            });
        }
        let depth = value_depth(raw);
        if depth > self.max_depth {
            return Err(ContractFault::DepthExceeded {
                depth,
                max: self.max_depth,
            });
        }
        let candidate = self.coerce(raw);
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(&candidate)
            .map(|err| Violation::new(err.instance_path().to_string(), err.to_string()))
            .collect();
        if violations.is_empty() {
            Ok(ValidationOutcome::Ok(candidate))
        } else {
            Ok(ValidationOutcome::Fail(violations))
        }
    }

    fn fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a top-level string scalar into the property's declared type.
///
/// Returns `None` when no coercion applies; unparseable strings are left
/// untouched so the schema engine reports the type violation.
fn coerce_scalar(value: &Value, property: &Value) -> Option<Value> {
    let text = value.as_str()?;
    let declared = property.get("type").and_then(Value::as_str)?;
    match declared {
        "integer" => text.parse::<i64>().ok().map(Value::from),
        "number" => text.parse::<f64>().ok().map(Value::from),
        "boolean" => match text {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

/// Returns the serialized size of a value in bytes.
fn serialized_size(value: &Value) -> Result<usize, ContractFault> {
    serde_json::to_vec(value)
        .map(|bytes| bytes.len())
        .map_err(|err| ContractFault::Host(format!("payload serialization failed: {err}")))
}

/// Returns the container nesting depth of a value; scalars have depth zero.
fn value_depth(value: &Value) -> usize {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => 0,
        Value::Array(items) => 1 + items.iter().map(value_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + object_depth(map),
    }
}

/// Returns the deepest member depth of an object.
fn object_depth(map: &Map<String, Value>) -> usize {
    map.values().map(value_depth).max().unwrap_or(0)
}

/// Computes the hex SHA-256 fingerprint of a schema document.
fn schema_fingerprint(schema: &Value) -> Result<String, SchemaBuildError> {
    let bytes = serde_json::to_vec(schema)
        .map_err(|err| SchemaBuildError::Invalid(format!("schema serialization failed: {err}")))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = std::fmt::Write::write_fmt(&mut hex, format_args!("{byte:02x}"));
    }
    Ok(hex)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
