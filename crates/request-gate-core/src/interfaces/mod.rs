// crates/request-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Gate Interfaces
// Description: Engine-agnostic schema contract seam for the validation gate.
// Purpose: Define the capability the pipeline consumes without embedding an engine.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The gate treats schema evaluation as a pluggable capability. A contract
//! must be deterministic (same input yields the same outcome and the same
//! coerced value or violation set) and total (malformed input produces a
//! failure outcome, never a panic). Host-environment faults (the contract
//! itself breaking, not the input) are reported separately through
//! [`ContractFault`] and are always fatal to the request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::core::outcome::ValidationOutcome;

// ============================================================================
// SECTION: Contract Faults
// ============================================================================

/// Host-environment faults raised by a schema contract.
///
/// # Invariants
/// - Variants are stable for taxonomy mapping; they describe the contract or
///   resource limits failing, never ordinary input violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractFault {
    /// The contract itself failed (broken schema, engine fault).
    #[error("schema contract fault: {0}")]
    Host(String),
    /// Input nesting exceeded the configured depth limit.
    #[error("payload depth {depth} exceeds limit {max}")]
    DepthExceeded {
        /// Observed nesting depth.
        depth: usize,
        /// Configured depth limit.
        max: usize,
    },
    /// Input size exceeded the configured byte limit.
    #[error("payload size {bytes} exceeds limit {max}")]
    SizeExceeded {
        /// Observed payload size in bytes.
        bytes: usize,
        /// Configured byte limit.
        max: usize,
    },
}

// ============================================================================
// SECTION: Schema Contract
// ============================================================================

/// Pluggable predicate-with-coercion over one request fragment.
///
/// # Invariants
/// - Deterministic: identical input produces an identical outcome.
/// - Total: malformed input yields `Ok(ValidationOutcome::Fail(..))`, never
///   a panic; `Err` is reserved for host-environment faults.
/// - Depth/size limits are enforced before or during evaluation, never
///   after, to bound worst-case cost against adversarial payloads.
pub trait SchemaContract: Send + Sync {
    /// Evaluates the contract against a raw fragment value.
    ///
    /// # Errors
    ///
    /// Returns [`ContractFault`] for host-environment faults or exceeded
    /// resource limits; ordinary violations are a `Fail` outcome.
    fn evaluate(&self, raw: &Value) -> Result<ValidationOutcome, ContractFault>;

    /// Returns a stable fingerprint for memoization when available.
    ///
    /// Contracts without a fingerprint are never memoized; every attempt
    /// against them is a miss.
    fn fingerprint(&self) -> Option<&str> {
        None
    }
}

/// Shared handle to a schema contract.
pub type SharedSchemaContract = Arc<dyn SchemaContract>;
