// crates/request-gate-core/src/core/outcome.rs
// ============================================================================
// Module: Validation Outcomes
// Description: Tagged validation results and ordered violation lists.
// Purpose: Make failure paths values rather than control-flow exceptions.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A schema contract evaluation produces exactly one [`ValidationOutcome`]:
//! either the coerced, typed value or an ordered list of violations. Failure
//! paths are plain values so they are directly testable without exercising
//! stack-unwinding machinery.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// One schema violation at a specific field path.
///
/// # Invariants
/// - `path` and `message` are never empty.
/// - Messages describe the violated shape rule, never schema internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Field path of the violating value (`$` for the fragment root).
    pub path: String,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl Violation {
    /// Creates a violation, substituting `$` for an empty path.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() { "$".to_string() } else { path },
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of evaluating one schema contract against one fragment.
///
/// # Invariants
/// - `Fail` always carries at least one violation.
/// - `Ok` carries the fully coerced replacement value, never a partial merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Validation succeeded; carries the coerced, typed value.
    Ok(Value),
    /// Validation failed; carries the ordered violation list.
    Fail(Vec<Violation>),
}

impl ValidationOutcome {
    /// Returns true when the outcome is a success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns the violations when the outcome is a failure.
    #[must_use]
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Self::Ok(_) => None,
            Self::Fail(violations) => Some(violations),
        }
    }
}
