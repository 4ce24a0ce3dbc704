// crates/request-gate-core/src/runtime/stage.rs
// ============================================================================
// Module: Stage Validator
// Description: One schema contract bound to one request fragment kind.
// Purpose: Produce a validation outcome and coerce the fragment in place.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A stage wraps one schema contract against one fragment kind. On success
//! the raw fragment is replaced atomically with its coerced form; on failure
//! the stage reports a taxonomy error and the caller must not continue. An
//! absent-but-optional fragment is not a failure. Host faults from the
//! contract map to `SCHEMA_ERROR` and are always fatal to the request,
//! distinct from ordinary violations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::error::ApiError;
use crate::core::error::ErrorCode;
use crate::core::fragment::FragmentKind;
use crate::core::fragment::FragmentSet;
use crate::core::outcome::ValidationOutcome;
use crate::core::outcome::Violation;
use crate::interfaces::ContractFault;
use crate::interfaces::SharedSchemaContract;
use crate::runtime::stats::OutcomeMemo;

// ============================================================================
// SECTION: Stage Validator
// ============================================================================

/// One validation stage: a fragment kind bound to a schema contract.
///
/// # Invariants
/// - A stage has no side effects of its own; reporting failures to the
///   tracker is the caller's responsibility.
pub struct ValidationStage {
    /// Fragment kind this stage validates.
    kind: FragmentKind,
    /// Schema contract evaluated against the fragment.
    contract: SharedSchemaContract,
    /// Whether an absent fragment is a failure.
    required: bool,
}

impl ValidationStage {
    /// Creates a stage for a required fragment.
    #[must_use]
    pub fn new(kind: FragmentKind, contract: SharedSchemaContract) -> Self {
        Self {
            kind,
            contract,
            required: true,
        }
    }

    /// Returns a copy of this stage marked optional.
    ///
    /// An optional stage passes without evaluating when its fragment is
    /// absent.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Returns the fragment kind this stage validates.
    #[must_use]
    pub const fn kind(&self) -> FragmentKind {
        self.kind
    }

    /// Runs the stage against the request's fragment set.
    ///
    /// On success the fragment is replaced with its coerced form before
    /// returning. Validation attempts are recorded against `memo`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with `VALIDATION_ERROR` for violations, with the
    /// depth/size codes for exceeded limits, and with `SCHEMA_ERROR` for
    /// contract host faults.
    pub fn run(&self, fragments: &mut FragmentSet, memo: &OutcomeMemo) -> Result<(), ApiError> {
        let Some(raw) = fragments.get(self.kind) else {
            if self.required {
                return Err(ApiError::validation(&[Violation::new(
                    self.kind.as_str(),
                    "fragment is required",
                )]));
            }
            return Ok(());
        };

        match memo.evaluate(self.contract.as_ref(), raw) {
            Ok(ValidationOutcome::Ok(coerced)) => {
                fragments.replace(self.kind, coerced);
                Ok(())
            }
            Ok(ValidationOutcome::Fail(violations)) => Err(ApiError::validation(&violations)),
            Err(fault) => Err(fault_to_error(self.kind, &fault)),
        }
    }
}

/// Maps a contract fault to its taxonomy error.
fn fault_to_error(kind: FragmentKind, fault: &ContractFault) -> ApiError {
    match fault {
        ContractFault::Host(detail) => {
            ApiError::schema_fault(format!("{} contract failed: {detail}", kind.as_str()))
        }
        ContractFault::DepthExceeded {
            ..
        } => ApiError::new(ErrorCode::ValidationDepthExceeded, fault.to_string()),
        ContractFault::SizeExceeded {
            ..
        } => ApiError::new(ErrorCode::ValidationSizeExceeded, fault.to_string()),
    }
}
