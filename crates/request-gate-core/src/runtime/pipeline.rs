// crates/request-gate-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Pipeline Composer
// Description: Ordered stage composition with short-circuit failure.
// Purpose: Run stages strictly in order and the handler exactly once.
// Dependencies: crate::core, crate::runtime::{stage, stats}
// ============================================================================

//! ## Overview
//! The pipeline chains zero or more validation stages plus the terminal
//! handler in declaration order. The first failing stage aborts the chain;
//! later stages are never invoked and nothing about their schemas is
//! revealed. The short-circuit is an explicit security policy against
//! clients probing one field at a time, not an artifact of laziness. The
//! handler runs exactly once, synchronously after the final stage, and only
//! when every stage succeeded.
//!
//! Each stage evaluation is bounded by an optional per-stage time budget; a
//! blown budget surfaces as `VALIDATION_TIMEOUT` so a slow contract cannot
//! hang the pipeline indefinitely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use serde_json::Value;

use crate::core::error::ApiError;
use crate::core::error::ErrorCode;
use crate::core::fragment::FragmentSet;
use crate::runtime::stage::ValidationStage;
use crate::runtime::stats::OutcomeMemo;

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Ordered composition of validation stages for one endpoint.
///
/// # Invariants
/// - Stages execute strictly in declaration order, never in parallel.
/// - The pipeline owns no cross-request state; it is safe to share per
///   endpoint and run concurrently for independent requests.
pub struct ValidationPipeline {
    /// Stages in declaration order.
    stages: Vec<ValidationStage>,
    /// Per-stage evaluation budget when configured.
    stage_budget: Option<Duration>,
}

impl ValidationPipeline {
    /// Creates a pipeline from stages in declaration order.
    #[must_use]
    pub fn new(stages: Vec<ValidationStage>) -> Self {
        Self {
            stages,
            stage_budget: None,
        }
    }

    /// Returns a copy with a per-stage evaluation budget.
    #[must_use]
    pub const fn with_stage_budget(mut self, budget: Duration) -> Self {
        self.stage_budget = Some(budget);
        self
    }

    /// Returns the number of stages in the pipeline.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Runs every stage in order, then the handler exactly once.
    ///
    /// On success the handler receives the fully coerced fragment set. On
    /// the first stage failure the remaining stages and the handler are
    /// skipped and the taxonomy error propagates for uniform rendering.
    ///
    /// # Errors
    ///
    /// Returns the first stage's [`ApiError`], `VALIDATION_TIMEOUT` when a
    /// stage blows its budget, or the handler's own error.
    pub fn run<H>(
        &self,
        mut fragments: FragmentSet,
        memo: &OutcomeMemo,
        handler: H,
    ) -> Result<Value, ApiError>
    where
        H: FnOnce(&FragmentSet) -> Result<Value, ApiError>,
    {
        for stage in &self.stages {
            let started = Instant::now();
            stage.run(&mut fragments, memo)?;
            if let Some(budget) = self.stage_budget
                && started.elapsed() > budget
            {
                return Err(ApiError::new(
                    ErrorCode::ValidationTimeout,
                    format!("{} stage exceeded {}ms budget", stage.kind().as_str(), budget.as_millis()),
                ));
            }
        }
        handler(&fragments)
    }

    /// Runs every stage in order without a terminal handler.
    ///
    /// Returns the coerced fragment set for callers that dispatch the
    /// handler themselves.
    ///
    /// # Errors
    ///
    /// Returns the first stage's [`ApiError`] exactly as [`Self::run`] does.
    pub fn validate(
        &self,
        fragments: FragmentSet,
        memo: &OutcomeMemo,
    ) -> Result<FragmentSet, ApiError> {
        let mut validated = None;
        self.run(fragments, memo, |coerced| {
            validated = Some(coerced.clone());
            Ok(Value::Null)
        })?;
        validated.map_or_else(
            || Err(ApiError::unknown("pipeline completed without fragments")),
            Ok,
        )
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
