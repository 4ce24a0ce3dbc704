// crates/request-gate-core/src/lib.rs
// ============================================================================
// Module: Request Gate Core
// Description: Validation pipeline, error taxonomy, and abuse tracking.
// Purpose: Provide the transport-agnostic core of the request validation gate.
// Dependencies: serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! Request Gate Core implements the per-request validation gate: composable
//! validation stages over request fragments, a closed error taxonomy with
//! stable numeric codes, per-origin failure tracking for abuse throttling,
//! and validation-attempt statistics. The core performs no I/O and never
//! reads wall-clock time; hosts supply timestamps explicitly so behavior is
//! deterministic and replayable.
//!
//! Schema evaluation is a pluggable capability (see
//! [`interfaces::SchemaContract`]); the core consumes contracts and never
//! embeds a schema engine.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::error::ApiError;
pub use core::error::ErrorCode;
pub use core::fragment::FragmentKind;
pub use core::fragment::FragmentSet;
pub use core::origin::ClientOrigin;
pub use core::origin::EndpointPath;
pub use core::outcome::ValidationOutcome;
pub use core::outcome::Violation;
pub use core::time::Timestamp;
pub use interfaces::ContractFault;
pub use interfaces::SchemaContract;
pub use interfaces::SharedSchemaContract;
pub use runtime::pipeline::ValidationPipeline;
pub use runtime::stage::ValidationStage;
pub use runtime::stats::CacheStats;
pub use runtime::stats::OutcomeMemo;
pub use runtime::tracker::FailureState;
pub use runtime::tracker::FailureTracker;
pub use runtime::tracker::GateDecision;
pub use runtime::tracker::RecordedFailure;
pub use runtime::tracker::ValidationRateLimits;
