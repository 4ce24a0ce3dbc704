// crates/request-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Gate Runtime
// Description: Stage execution, pipeline composition, tracking, and stats.
// Purpose: Orchestrate validation per request and abuse bookkeeping across requests.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime composes stage validators into per-request pipelines and
//! maintains the only cross-request state in the core: the failure tracker's
//! per-(origin, endpoint) records and the validation stats counters. Both
//! are owned, mutex-serialized objects with explicit lifecycles, never
//! ambient globals.

pub mod pipeline;
pub mod stage;
pub mod stats;
pub mod tracker;
