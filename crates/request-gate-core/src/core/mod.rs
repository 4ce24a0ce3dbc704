// crates/request-gate-core/src/core/mod.rs
// ============================================================================
// Module: Core Data Model
// Description: Fragments, outcomes, origins, timestamps, and the error taxonomy.
// Purpose: Define the canonical value types shared across the gate runtime.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The core data model defines the vocabulary of the gate: request fragments
//! and their kinds, validation outcomes and violations, client origins and
//! endpoint paths used as abuse-tracking keys, host-supplied timestamps, and
//! the closed [`error::ErrorCode`] taxonomy.

pub mod error;
pub mod fragment;
pub mod origin;
pub mod outcome;
pub mod time;
