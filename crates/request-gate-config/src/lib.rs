// crates/request-gate-config/src/lib.rs
// ============================================================================
// Module: Request Gate Config
// Description: Canonical configuration model and validation for the gate.
// Purpose: Centralize configuration loading so every crate shares one model.
// Dependencies: request-gate-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Request Gate Config defines the TOML configuration surface consumed by
//! the gate: server binding and body limits, abuse-throttling thresholds,
//! and validation resource limits. Every field carries a serde default so a
//! missing table degrades to safe values, and [`config::RequestGateConfig::validate`]
//! rejects out-of-bounds settings before any runtime object is constructed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::RateLimitsConfig;
pub use config::RequestGateConfig;
pub use config::ServerConfig;
pub use config::ValidationConfig;
