// crates/request-gate-config/src/config/tests.rs
// ============================================================================
// Module: Gate Configuration Tests
// Description: Unit tests for defaults and bounds validation.
// Purpose: Validate that misconfiguration fails closed before runtime.
// Dependencies: request-gate-config
// ============================================================================

//! ## Overview
//! Validates default values, the bounds checks on every table, and the
//! conversion into the core tracker policy.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::ConfigError;
use super::RateLimitsConfig;
use super::RequestGateConfig;
use super::ServerConfig;
use super::ValidationConfig;

// ============================================================================
// SECTION: Default Tests
// ============================================================================

#[test]
fn empty_document_is_a_valid_configuration() {
    let config: RequestGateConfig = toml::from_str("").expect("empty config parses");
    config.validate().expect("defaults validate");
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.rate_limits.max_failures_per_minute, 10);
    assert_eq!(config.validation.max_depth, 32);
    assert_eq!(config.validation.memo_capacity, 0);
}

#[test]
fn partial_tables_keep_remaining_defaults() {
    let config: RequestGateConfig = toml::from_str(
        r#"
        [rate_limits]
        max_failures_per_minute = 3
        block_duration_ms = 5000
        "#,
    )
    .expect("partial config parses");
    config.validate().expect("partial config validates");
    assert_eq!(config.rate_limits.max_failures_per_minute, 3);
    assert_eq!(config.rate_limits.max_failures_per_hour, 100);
    assert!(!config.rate_limits.clear_on_success);
}

#[test]
fn unknown_fields_are_rejected() {
    let result: Result<RequestGateConfig, _> = toml::from_str(
        r#"
        [server]
        bind = "127.0.0.1:8080"
        surprising = true
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn rate_limits_convert_to_tracker_policy() {
    let config = RateLimitsConfig {
        max_failures_per_minute: 3,
        max_failures_per_hour: 30,
        block_duration_ms: 5_000,
        clear_on_success: true,
        max_entries: 64,
    };
    let limits = config.to_limits();
    assert_eq!(limits.max_failures_per_minute, 3);
    assert_eq!(limits.max_failures_per_hour, 30);
    assert_eq!(limits.block_duration_ms, 5_000);
    assert!(limits.clear_on_success);
    assert_eq!(limits.max_entries, 64);
}

// ============================================================================
// SECTION: Bounds Tests
// ============================================================================

#[test]
fn zero_minute_threshold_is_rejected() {
    let config = RequestGateConfig {
        rate_limits: RateLimitsConfig {
            max_failures_per_minute: 0,
            ..RateLimitsConfig::default()
        },
        ..RequestGateConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn hour_threshold_below_minute_threshold_is_rejected() {
    let config = RequestGateConfig {
        rate_limits: RateLimitsConfig {
            max_failures_per_minute: 50,
            max_failures_per_hour: 10,
            ..RateLimitsConfig::default()
        },
        ..RequestGateConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn invalid_bind_address_is_rejected() {
    let config = RequestGateConfig {
        server: ServerConfig {
            bind: "not-an-address".to_string(),
            ..ServerConfig::default()
        },
        ..RequestGateConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn zero_body_limit_is_rejected() {
    let config = RequestGateConfig {
        server: ServerConfig {
            max_body_bytes: 0,
            ..ServerConfig::default()
        },
        ..RequestGateConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn zero_stage_timeout_is_rejected() {
    let config = RequestGateConfig {
        validation: ValidationConfig {
            stage_timeout_ms: 0,
            ..ValidationConfig::default()
        },
        ..RequestGateConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn oversized_block_duration_is_rejected() {
    let config = RequestGateConfig {
        rate_limits: RateLimitsConfig {
            block_duration_ms: 86_400_001,
            ..RateLimitsConfig::default()
        },
        ..RequestGateConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}
