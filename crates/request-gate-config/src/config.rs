// crates/request-gate-config/src/config.rs
// ============================================================================
// Module: Gate Configuration
// Description: Server, rate-limit, and validation configuration tables.
// Purpose: Load, default, and bounds-check every gate setting in one place.
// Dependencies: request-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! The configuration model mirrors the TOML layout: `[server]` for binding
//! and body limits, `[rate_limits]` for the abuse-throttling policy, and
//! `[validation]` for schema-evaluation resource limits. Loading enforces a
//! file size cap and UTF-8 before parsing, and `validate` fails closed on
//! any out-of-bounds value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use request_gate_core::ValidationRateLimits;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum allowed configuration file size in bytes.
const MAX_CONFIG_BYTES: usize = 256 * 1024;
/// Upper bound for failure thresholds.
const MAX_FAILURE_THRESHOLD: u32 = 1_000_000;
/// Upper bound for the block duration (24 hours).
const MAX_BLOCK_DURATION_MS: u64 = 86_400_000;
/// Upper bound for tracked (origin, endpoint) records.
const MAX_TRACKED_ENTRIES: usize = 10_000_000;
/// Upper bound for the request body size limit (64 MiB).
const MAX_BODY_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Upper bound for payload nesting depth.
const MAX_DEPTH_LIMIT: usize = 1_024;
/// Upper bound for the per-stage time budget (60 seconds).
const MAX_STAGE_TIMEOUT_MS: u64 = 60_000;
/// Upper bound for memoized validation outcomes.
const MAX_MEMO_CAPACITY: usize = 1_000_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("config io error: {0}")]
    Io(String),
    /// Parsing the configuration file failed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A configuration value is out of bounds.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Root Configuration
// ============================================================================

/// Root gate configuration.
///
/// # Invariants
/// - Every field defaults so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestGateConfig {
    /// Server binding and body limits.
    #[serde(default)]
    pub server: ServerConfig,
    /// Abuse-throttling policy.
    #[serde(default)]
    pub rate_limits: RateLimitsConfig,
    /// Schema-evaluation resource limits.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl RequestGateConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.rate_limits.validate()?;
        self.validation.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server Configuration
// ============================================================================

/// HTTP server settings.
///
/// # Invariants
/// - `bind` must parse as a socket address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid("server bind must be a socket address".to_string()))?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid("server max_body_bytes too large".to_string()));
        }
        Ok(())
    }
}

/// Default bind address.
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Default maximum body size (1 MiB).
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

// ============================================================================
// SECTION: Rate Limit Configuration
// ============================================================================

/// Abuse-throttling thresholds consumed by the failure tracker.
///
/// # Invariants
/// - Thresholds are at least one and the hour threshold is never below the
///   minute threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitsConfig {
    /// Failures within one minute that trigger a block.
    #[serde(default = "default_max_failures_per_minute")]
    pub max_failures_per_minute: u32,
    /// Failures within one hour that trigger a block.
    #[serde(default = "default_max_failures_per_hour")]
    pub max_failures_per_hour: u32,
    /// Block duration in milliseconds.
    #[serde(default = "default_block_duration_ms")]
    pub block_duration_ms: u64,
    /// Whether a successful validation clears the failure counters.
    #[serde(default)]
    pub clear_on_success: bool,
    /// Maximum number of distinct tracked (origin, endpoint) records.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            max_failures_per_minute: default_max_failures_per_minute(),
            max_failures_per_hour: default_max_failures_per_hour(),
            block_duration_ms: default_block_duration_ms(),
            clear_on_success: false,
            max_entries: default_max_entries(),
        }
    }
}

impl RateLimitsConfig {
    /// Converts this table into the core tracker policy.
    #[must_use]
    pub const fn to_limits(&self) -> ValidationRateLimits {
        ValidationRateLimits {
            max_failures_per_minute: self.max_failures_per_minute,
            max_failures_per_hour: self.max_failures_per_hour,
            block_duration_ms: self.block_duration_ms,
            clear_on_success: self.clear_on_success,
            max_entries: self.max_entries,
        }
    }

    /// Validates rate limit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_failures_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "rate_limits max_failures_per_minute must be greater than zero".to_string(),
            ));
        }
        if self.max_failures_per_minute > MAX_FAILURE_THRESHOLD {
            return Err(ConfigError::Invalid(
                "rate_limits max_failures_per_minute too large".to_string(),
            ));
        }
        if self.max_failures_per_hour < self.max_failures_per_minute {
            return Err(ConfigError::Invalid(
                "rate_limits max_failures_per_hour must not be below max_failures_per_minute"
                    .to_string(),
            ));
        }
        if self.max_failures_per_hour > MAX_FAILURE_THRESHOLD {
            return Err(ConfigError::Invalid(
                "rate_limits max_failures_per_hour too large".to_string(),
            ));
        }
        if self.block_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "rate_limits block_duration_ms must be greater than zero".to_string(),
            ));
        }
        if self.block_duration_ms > MAX_BLOCK_DURATION_MS {
            return Err(ConfigError::Invalid("rate_limits block_duration_ms too large".to_string()));
        }
        if self.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "rate_limits max_entries must be greater than zero".to_string(),
            ));
        }
        if self.max_entries > MAX_TRACKED_ENTRIES {
            return Err(ConfigError::Invalid("rate_limits max_entries too large".to_string()));
        }
        Ok(())
    }
}

/// Default minute threshold.
const fn default_max_failures_per_minute() -> u32 {
    10
}

/// Default hour threshold.
const fn default_max_failures_per_hour() -> u32 {
    100
}

/// Default block duration (one minute).
const fn default_block_duration_ms() -> u64 {
    60_000
}

/// Default tracked-record cap.
const fn default_max_entries() -> usize {
    10_000
}

// ============================================================================
// SECTION: Validation Configuration
// ============================================================================

/// Schema-evaluation resource limits.
///
/// # Invariants
/// - Limits bound worst-case validation cost; zero disables memoization
///   only, never the depth/size/timeout limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Maximum payload nesting depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Per-stage evaluation budget in milliseconds.
    #[serde(default = "default_stage_timeout_ms")]
    pub stage_timeout_ms: u64,
    /// Memoized-outcome store capacity; zero disables memoization.
    #[serde(default)]
    pub memo_capacity: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            stage_timeout_ms: default_stage_timeout_ms(),
            memo_capacity: 0,
        }
    }
}

impl ValidationConfig {
    /// Returns the per-stage budget as a duration.
    #[must_use]
    pub const fn stage_budget(&self) -> Duration {
        Duration::from_millis(self.stage_timeout_ms)
    }

    /// Validates validation limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "validation max_depth must be greater than zero".to_string(),
            ));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid("validation max_depth too large".to_string()));
        }
        if self.stage_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "validation stage_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.stage_timeout_ms > MAX_STAGE_TIMEOUT_MS {
            return Err(ConfigError::Invalid("validation stage_timeout_ms too large".to_string()));
        }
        if self.memo_capacity > MAX_MEMO_CAPACITY {
            return Err(ConfigError::Invalid("validation memo_capacity too large".to_string()));
        }
        Ok(())
    }
}

/// Default nesting depth limit.
const fn default_max_depth() -> usize {
    32
}

/// Default per-stage budget (250 milliseconds).
const fn default_stage_timeout_ms() -> u64 {
    250
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
