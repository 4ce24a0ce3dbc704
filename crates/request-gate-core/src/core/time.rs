// crates/request-gate-core/src/core/time.rs
// ============================================================================
// Module: Gate Time Model
// Description: Host-supplied timestamps for tracker windows and audit records.
// Purpose: Keep the core free of wall-clock reads so behavior is deterministic.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The gate core uses explicit time values supplied by the host boundary for
//! every tracker transition. The core never reads wall-clock time directly,
//! which keeps window arithmetic deterministic and directly testable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used by the failure tracker and audit records.
///
/// # Invariants
/// - Values are unix milliseconds explicitly provided by callers.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from unix milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> u64 {
        self.0
    }

    /// Returns this timestamp advanced by the given number of milliseconds.
    #[must_use]
    pub const fn saturating_add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Returns the milliseconds elapsed since an earlier timestamp.
    ///
    /// Saturates to zero when `earlier` is not actually earlier.
    #[must_use]
    pub const fn millis_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}
