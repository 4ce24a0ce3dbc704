// crates/request-gate-core/src/runtime/tracker.rs
// ============================================================================
// Module: Failure Tracker & Abuse Guard
// Description: Per-(origin, endpoint) failure records and block decisions.
// Purpose: Throttle origins that repeatedly send invalid payloads.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The tracker records validation failures keyed by client origin and
//! endpoint and drives a `Clean -> Tracking -> Blocked` state machine per
//! key. Counting uses fixed per-record windows: the minute and hour counters
//! each carry their own window start and reset when the window has fully
//! elapsed. A record blocks when either windowed count reaches its
//! configured maximum, and stays blocked until the block duration elapses,
//! after which it re-enters `Tracking` with cleared counters.
//!
//! The guard must be consulted before schema validation runs so blocked
//! origins never spend validation cost. A successful validation does not
//! clear failure counters by default (the abuse signal persists against
//! probing); deployments can opt into clearing via
//! [`ValidationRateLimits::clear_on_success`].
//!
//! All state lives behind one mutex inside an owned tracker object with an
//! explicit lifecycle; timestamps are supplied by the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

use crate::core::origin::ClientOrigin;
use crate::core::origin::EndpointPath;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed minute window length in milliseconds.
const MINUTE_WINDOW_MS: u64 = 60_000;
/// Fixed hour window length in milliseconds.
const HOUR_WINDOW_MS: u64 = 3_600_000;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Immutable abuse-throttling policy consulted by the guard.
///
/// # Invariants
/// - Thresholds are at least one; zero thresholds are rejected by the
///   configuration layer before a tracker is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRateLimits {
    /// Failures within the minute window that trigger a block.
    pub max_failures_per_minute: u32,
    /// Failures within the hour window that trigger a block.
    pub max_failures_per_hour: u32,
    /// How long a blocked origin stays blocked, in milliseconds.
    pub block_duration_ms: u64,
    /// Whether a successful validation clears the failure counters.
    pub clear_on_success: bool,
    /// Maximum number of distinct tracked (origin, endpoint) records.
    pub max_entries: usize,
}

impl Default for ValidationRateLimits {
    fn default() -> Self {
        Self {
            max_failures_per_minute: 10,
            max_failures_per_hour: 100,
            block_duration_ms: 60_000,
            clear_on_success: false,
            max_entries: 10_000,
        }
    }
}

// ============================================================================
// SECTION: Record State
// ============================================================================

/// Observable state of one tracking record.
///
/// # Invariants
/// - Variants are stable for audit labeling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FailureState {
    /// No record exists for the key.
    Clean,
    /// Failures observed, below both thresholds.
    Tracking {
        /// Failures in the current minute window.
        failures_minute: u32,
        /// Failures in the current hour window.
        failures_hour: u32,
    },
    /// Threshold reached; requests are rejected until the block expires.
    Blocked {
        /// Timestamp at which the block expires.
        until: Timestamp,
    },
}

/// Result of recording one validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedFailure {
    /// Record state after the failure was applied.
    pub state: FailureState,
    /// True when this failure caused the `Tracking -> Blocked` transition.
    pub newly_blocked: bool,
}

/// Guard decision for one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Request may proceed to validation.
    Allow,
    /// Origin is blocked; reject before validation runs.
    Blocked {
        /// Milliseconds until the block expires.
        retry_after_ms: u64,
    },
}

/// One failure record with fixed minute and hour windows.
#[derive(Debug, Clone, Copy)]
struct FailureRecord {
    /// Failures in the current minute window.
    failures_minute: u32,
    /// Start of the current minute window.
    minute_window_start: Timestamp,
    /// Failures in the current hour window.
    failures_hour: u32,
    /// Start of the current hour window.
    hour_window_start: Timestamp,
    /// Timestamp of the most recent failure.
    last_failure: Timestamp,
    /// Block expiry when the record is blocked.
    blocked_until: Option<Timestamp>,
}

impl FailureRecord {
    /// Creates a fresh record with both windows anchored at `now`.
    const fn new(now: Timestamp) -> Self {
        Self {
            failures_minute: 0,
            minute_window_start: now,
            failures_hour: 0,
            hour_window_start: now,
            last_failure: now,
            blocked_until: None,
        }
    }

    /// Resets counters whose fixed window has fully elapsed.
    fn roll_windows(&mut self, now: Timestamp) {
        if now.millis_since(self.minute_window_start) >= MINUTE_WINDOW_MS {
            self.failures_minute = 0;
            self.minute_window_start = now;
        }
        if now.millis_since(self.hour_window_start) >= HOUR_WINDOW_MS {
            self.failures_hour = 0;
            self.hour_window_start = now;
        }
    }

    /// Clears an expired block, re-entering `Tracking` with cleared counts.
    fn expire_block(&mut self, now: Timestamp) {
        if let Some(until) = self.blocked_until
            && now >= until
        {
            *self = Self::new(now);
        }
    }

    /// Returns the observable state of this record.
    const fn state(&self) -> FailureState {
        match self.blocked_until {
            Some(until) => FailureState::Blocked {
                until,
            },
            None => FailureState::Tracking {
                failures_minute: self.failures_minute,
                failures_hour: self.failures_hour,
            },
        }
    }
}

// ============================================================================
// SECTION: Failure Tracker
// ============================================================================

/// Tracking key: one record per (origin, endpoint) pair.
type TrackerKey = (ClientOrigin, EndpointPath);

/// Per-origin validation failure tracker and abuse guard.
///
/// # Invariants
/// - All mutation is serialized through the inner mutex; concurrent
///   requests never lose updates.
/// - Constructed once at process start; tests construct their own.
pub struct FailureTracker {
    /// Active throttling policy.
    limits: ValidationRateLimits,
    /// Tracking records keyed by (origin, endpoint).
    records: Mutex<HashMap<TrackerKey, FailureRecord>>,
}

impl FailureTracker {
    /// Creates a tracker with the given policy.
    #[must_use]
    pub fn new(limits: ValidationRateLimits) -> Self {
        Self {
            limits,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn limits(&self) -> &ValidationRateLimits {
        &self.limits
    }

    /// Guard check: decides whether a request may proceed to validation.
    ///
    /// Must be called before any schema evaluation. An expired block is
    /// cleared here, returning the record to `Tracking` with cleared counts.
    pub fn check(&self, origin: &ClientOrigin, endpoint: &EndpointPath, now: Timestamp) -> GateDecision {
        let mut records = self.lock_records();
        let Some(record) = records.get_mut(&(origin.clone(), endpoint.clone())) else {
            return GateDecision::Allow;
        };
        record.expire_block(now);
        match record.blocked_until {
            Some(until) => GateDecision::Blocked {
                retry_after_ms: until.millis_since(now),
            },
            None => GateDecision::Allow,
        }
    }

    /// Records one validation failure for the key.
    ///
    /// Increments both windowed counters, refreshes the last-failure time,
    /// and transitions to `Blocked` when either counter reaches its
    /// threshold.
    pub fn record_failure(
        &self,
        origin: &ClientOrigin,
        endpoint: &EndpointPath,
        now: Timestamp,
    ) -> RecordedFailure {
        let mut records = self.lock_records();
        if !records.contains_key(&(origin.clone(), endpoint.clone())) {
            Self::evict_if_full(&mut records, self.limits.max_entries);
        }
        let record = records
            .entry((origin.clone(), endpoint.clone()))
            .or_insert_with(|| FailureRecord::new(now));

        record.expire_block(now);
        if record.blocked_until.is_some() {
            // Already blocked; the guard should have rejected this request.
            return RecordedFailure {
                state: record.state(),
                newly_blocked: false,
            };
        }

        record.roll_windows(now);
        record.failures_minute = record.failures_minute.saturating_add(1);
        record.failures_hour = record.failures_hour.saturating_add(1);
        record.last_failure = now;

        let newly_blocked = record.failures_minute >= self.limits.max_failures_per_minute
            || record.failures_hour >= self.limits.max_failures_per_hour;
        if newly_blocked {
            record.blocked_until = Some(now.saturating_add_millis(self.limits.block_duration_ms));
        }
        RecordedFailure {
            state: record.state(),
            newly_blocked,
        }
    }

    /// Records a successful validation for the key.
    ///
    /// Never blocks and never unblocks; clears the counters only when the
    /// policy opts into `clear_on_success`.
    pub fn record_success(&self, origin: &ClientOrigin, endpoint: &EndpointPath, now: Timestamp) {
        if !self.limits.clear_on_success {
            return;
        }
        let mut records = self.lock_records();
        if let Some(record) = records.get_mut(&(origin.clone(), endpoint.clone()))
            && record.blocked_until.is_none()
        {
            *record = FailureRecord::new(now);
        }
    }

    /// Returns the observable state for a key.
    #[must_use]
    pub fn state(&self, origin: &ClientOrigin, endpoint: &EndpointPath, now: Timestamp) -> FailureState {
        let mut records = self.lock_records();
        let Some(record) = records.get_mut(&(origin.clone(), endpoint.clone())) else {
            return FailureState::Clean;
        };
        record.expire_block(now);
        record.roll_windows(now);
        record.state()
    }

    /// Evicts records idle for longer than the hour window.
    ///
    /// Unblocked records whose last failure has aged out return to `Clean`.
    /// Blocked records are retained until the block itself has expired.
    pub fn sweep(&self, now: Timestamp) {
        let mut records = self.lock_records();
        records.retain(|_, record| {
            if let Some(until) = record.blocked_until
                && now < until
            {
                return true;
            }
            now.millis_since(record.last_failure) < HOUR_WINDOW_MS
        });
    }

    /// Removes every record, returning all keys to `Clean`.
    pub fn clear(&self) {
        self.lock_records().clear();
    }

    /// Returns the number of tracked records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    /// Returns true when no records are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_records().is_empty()
    }

    /// Locks the record map, recovering from a poisoned mutex.
    fn lock_records(&self) -> std::sync::MutexGuard<'_, HashMap<TrackerKey, FailureRecord>> {
        self.records.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Evicts the record with the oldest last failure when the map is full.
    fn evict_if_full(records: &mut HashMap<TrackerKey, FailureRecord>, max_entries: usize) {
        if max_entries == 0 || records.len() < max_entries {
            return;
        }
        let oldest = records
            .iter()
            .min_by_key(|(_, record)| record.last_failure)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            records.remove(&key);
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
