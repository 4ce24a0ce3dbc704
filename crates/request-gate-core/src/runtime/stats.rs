// crates/request-gate-core/src/runtime/stats.rs
// ============================================================================
// Module: Validation Stats & Memoization
// Description: Attempt counters and a bounded memoized-outcome store.
// Purpose: Observe hit/miss rates and reuse outcomes for repeated inputs.
// Dependencies: crate::core, crate::interfaces, serde, sha2
// ============================================================================

//! ## Overview
//! Every validation attempt is recorded here as a hit (outcome served from
//! the memoization store) or a miss (freshly computed). Memoization keys are
//! SHA-256 fingerprints over the contract fingerprint and the serialized
//! input; contracts are deterministic by invariant, so a memoized outcome is
//! always identical to a fresh evaluation. With capacity zero the store is
//! disabled and every attempt is a miss, which is the valid trivial case.
//!
//! Counters are monotonic between explicit resets and are owned by this
//! object; snapshots are eventually consistent under concurrent mutation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;

use crate::core::outcome::ValidationOutcome;
use crate::interfaces::ContractFault;
use crate::interfaces::SchemaContract;

// ============================================================================
// SECTION: Cache Stats
// ============================================================================

/// Aggregate validation-attempt counters and store dimensions.
///
/// # Invariants
/// - `hits + misses` equals total validation attempts since the last reset.
/// - `keys`, `ksize`, and `vsize` are all zero when memoization is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Outcomes served from the memoization store.
    pub hits: u64,
    /// Outcomes freshly computed.
    pub misses: u64,
    /// Current memoization store cardinality.
    pub keys: usize,
    /// Approximate total key size in bytes.
    pub ksize: usize,
    /// Approximate total stored outcome size in bytes.
    pub vsize: usize,
}

// ============================================================================
// SECTION: Outcome Memo
// ============================================================================

/// One memoized outcome with its approximate serialized size.
#[derive(Debug, Clone)]
struct MemoEntry {
    /// Memoized validation outcome.
    outcome: ValidationOutcome,
    /// Approximate serialized outcome size in bytes.
    vsize: usize,
}

/// Mutex-guarded memo state.
#[derive(Debug, Default)]
struct MemoInner {
    /// Hit counter since the last reset.
    hits: u64,
    /// Miss counter since the last reset.
    misses: u64,
    /// Memoized outcomes keyed by hex fingerprint.
    entries: HashMap<String, MemoEntry>,
    /// Insertion order for bounded eviction.
    order: VecDeque<String>,
}

/// Validation-attempt statistics with optional outcome memoization.
///
/// # Invariants
/// - Constructed once at process start and shared; tests construct their
///   own and reset explicitly.
/// - Only fingerprinted contracts are memoized; faults are never cached.
pub struct OutcomeMemo {
    /// Maximum memoized entries; zero disables the store.
    capacity: usize,
    /// Guarded counters and entries.
    inner: Mutex<MemoInner>,
}

impl OutcomeMemo {
    /// Creates a memo with the given store capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(MemoInner::default()),
        }
    }

    /// Creates a memo with memoization disabled; every attempt is a miss.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Evaluates a contract, serving repeated identical inputs from the
    /// store when possible.
    ///
    /// Records exactly one hit or miss per call regardless of outcome.
    ///
    /// # Errors
    ///
    /// Propagates [`ContractFault`] from the contract; faults are recorded
    /// as misses and never memoized.
    pub fn evaluate(
        &self,
        contract: &dyn SchemaContract,
        raw: &Value,
    ) -> Result<ValidationOutcome, ContractFault> {
        let key = if self.capacity == 0 {
            None
        } else {
            contract.fingerprint().map(|fingerprint| memo_key(fingerprint, raw))
        };

        if let Some(key) = &key {
            let mut inner = self.lock_inner();
            if let Some(entry) = inner.entries.get(key) {
                let outcome = entry.outcome.clone();
                inner.hits = inner.hits.saturating_add(1);
                return Ok(outcome);
            }
        }

        let result = contract.evaluate(raw);
        let mut inner = self.lock_inner();
        inner.misses = inner.misses.saturating_add(1);
        if let (Some(key), Ok(outcome)) = (key, &result) {
            Self::insert(&mut inner, self.capacity, key, outcome.clone());
        }
        result
    }

    /// Returns a snapshot of the counters and store dimensions.
    #[must_use]
    pub fn snapshot(&self) -> CacheStats {
        let inner = self.lock_inner();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            keys: inner.entries.len(),
            ksize: inner.entries.keys().map(String::len).sum(),
            vsize: inner.entries.values().map(|entry| entry.vsize).sum(),
        }
    }

    /// Resets counters and drops every memoized entry.
    pub fn reset(&self) {
        let mut inner = self.lock_inner();
        *inner = MemoInner::default();
    }

    /// Inserts an outcome, evicting the oldest entry when full.
    fn insert(inner: &mut MemoInner, capacity: usize, key: String, outcome: ValidationOutcome) {
        if inner.entries.contains_key(&key) {
            return;
        }
        while inner.entries.len() >= capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }
        let vsize = serde_json::to_vec(&outcome).map_or(0, |bytes| bytes.len());
        inner.order.push_back(key.clone());
        inner.entries.insert(
            key,
            MemoEntry {
                outcome,
                vsize,
            },
        );
    }

    /// Locks the memo state, recovering from a poisoned mutex.
    fn lock_inner(&self) -> std::sync::MutexGuard<'_, MemoInner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Computes the hex memo key over a contract fingerprint and input.
fn memo_key(fingerprint: &str, raw: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update([0]);
    if let Ok(bytes) = serde_json::to_vec(raw) {
        hasher.update(&bytes);
    }
    let digest = hasher.finalize();
    let mut key = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = std::fmt::Write::write_fmt(&mut key, format_args!("{byte:02x}"));
    }
    key
}

// ============================================================================
// SECTION: Tests
// ============================================================================
