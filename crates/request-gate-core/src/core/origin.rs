// crates/request-gate-core/src/core/origin.rs
// ============================================================================
// Module: Client Origins
// Description: Origin identity and endpoint keys for abuse tracking.
// Purpose: Provide stable, hashable keys for per-origin failure records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An origin is the combination of client identity signals (peer IP address
//! and/or authenticated user identifier) used as the abuse-tracking key
//! together with the endpoint path. Origins are untrusted input; they label
//! tracker records and audit events but never authorize anything.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Client Origin
// ============================================================================

/// Client identity signals used for abuse tracking.
///
/// # Invariants
/// - At least one signal should be present for meaningful tracking; a fully
///   anonymous origin still tracks, pooled under one record per endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrigin {
    /// Peer IP address when available.
    pub ip: Option<IpAddr>,
    /// Authenticated user identifier when available.
    pub user_id: Option<String>,
}

impl ClientOrigin {
    /// Creates an origin from an IP address.
    #[must_use]
    pub const fn from_ip(ip: IpAddr) -> Self {
        Self {
            ip: Some(ip),
            user_id: None,
        }
    }

    /// Creates an origin with no identity signals.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            ip: None,
            user_id: None,
        }
    }

    /// Returns a copy with the user identifier set.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

impl fmt::Display for ClientOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ip, &self.user_id) {
            (Some(ip), Some(user)) => write!(f, "{ip}/{user}"),
            (Some(ip), None) => write!(f, "{ip}"),
            (None, Some(user)) => write!(f, "-/{user}"),
            (None, None) => f.write_str("anonymous"),
        }
    }
}

// ============================================================================
// SECTION: Endpoint Path
// ============================================================================

/// Endpoint path component of a tracking key.
///
/// # Invariants
/// - Values are route templates (e.g. `/login`), not concrete request URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointPath(String);

impl EndpointPath {
    /// Creates an endpoint path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
