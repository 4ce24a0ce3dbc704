// crates/request-gate-core/src/core/fragment.rs
// ============================================================================
// Module: Request Fragments
// Description: Fragment kinds and the per-request fragment set.
// Purpose: Model the structurally distinct request parts subject to validation.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A request carries up to three fragments: body, query parameters, and path
//! parameters. Each fragment is an untyped JSON mapping as received from the
//! transport. Successful validation replaces a fragment atomically with its
//! coerced form; a fragment is never partially replaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Fragment Kinds
// ============================================================================

/// Structurally distinct request parts subject to independent validation.
///
/// # Invariants
/// - Variants are stable for serialization and audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// Request body.
    Body,
    /// Query parameters.
    Query,
    /// Path parameters.
    Params,
}

impl FragmentKind {
    /// Returns a stable label for this fragment kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
            Self::Params => "params",
        }
    }
}

// ============================================================================
// SECTION: Fragment Set
// ============================================================================

/// The fragments of one inbound request.
///
/// # Invariants
/// - Each fragment is either entirely raw or entirely validated/coerced.
/// - Owned by one request pipeline; never shared across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSet {
    /// Body fragment when present.
    pub body: Option<Value>,
    /// Query fragment when present.
    pub query: Option<Value>,
    /// Path-parameter fragment when present.
    pub params: Option<Value>,
}

impl FragmentSet {
    /// Creates an empty fragment set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            body: None,
            query: None,
            params: None,
        }
    }

    /// Returns a copy with the body fragment set.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns a copy with the query fragment set.
    #[must_use]
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Returns a copy with the params fragment set.
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Returns the fragment of the given kind when present.
    #[must_use]
    pub const fn get(&self, kind: FragmentKind) -> Option<&Value> {
        match kind {
            FragmentKind::Body => self.body.as_ref(),
            FragmentKind::Query => self.query.as_ref(),
            FragmentKind::Params => self.params.as_ref(),
        }
    }

    /// Replaces the fragment of the given kind with its validated form.
    pub fn replace(&mut self, kind: FragmentKind, value: Value) {
        match kind {
            FragmentKind::Body => self.body = Some(value),
            FragmentKind::Query => self.query = Some(value),
            FragmentKind::Params => self.params = Some(value),
        }
    }
}
