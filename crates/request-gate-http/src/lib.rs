// crates/request-gate-http/src/lib.rs
// ============================================================================
// Module: Request Gate HTTP
// Description: HTTP boundary for the request validation gate.
// Purpose: Bind schema contracts, envelopes, and abuse tracking to axum.
// Dependencies: request-gate-core, request-gate-config, axum, jsonschema
// ============================================================================

//! ## Overview
//! Request Gate HTTP is the transport boundary of the validation gate. It
//! provides the jsonschema-backed [`schema::JsonSchemaContract`], the uniform
//! success/failure response envelopes, the [`gate::RequestGate`] orchestrator
//! that runs guard checks and pipelines with failure bookkeeping, audit
//! sinks for operator-facing events, and [`server::GateServer`] which wires
//! declarative endpoint registrations into an axum router.
//!
//! The boundary supplies wall-clock timestamps and peer identity to the
//! core; the core itself stays deterministic and I/O-free.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod envelope;
pub mod gate;
pub mod schema;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::GateAuditEvent;
pub use audit::GateAuditSink;
pub use audit::NoopAuditSink;
pub use audit::SharedAuditSink;
pub use audit::StderrAuditSink;
pub use envelope::failure_envelope;
pub use envelope::success_envelope;
pub use gate::RequestGate;
pub use schema::JsonSchemaContract;
pub use schema::SchemaBuildError;
pub use server::EndpointSpec;
pub use server::GateHandler;
pub use server::GateServer;
pub use server::GateServerError;
