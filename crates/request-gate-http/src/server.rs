// crates/request-gate-http/src/server.rs
// ============================================================================
// Module: Gate Server
// Description: Axum wiring from declarative endpoint registrations.
// Purpose: Run registered endpoints behind the gate over HTTP.
// Dependencies: request-gate-core, request-gate-config, axum, tokio, url
// ============================================================================

//! ## Overview
//! [`GateServer`] turns declarative [`EndpointSpec`] registrations into an
//! axum router. Each request flows through one sequence: abuse-guard check,
//! fragment extraction (body bytes, query string, path parameters), the
//! endpoint's validation pipeline, then the handler. Every failure is
//! rendered through the uniform envelope. The boundary is where wall-clock
//! time enters the system and where unrecognized faults are coerced into
//! the taxonomy.
//!
//! Client identity is taken from the peer socket address plus an optional
//! `x-user-id` header. The body size precheck runs before JSON parsing so
//! oversized payloads are rejected at bounded cost.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::Path;
use axum::extract::RawQuery;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::StatusCode;
use axum::routing::MethodFilter;
use request_gate_config::RequestGateConfig;
use request_gate_core::ApiError;
use request_gate_core::ClientOrigin;
use request_gate_core::EndpointPath;
use request_gate_core::ErrorCode;
use request_gate_core::FragmentSet;
use request_gate_core::Timestamp;
use request_gate_core::ValidationPipeline;
use request_gate_core::Violation;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::audit::SharedAuditSink;
use crate::envelope::failure_envelope;
use crate::envelope::success_envelope;
use crate::gate::RequestGate;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gate server construction and runtime errors.
#[derive(Debug, Error)]
pub enum GateServerError {
    /// Configuration was rejected.
    #[error("config error: {0}")]
    Config(String),
    /// An endpoint registration could not be routed.
    #[error("route error: {0}")]
    Route(String),
    /// Binding the listen socket failed.
    #[error("bind error: {0}")]
    Bind(String),
    /// The HTTP server failed while running.
    #[error("serve error: {0}")]
    Serve(String),
}

// ============================================================================
// SECTION: Endpoint Registration
// ============================================================================

/// Terminal handler invoked after validation succeeds.
pub trait GateHandler: Send + Sync {
    /// Handles one request with its fully coerced fragments.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] drawn from the taxonomy; the boundary renders
    /// it through the failure envelope.
    fn handle(&self, fragments: &FragmentSet) -> Result<Value, ApiError>;
}

/// One declarative endpoint registration.
pub struct EndpointSpec {
    /// HTTP method.
    method: Method,
    /// Route template path (axum syntax, e.g. `/users/{id}`).
    path: String,
    /// Validation pipeline for this endpoint.
    pipeline: ValidationPipeline,
    /// Terminal handler.
    handler: Arc<dyn GateHandler>,
}

impl EndpointSpec {
    /// Creates an endpoint registration.
    #[must_use]
    pub fn new(
        method: Method,
        path: impl Into<String>,
        pipeline: ValidationPipeline,
        handler: Arc<dyn GateHandler>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            pipeline,
            handler,
        }
    }
}

// ============================================================================
// SECTION: Gate Server
// ============================================================================

/// HTTP server running registered endpoints behind the gate.
pub struct GateServer {
    /// Validated configuration.
    config: RequestGateConfig,
    /// Shared gate state.
    gate: Arc<RequestGate>,
    /// Registered endpoints.
    endpoints: Vec<EndpointSpec>,
}

impl GateServer {
    /// Creates a server from configuration and an audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`GateServerError`] when the configuration is invalid.
    pub fn from_config(
        config: RequestGateConfig,
        audit: SharedAuditSink,
    ) -> Result<Self, GateServerError> {
        config.validate().map_err(|err| GateServerError::Config(err.to_string()))?;
        let gate = Arc::new(RequestGate::from_config(&config, audit));
        Ok(Self {
            config,
            gate,
            endpoints: Vec::new(),
        })
    }

    /// Returns the shared gate state.
    #[must_use]
    pub fn gate(&self) -> Arc<RequestGate> {
        Arc::clone(&self.gate)
    }

    /// Registers an endpoint, applying the configured per-stage budget.
    pub fn register(&mut self, spec: EndpointSpec) {
        let budget = self.config.validation.stage_budget();
        self.endpoints.push(EndpointSpec {
            method: spec.method,
            path: spec.path,
            pipeline: spec.pipeline.with_stage_budget(budget),
            handler: spec.handler,
        });
    }

    /// Builds the axum router from registered endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`GateServerError`] when a registration uses an unsupported
    /// method.
    pub fn into_router(self) -> Result<Router, GateServerError> {
        let max_body_bytes = self.config.server.max_body_bytes;
        let mut app = Router::new();
        for spec in self.endpoints {
            let filter = method_filter(&spec.method)?;
            let state = Arc::new(EndpointState {
                gate: Arc::clone(&self.gate),
                pipeline: spec.pipeline,
                handler: spec.handler,
                endpoint: EndpointPath::new(spec.path.clone()),
                max_body_bytes,
            });
            let route = axum::routing::on(
                filter,
                move |ConnectInfo(peer): ConnectInfo<SocketAddr>,
                      Path(params): Path<HashMap<String, String>>,
                      RawQuery(query): RawQuery,
                      headers: HeaderMap,
                      bytes: Bytes| {
                    let state = Arc::clone(&state);
                    async move {
                        let (status, payload) = handle_endpoint(
                            &state,
                            peer,
                            &params,
                            query.as_deref(),
                            &headers,
                            &bytes,
                        );
                        (status, Json(payload))
                    }
                },
            );
            app = app.route(&spec.path, route);
        }
        Ok(app)
    }

    /// Binds the configured address and serves requests until failure.
    ///
    /// # Errors
    ///
    /// Returns [`GateServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), GateServerError> {
        let addr: SocketAddr = self
            .config
            .server
            .bind
            .parse()
            .map_err(|_| GateServerError::Config("invalid bind address".to_string()))?;
        let app = self.into_router()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| GateServerError::Bind("http bind failed".to_string()))?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|_| GateServerError::Serve("http server failed".to_string()))
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Per-endpoint state captured by the route closure.
struct EndpointState {
    /// Shared gate state.
    gate: Arc<RequestGate>,
    /// Validation pipeline with the configured stage budget.
    pipeline: ValidationPipeline,
    /// Terminal handler.
    handler: Arc<dyn GateHandler>,
    /// Endpoint path used as the tracking key.
    endpoint: EndpointPath,
    /// Maximum accepted body size in bytes.
    max_body_bytes: usize,
}

/// Runs one request through guard, extraction, pipeline, and rendering.
fn handle_endpoint(
    state: &EndpointState,
    peer: SocketAddr,
    params: &HashMap<String, String>,
    query: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> (StatusCode, Value) {
    let now = wall_clock();
    let origin = request_origin(peer, headers);

    if let Err(error) = state.gate.guard(&origin, &state.endpoint, now) {
        return render_failure(&error, &state.endpoint, now);
    }
    let fragments = match build_fragments(state.max_body_bytes, params, query, body) {
        Ok(fragments) => fragments,
        Err(error) => {
            let error = state.gate.reject(&origin, &state.endpoint, error, now);
            return render_failure(&error, &state.endpoint, now);
        }
    };
    let result =
        state.gate.handle(&origin, &state.endpoint, &state.pipeline, fragments, now, |coerced| {
            state.handler.handle(coerced)
        });
    match result {
        Ok(data) => (StatusCode::OK, success_envelope(data, &state.endpoint, now)),
        Err(error) => render_failure(&error, &state.endpoint, now),
    }
}

/// Extracts request fragments from the transport representation.
///
/// The body size precheck runs before JSON parsing. A query fragment is
/// always present (empty object without a query string) so query schemas
/// with defaults apply uniformly; a params fragment exists only for routes
/// with path parameters.
fn build_fragments(
    max_body_bytes: usize,
    params: &HashMap<String, String>,
    query: Option<&str>,
    body: &[u8],
) -> Result<FragmentSet, ApiError> {
    if body.len() > max_body_bytes {
        return Err(ApiError::new(
            ErrorCode::ValidationSizeExceeded,
            format!("request body exceeds {max_body_bytes} bytes"),
        ));
    }
    let mut fragments = FragmentSet::new();
    if !body.is_empty() {
        let parsed: Value = serde_json::from_slice(body).map_err(|_| {
            ApiError::validation(&[Violation::new("body", "body must be valid JSON")])
        })?;
        fragments = fragments.with_body(parsed);
    }
    fragments = fragments.with_query(parse_query(query.unwrap_or_default()));
    if !params.is_empty() {
        let map: Map<String, Value> = params
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        fragments = fragments.with_params(Value::Object(map));
    }
    Ok(fragments)
}

/// Parses a query string into a JSON object of string values; last wins.
fn parse_query(query: &str) -> Value {
    let mut map = Map::new();
    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        map.insert(name.into_owned(), Value::String(value.into_owned()));
    }
    Value::Object(map)
}

/// Derives the client origin from the peer address and identity header.
fn request_origin(peer: SocketAddr, headers: &HeaderMap) -> ClientOrigin {
    let origin = ClientOrigin::from_ip(peer.ip());
    match headers.get("x-user-id").and_then(|value| value.to_str().ok()) {
        Some(user_id) => origin.with_user_id(user_id),
        None => origin,
    }
}

/// Renders a failure envelope with a well-formed HTTP status.
fn render_failure(error: &ApiError, endpoint: &EndpointPath, now: Timestamp) -> (StatusCode, Value) {
    let (status, envelope) = failure_envelope(error, endpoint, now);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, envelope)
}

/// Reads the wall clock as a gate timestamp.
fn wall_clock() -> Timestamp {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
    Timestamp::from_unix_millis(millis)
}

/// Maps an HTTP method to an axum method filter.
fn method_filter(method: &Method) -> Result<MethodFilter, GateServerError> {
    match *method {
        Method::GET => Ok(MethodFilter::GET),
        Method::POST => Ok(MethodFilter::POST),
        Method::PUT => Ok(MethodFilter::PUT),
        Method::PATCH => Ok(MethodFilter::PATCH),
        Method::DELETE => Ok(MethodFilter::DELETE),
        Method::HEAD => Ok(MethodFilter::HEAD),
        Method::OPTIONS => Ok(MethodFilter::OPTIONS),
        _ => Err(GateServerError::Route(format!("unsupported method {method}"))),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
