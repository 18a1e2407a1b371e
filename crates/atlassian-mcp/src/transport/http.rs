//! HTTP transport: one-shot POSTs bridged onto the engine loop.
//!
//! A background [`EngineLoop`] consumes an inbound channel and emits replies on
//! an outbound channel. Each request enters the engine under a bridge-issued
//! ticket, and a router task matches each reply's ticket to the waiting caller,
//! restoring the caller's id. Callers give up after a deadline; their pending
//! entry is removed and any late reply is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use crate::protocol::validator::validate_envelope;
use crate::protocol::{EngineLoop, ProtocolHandler};
use crate::types::{JsonRpcMessage, McpError, McpResult, RequestId, JSONRPC_VERSION};

use super::framing;

/// How long a caller waits for its reply.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
/// How long startup waits for the engine loop to report in.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

const CHANNEL_CAPACITY: usize = 64;

struct Waiter {
    id: RequestId,
    reply: oneshot::Sender<Value>,
}

/// Pending callers keyed by the ticket their request carries through the
/// engine in place of the caller's own id.
type PendingCalls = Arc<Mutex<HashMap<u64, Waiter>>>;

fn lock(pending: &PendingCalls) -> MutexGuard<'_, HashMap<u64, Waiter>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes a caller's pending entry however its wait ends, including when the
/// waiting future is dropped mid-flight.
struct PendingGuard<'a> {
    pending: &'a PendingCalls,
    ticket: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.pending).remove(&self.ticket);
    }
}

/// Correlates synchronous callers with replies from the engine loop.
pub struct HttpBridge {
    handler: ProtocolHandler,
    inbound: mpsc::Sender<JsonRpcMessage>,
    pending: PendingCalls,
    next_ticket: AtomicU64,
    timeout: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpBridge {
    /// Spawn the engine loop with `workers` dispatch slots and the reply
    /// router, then wait for the loop to report ready. A startup timeout is
    /// logged; the bridge is still returned.
    pub async fn start(handler: ProtocolHandler, workers: usize) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();
        let pending: PendingCalls = Arc::new(Mutex::new(HashMap::new()));

        let engine = EngineLoop::new(handler.clone()).with_workers(workers);
        let engine_task = tokio::spawn(engine.run(inbound_rx, outbound_tx, Some(ready_tx)));
        let router_task = tokio::spawn(route_replies(outbound_rx, pending.clone()));

        match tokio::time::timeout(STARTUP_TIMEOUT, ready_rx).await {
            Ok(Ok(())) => tracing::info!(workers, "Engine loop is running"),
            Ok(Err(_)) => tracing::error!("Engine loop exited before reporting ready"),
            Err(_) => tracing::warn!(
                "Engine loop did not report ready within {}s",
                STARTUP_TIMEOUT.as_secs()
            ),
        }

        Self {
            handler,
            inbound: inbound_tx,
            pending,
            next_ticket: AtomicU64::new(0),
            timeout: RESPONSE_TIMEOUT,
            tasks: Mutex::new(vec![engine_task, router_task]),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn handler(&self) -> &ProtocolHandler {
        &self.handler
    }

    /// Number of callers still waiting on a reply.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Push a message to the engine. Notifications resolve to `None` at once;
    /// requests resolve to their reply or [`McpError::Timeout`].
    ///
    /// A request travels through the engine under a fresh ticket and gets its
    /// own id back on the reply, so a reply that outlives its caller can never
    /// reach a later caller reusing that id.
    pub async fn submit(&self, msg: JsonRpcMessage) -> McpResult<Option<Value>> {
        let mut request = match msg {
            JsonRpcMessage::Request(req) => req,
            JsonRpcMessage::Notification(_) => {
                self.send_inbound(msg).await?;
                return Ok(None);
            }
            _ => {
                return Err(McpError::InvalidRequest(
                    "Expected a request or notification".to_string(),
                ))
            }
        };

        let (tx, rx) = oneshot::channel();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let id = std::mem::replace(&mut request.id, RequestId::Number(ticket.into()));
        {
            let mut pending = lock(&self.pending);
            if pending.values().any(|w| w.id == id) {
                return Err(McpError::InvalidRequest(format!(
                    "Request id {id} is already in flight"
                )));
            }
            pending.insert(
                ticket,
                Waiter {
                    id: id.clone(),
                    reply: tx,
                },
            );
        }
        let _guard = PendingGuard {
            pending: &self.pending,
            ticket,
        };

        self.send_inbound(JsonRpcMessage::Request(request)).await?;

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(reply)) => Ok(Some(reply)),
            Ok(Err(_)) => Err(McpError::InternalError(
                "Engine loop dropped the request".to_string(),
            )),
            Err(_) => {
                tracing::warn!(%id, "No reply within {:?}", self.timeout);
                Err(McpError::Timeout)
            }
        }
    }

    async fn send_inbound(&self, msg: JsonRpcMessage) -> McpResult<()> {
        self.inbound
            .send(msg)
            .await
            .map_err(|_| McpError::Transport("Engine loop is not running".to_string()))
    }

    /// Abort the background tasks and wait for them. Cancellation counts as a
    /// clean stop; anything else is logged.
    pub async fn shutdown(&self) {
        self.handler.close().await;

        let tasks: Vec<JoinHandle<()>> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            match task.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => tracing::debug!("Background task cancelled"),
                Err(e) => tracing::error!("Background task failed: {e}"),
            }
        }
        tracing::info!("HTTP bridge stopped");
    }
}

async fn route_replies(mut outbound: mpsc::Receiver<Value>, pending: PendingCalls) {
    while let Some(mut reply) = outbound.recv().await {
        let Some(ticket) = reply.get("id").and_then(Value::as_u64) else {
            tracing::warn!("Dropping reply without a ticket id");
            continue;
        };

        let waiter = lock(&pending).remove(&ticket);
        let Some(waiter) = waiter else {
            tracing::warn!(ticket, "Dropping late reply for expired request");
            continue;
        };
        reply["id"] = serde_json::to_value(&waiter.id).unwrap_or(Value::Null);
        if waiter.reply.send(reply).is_err() {
            tracing::warn!(id = %waiter.id, "Caller went away before its reply arrived");
        }
    }
}

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub token: Option<String>,
    pub bridge: Arc<HttpBridge>,
}

/// Build the `/mcp` + `/health` router.
pub fn router(bridge: Arc<HttpBridge>, token: Option<String>) -> Router {
    let state = Arc::new(ServerState { token, bridge });

    Router::new()
        .route("/mcp", post(handle_request))
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP transport for web-based MCP clients.
pub struct HttpTransport {
    bridge: Arc<HttpBridge>,
    token: Option<String>,
}

impl HttpTransport {
    pub async fn start(handler: ProtocolHandler, token: Option<String>, workers: usize) -> Self {
        Self {
            bridge: Arc::new(HttpBridge::start(handler, workers).await),
            token,
        }
    }

    /// Serve until Ctrl-C, then stop the bridge.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let app = router(self.bridge.clone(), self.token.clone());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!("HTTP transport listening on {addr}");

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {e}");
                }
                tracing::info!("Shutdown signal received");
            })
            .await
            .map_err(|e| McpError::Transport(e.to_string()));

        self.bridge.shutdown().await;
        served
    }
}

fn rpc_error_body(id: RequestId, err: &McpError) -> Value {
    serde_json::to_value(err.to_json_rpc_error(id)).unwrap_or_default()
}

/// Checks the bearer token when one is configured.
/// /health is handled by a separate route that bypasses this layer.
async fn auth_layer(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    if let Some(expected) = &state.token {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);

        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                AxumJson(rpc_error_body(RequestId::Null, &McpError::Unauthorized)),
            )
                .into_response();
        }
    }

    next.run(request).await
}

/// POST /mcp. The body is parsed by hand so a malformed body still gets a
/// JSON-RPC parse error rather than a bare extractor rejection.
async fn handle_request(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            let err = McpError::ParseError(e.to_string());
            return (
                StatusCode::BAD_REQUEST,
                AxumJson(framing::error_without_id(&err)),
            )
                .into_response();
        }
    };

    let msg = match framing::to_message(value) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::debug!("Rejected malformed message: {err}");
            return (
                StatusCode::BAD_REQUEST,
                AxumJson(framing::error_without_id(&err)),
            )
                .into_response();
        }
    };

    let (id, jsonrpc, method) = match &msg {
        JsonRpcMessage::Request(r) => (Some(r.id.clone()), r.jsonrpc.as_str(), r.method.as_str()),
        JsonRpcMessage::Notification(n) => (None, n.jsonrpc.as_str(), n.method.as_str()),
        _ => (None, JSONRPC_VERSION, ""),
    };
    let reply_id = id.clone().unwrap_or(RequestId::Null);

    if let Err(e) = validate_envelope(jsonrpc, method) {
        return (StatusCode::BAD_REQUEST, AxumJson(rpc_error_body(reply_id, &e))).into_response();
    }
    if let Err(e) = state.bridge.handler().validator().validate(method, msg.params()) {
        tracing::debug!(method, "Rejected invalid params: {e}");
        return (StatusCode::BAD_REQUEST, AxumJson(json!(e))).into_response();
    }

    match state.bridge.submit(msg).await {
        Ok(Some(reply)) => (StatusCode::OK, AxumJson(reply)).into_response(),
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Err(e @ McpError::Timeout) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            AxumJson(rpc_error_body(reply_id, &e)),
        )
            .into_response(),
        Err(e @ McpError::InvalidRequest(_)) => {
            (StatusCode::BAD_REQUEST, AxumJson(rpc_error_body(reply_id, &e))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to submit request: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                AxumJson(rpc_error_body(reply_id, &e)),
            )
                .into_response()
        }
    }
}

/// Health check. Not behind auth.
async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<Value> {
    AxumJson(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "session": format!("{:?}", state.bridge.handler().session_state().await),
        "pending": state.bridge.pending_count(),
    }))
}
