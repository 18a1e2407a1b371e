//! Request dispatcher: routes JSON-RPC messages to their handlers.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::completion;
use crate::context::ServerContext;
use crate::resources::ResourceRegistry;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::session::{Session, SessionState};
use super::validator::{validate_request, ParamValidator};

/// The main protocol handler that dispatches incoming JSON-RPC messages.
///
/// Cheap to clone: clones share one session, so every transport task talking
/// to the same client sees the same lifecycle state.
#[derive(Clone)]
pub struct ProtocolHandler {
    context: ServerContext,
    session: Arc<Mutex<Session>>,
    validator: Arc<ParamValidator>,
}

impl ProtocolHandler {
    pub fn new(context: ServerContext) -> Self {
        Self {
            context,
            session: Arc::new(Mutex::new(Session::new())),
            validator: Arc::new(ParamValidator::default()),
        }
    }

    pub fn validator(&self) -> &ParamValidator {
        &self.validator
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// End the session. Later messages are rejected.
    pub async fn close(&self) {
        self.session.lock().await.close();
    }

    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        tracing::debug!(method = %request.method, id = %request.id, "Handling request");
        let id = request.id.clone();

        let result = self.check_request(&request).await;
        let result = match result {
            Ok(()) => self.dispatch_request(&request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => {
                tracing::debug!(method = %request.method, "Request failed: {e}");
                serde_json::to_value(e.to_json_rpc_error(id)).unwrap_or_default()
            }
        }
    }

    /// Envelope, then params, then session state: nothing here touches a provider.
    async fn check_request(&self, request: &JsonRpcRequest) -> McpResult<()> {
        validate_request(request)?;
        self.validator
            .validate(&request.method, request.params.as_ref())?;
        self.session.lock().await.admit(&request.method)
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,
            "ping" => Ok(Value::Object(serde_json::Map::new())),

            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(request.params.clone()).await,

            "resources/list" => self.handle_resources_list().await,
            "resources/templates/list" => self.handle_resource_templates_list().await,
            "resources/read" => self.handle_resources_read(request.params.clone()).await,

            "completion/complete" => self.handle_complete(request.params.clone()).await,

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => {
                self.session.lock().await.mark_initialized();
            }
            "notifications/cancelled" => {
                let params: Option<CancelRequestParams> = notification
                    .params
                    .and_then(|p| serde_json::from_value(p).ok());
                match params {
                    Some(p) => tracing::info!(
                        "Client cancelled request {} ({})",
                        p.request_id,
                        p.reason.as_deref().unwrap_or("no reason given")
                    ),
                    None => tracing::info!("Received cancellation notification"),
                }
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = parse_params(params, "Initialize")?;
        let result = self.session.lock().await.initialize(init_params)?;
        to_result(result)
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        to_result(ToolListResult {
            tools: ToolRegistry::list_tools(),
            next_cursor: None,
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = parse_params(params, "Tool call")?;
        let result =
            ToolRegistry::call(&call_params.name, call_params.arguments, &self.context).await?;
        to_result(result)
    }

    async fn handle_resources_list(&self) -> McpResult<Value> {
        to_result(ResourceListResult {
            resources: ResourceRegistry::list_resources(&self.context).await,
            next_cursor: None,
        })
    }

    async fn handle_resource_templates_list(&self) -> McpResult<Value> {
        to_result(ResourceTemplateListResult {
            resource_templates: ResourceRegistry::list_templates(),
            next_cursor: None,
        })
    }

    async fn handle_resources_read(&self, params: Option<Value>) -> McpResult<Value> {
        let read_params: ResourceReadParams = parse_params(params, "Resource read")?;
        let result = ResourceRegistry::read(&read_params.uri, &self.context).await?;
        to_result(result)
    }

    async fn handle_complete(&self, params: Option<Value>) -> McpResult<Value> {
        let complete_params: CompleteParams = parse_params(params, "Completion")?;
        to_result(completion::complete(&complete_params, &self.context).await)
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>, what: &str) -> McpResult<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams(format!("{what} params required")))
}

fn to_result(value: impl serde::Serialize) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}
