//! JSON-RPC 2.0 message types for the MCP protocol.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier: string, number, or null.
///
/// Numbers are kept as sent, so `1.5` or a `u64` past `i64::MAX` is echoed back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(Number),
    Null,
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::Null => write!(f, "null"),
        }
    }
}

/// A JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A JSON-RPC 2.0 success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

/// Error object within a JSON-RPC error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 notification (no id, no response expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Union type for any JSON-RPC message.
///
/// Classified by which keys are present rather than by trial: anything with a
/// `method` and an `id` is a request, so a request with a bad id is rejected
/// instead of being read as a notification.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Error(JsonRpcError),
    Notification(JsonRpcNotification),
}

impl<'de> Deserialize<'de> for JsonRpcMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::classify(value).map_err(serde::de::Error::custom)
    }
}

impl JsonRpcMessage {
    fn classify(value: Value) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;

        let Some(fields) = value.as_object() else {
            return Err(serde_json::Error::custom("message must be a JSON object"));
        };
        if let Some(id) = fields.get("id") {
            if !(id.is_string() || id.is_number() || id.is_null()) {
                return Err(serde_json::Error::custom(
                    "id must be a string, a number or null",
                ));
            }
        }

        let has_method = fields.contains_key("method");
        let has_id = fields.contains_key("id");
        let has_error = fields.contains_key("error");

        Ok(match (has_method, has_id) {
            (true, true) => JsonRpcMessage::Request(serde_json::from_value(value)?),
            (true, false) => JsonRpcMessage::Notification(serde_json::from_value(value)?),
            (false, _) if has_error => JsonRpcMessage::Error(serde_json::from_value(value)?),
            (false, _) => JsonRpcMessage::Response(serde_json::from_value(value)?),
        })
    }

    /// Method name for requests and notifications.
    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request(r) => Some(&r.method),
            JsonRpcMessage::Notification(n) => Some(&n.method),
            _ => None,
        }
    }

    pub fn params(&self) -> Option<&Value> {
        match self {
            JsonRpcMessage::Request(r) => r.params.as_ref(),
            JsonRpcMessage::Notification(n) => n.params.as_ref(),
            _ => None,
        }
    }
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}
