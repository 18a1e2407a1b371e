//! Message framing for newline-delimited JSON.

use serde_json::Value;

use crate::types::{JsonRpcMessage, McpError, McpResult, RequestId};

/// Parse a single line of text as a JSON-RPC message.
///
/// Text that is not JSON is a parse error. JSON that is not a usable message
/// (a non-object, or an id that is neither string, number nor null) is an
/// invalid request.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))?;
    to_message(value)
}

/// Classify an already-parsed JSON value as a JSON-RPC message.
pub fn to_message(value: Value) -> McpResult<JsonRpcMessage> {
    serde_json::from_value(value).map_err(|e| McpError::InvalidRequest(e.to_string()))
}

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// JSON-RPC error reply with a null id, for input that could not be parsed
/// far enough to recover one.
pub fn error_without_id(err: &McpError) -> Value {
    serde_json::to_value(err.to_json_rpc_error(RequestId::Null)).unwrap_or_default()
}
