//! Error types and JSON-RPC error codes for the MCP server.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use atlassian_fetch::FetchError;

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    /// Request arrived before a successful `initialize`.
    pub const NOT_INITIALIZED: i32 = -32002;
    /// Session was closed by the transport.
    pub const SESSION_CLOSED: i32 = -32003;
    pub const RESOURCE_NOT_FOUND: i32 = -32802;
    pub const TOOL_NOT_FOUND: i32 = -32803;

    /// Server: Unauthorized (missing or invalid bearer token).
    pub const UNAUTHORIZED: i32 = -32900;
}

/// Structured parameter-check failure.
///
/// `missing` maps each absent field to the reason it is required. It is only
/// present when the failure was a presence check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<BTreeMap<String, String>>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            missing: None,
        }
    }

    pub fn missing(message: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        Self {
            message: message.into(),
            missing: Some(fields),
        }
    }

    /// Names of the missing fields, in sorted order.
    pub fn missing_fields(&self) -> Vec<&str> {
        self.missing
            .as_ref()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    Validation(ValidationError),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Server not initialized")]
    NotInitialized,

    #[error("Session closed")]
    SessionClosed,

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid resource URI: {0}")]
    InvalidResourceUri(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Raw provider failure. Never sent to a client as-is: the tool and
    /// resource boundaries log it and collapse it to a generic failure.
    #[error("Provider error: {0}")]
    Provider(#[from] FetchError),

    #[error("Tool execution failed")]
    ToolExecutionFailed,

    #[error("Resource read failed")]
    ResourceReadFailed,

    #[error("No response received from MCP server")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid bearer token.
    #[error("Unauthorized")]
    Unauthorized,
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_)
            | McpError::Validation(_)
            | McpError::InvalidResourceUri(_) => INVALID_PARAMS,
            McpError::InternalError(_)
            | McpError::Provider(_)
            | McpError::ToolExecutionFailed
            | McpError::ResourceReadFailed
            | McpError::Timeout => INTERNAL_ERROR,
            McpError::NotInitialized => NOT_INITIALIZED,
            McpError::SessionClosed => SESSION_CLOSED,
            McpError::ResourceNotFound(_) => RESOURCE_NOT_FOUND,
            McpError::UnknownTool(_) => TOOL_NOT_FOUND,
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Json(_) => PARSE_ERROR,
            McpError::Unauthorized => UNAUTHORIZED,
        }
    }

    /// Structured detail for the error object's `data` field.
    pub fn data(&self) -> Option<Value> {
        match self {
            McpError::Validation(v) => serde_json::to_value(v).ok(),
            _ => None,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: self.data(),
            },
        }
    }
}

impl From<ValidationError> for McpError {
    fn from(e: ValidationError) -> Self {
        McpError::Validation(e)
    }
}

pub type McpResult<T> = Result<T, McpError>;
