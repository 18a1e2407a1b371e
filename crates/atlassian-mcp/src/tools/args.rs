//! Argument helpers shared by the tool handlers.

use serde_json::Value;

use crate::types::{McpError, McpResult};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

pub fn required_str<'a>(args: &'a Value, key: &str) -> McpResult<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(McpError::InvalidParams(format!("{key} must be a string"))),
        None => Err(McpError::InvalidParams(format!(
            "Missing required argument: {key}"
        ))),
    }
}

pub fn optional_str<'a>(args: &'a Value, key: &str) -> McpResult<Option<&'a str>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(McpError::InvalidParams(format!("{key} must be a string"))),
    }
}

pub fn bool_or(args: &Value, key: &str, default: bool) -> McpResult<bool> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(McpError::InvalidParams(format!("{key} must be a boolean"))),
    }
}

/// `limit` as sent by the client: integers, floats (truncated) and numeric
/// strings are all accepted.
pub fn read_limit(args: &Value) -> McpResult<i64> {
    let invalid = || McpError::InvalidParams("limit must be a number".to_string());
    match args.get("limit") {
        None | Some(Value::Null) => Ok(DEFAULT_LIMIT),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(invalid),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .ok_or_else(invalid)
        }
        Some(_) => Err(invalid()),
    }
}

/// Caps the requested limit at [`MAX_LIMIT`]. There is no lower bound.
pub fn effective_limit(requested: i64) -> i64 {
    requested.min(MAX_LIMIT)
}
