//! JSON-RPC envelope checks and per-method parameter checks.
//!
//! Parameter checks live in a method-name → checker map. Methods without a
//! registered checker pass through unchecked.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::types::{JsonRpcRequest, McpError, McpResult, ValidationError, JSONRPC_VERSION};

/// Validate that a JSON-RPC request is well-formed.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    validate_envelope(&request.jsonrpc, &request.method)
}

pub fn validate_envelope(jsonrpc: &str, method: &str) -> McpResult<()> {
    if jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{jsonrpc}\""
        )));
    }

    if method.is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// A structural check over a method's raw `params`.
pub type ParamCheck = fn(Option<&Value>) -> Result<(), ValidationError>;

#[derive(Clone)]
pub struct ParamValidator {
    checks: HashMap<&'static str, ParamCheck>,
}

impl Default for ParamValidator {
    fn default() -> Self {
        let mut validator = Self::empty();
        validator.register("initialize", check_initialize);
        validator.register("resources/read", check_resource_read);
        validator.register("tools/call", check_tool_call);
        validator.register("completion/complete", check_complete);
        validator
    }
}

impl ParamValidator {
    pub fn empty() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Install (or replace) the check for a method.
    pub fn register(&mut self, method: &'static str, check: ParamCheck) {
        self.checks.insert(method, check);
    }

    pub fn validate(&self, method: &str, params: Option<&Value>) -> Result<(), ValidationError> {
        match self.checks.get(method) {
            Some(check) => check(params),
            None => Ok(()),
        }
    }
}

fn as_object(params: Option<&Value>) -> Option<&Map<String, Value>> {
    params.and_then(Value::as_object)
}

/// Collect every absent field with its reason, so callers see them all at once.
fn missing_fields(
    params: &Map<String, Value>,
    required: &[(&str, &str)],
) -> BTreeMap<String, String> {
    required
        .iter()
        .filter(|(field, _)| !params.contains_key(*field))
        .map(|(field, reason)| (field.to_string(), reason.to_string()))
        .collect()
}

fn check_initialize(params: Option<&Value>) -> Result<(), ValidationError> {
    let params = as_object(params).ok_or_else(|| {
        ValidationError::new(
            "Initialize request requires params with protocolVersion, capabilities, and clientInfo",
        )
    })?;

    let missing = missing_fields(
        params,
        &[
            (
                "protocolVersion",
                "Protocol version is required for version negotiation",
            ),
            (
                "capabilities",
                "Client capabilities are required for capability negotiation",
            ),
            ("clientInfo", "Client implementation information is required"),
        ],
    );
    if !missing.is_empty() {
        return Err(ValidationError::missing(
            "Initialize request missing required fields",
            missing,
        ));
    }

    if !params["protocolVersion"].is_string() {
        return Err(ValidationError::new("protocolVersion must be a string"));
    }
    if !params["capabilities"].is_object() {
        return Err(ValidationError::new("capabilities must be an object"));
    }
    let client_info = params["clientInfo"]
        .as_object()
        .ok_or_else(|| ValidationError::new("clientInfo must be an object"))?;
    if !client_info.contains_key("name") || !client_info.contains_key("version") {
        return Err(ValidationError::new(
            "clientInfo must include name and version",
        ));
    }

    Ok(())
}

fn check_resource_read(params: Option<&Value>) -> Result<(), ValidationError> {
    match as_object(params) {
        Some(p) if p.contains_key("uri") => Ok(()),
        _ => Err(ValidationError::new(
            "resources/read request requires uri parameter",
        )),
    }
}

fn check_tool_call(params: Option<&Value>) -> Result<(), ValidationError> {
    match as_object(params) {
        Some(p) if p.contains_key("name") => Ok(()),
        _ => Err(ValidationError::new(
            "tools/call request requires name parameter",
        )),
    }
}

fn check_complete(params: Option<&Value>) -> Result<(), ValidationError> {
    let params = as_object(params).ok_or_else(|| {
        ValidationError::new("completion/complete request requires ref and argument parameters")
    })?;

    let missing = missing_fields(
        params,
        &[
            ("ref", "Reference to resource or prompt is required"),
            ("argument", "Completion argument is required"),
        ],
    );
    if !missing.is_empty() {
        return Err(ValidationError::missing(
            "completion/complete request missing required fields",
            missing,
        ));
    }

    Ok(())
}
