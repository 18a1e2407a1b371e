//! Tool registration and dispatch.

use serde_json::Value;

use atlassian_fetch::FetchError;

use crate::context::ServerContext;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{
    confluence_get_comments, confluence_get_page, confluence_search, jira_get_issue,
    jira_get_project_issues, jira_search,
};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            confluence_search::definition(),
            confluence_get_page::definition(),
            confluence_get_comments::definition(),
            jira_get_issue::definition(),
            jira_search::definition(),
            jira_get_project_issues::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        ctx: &ServerContext,
    ) -> McpResult<ToolCallResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));
        tracing::debug!(tool = name, "Executing tool with arguments: {args}");

        let result = match name {
            "confluence_search" => confluence_search::execute(args, ctx).await,
            "confluence_get_page" => confluence_get_page::execute(args, ctx).await,
            "confluence_get_comments" => confluence_get_comments::execute(args, ctx).await,
            "jira_get_issue" => jira_get_issue::execute(args, ctx).await,
            "jira_search" => jira_search::execute(args, ctx).await,
            "jira_get_project_issues" => jira_get_project_issues::execute(args, ctx).await,
            _ => return Err(McpError::UnknownTool(name.to_string())),
        };

        result.map_err(|e| match e {
            McpError::Provider(err) => collapse_provider_error(name, err),
            other => other,
        })
    }
}

/// Provider detail stays in the logs; the client only learns the call failed,
/// or which identifier was not found.
fn collapse_provider_error(tool: &str, err: FetchError) -> McpError {
    match err {
        FetchError::NotFound(what) => {
            tracing::warn!(tool, "Tool target not found: {what}");
            McpError::ResourceNotFound(what)
        }
        err => {
            match err.status_code() {
                Some(status) => tracing::error!(tool, status, "Tool execution error: {err}"),
                None => tracing::error!(tool, "Tool execution error: {err}"),
            }
            McpError::ToolExecutionFailed
        }
    }
}
