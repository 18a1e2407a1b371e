//! Tool: jira_get_issue. Fetch one issue by key.

use serde_json::{json, Value};

use crate::context::ServerContext;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::args::{optional_str, required_str};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "jira_get_issue".to_string(),
        description: Some("Get details of a specific Jira issue".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "issue_key": {
                    "type": "string",
                    "description": "Jira issue key (e.g., 'PROJ-123')"
                },
                "expand": {
                    "type": "string",
                    "description": "Optional fields to expand",
                    "default": null
                }
            },
            "required": ["issue_key"]
        }),
    }
}

pub async fn execute(args: Value, ctx: &ServerContext) -> McpResult<ToolCallResult> {
    let issue_key = required_str(&args, "issue_key")?;
    let expand = optional_str(&args, "expand")?;
    tracing::debug!("Fetching Jira issue: {issue_key}");

    let issue = ctx.tracker.issue(issue_key, expand).await?;
    Ok(ToolCallResult::json(&json!({
        "content": issue.content,
        "metadata": issue.metadata,
    })))
}
