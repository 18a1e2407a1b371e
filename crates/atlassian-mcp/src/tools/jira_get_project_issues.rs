//! Tool: jira_get_project_issues. Newest issues of a project.

use serde_json::{json, Value};

use crate::context::ServerContext;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::args::{effective_limit, read_limit, required_str};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "jira_get_project_issues".to_string(),
        description: Some("Get all issues for a specific Jira project".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "project_key": { "type": "string", "description": "The project key" },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of results (1-50)",
                    "default": 10,
                    "minimum": 1,
                    "maximum": 50
                }
            },
            "required": ["project_key"]
        }),
    }
}

pub async fn execute(args: Value, ctx: &ServerContext) -> McpResult<ToolCallResult> {
    let project_key = required_str(&args, "project_key")?;
    let limit = effective_limit(read_limit(&args)?);
    tracing::debug!("Fetching issues for project: {project_key} (limit: {limit})");

    let issues: Vec<Value> = ctx
        .tracker
        .project_issues(project_key, Some(limit))
        .await?
        .into_iter()
        .map(|issue| {
            let meta = issue.metadata;
            json!({
                "key": meta.key,
                "title": meta.title,
                "type": meta.issue_type,
                "status": meta.status,
                "created_date": meta.created_date,
                "link": meta.link,
            })
        })
        .collect();

    tracing::debug!("Found {} project issues", issues.len());
    Ok(ToolCallResult::json(&issues))
}
