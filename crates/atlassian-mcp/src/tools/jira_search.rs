//! Tool: jira_search. Run a JQL query against Jira.

use serde_json::{json, Value};

use crate::context::ServerContext;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::args::{effective_limit, optional_str, read_limit, required_str};

const DEFAULT_FIELDS: &str = "*all";
const EXCERPT_CHARS: usize = 500;

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "jira_search".to_string(),
        description: Some("Search Jira issues using JQL".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "jql": { "type": "string", "description": "JQL query string" },
                "fields": {
                    "type": "string",
                    "description": "Comma-separated fields to return",
                    "default": DEFAULT_FIELDS
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of results (1-50)",
                    "default": 10,
                    "minimum": 1,
                    "maximum": 50
                }
            },
            "required": ["jql"]
        }),
    }
}

/// First 500 characters plus `...`, or the whole body when it fits.
pub fn excerpt(body: &str) -> String {
    if body.chars().count() > EXCERPT_CHARS {
        let head: String = body.chars().take(EXCERPT_CHARS).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

pub async fn execute(args: Value, ctx: &ServerContext) -> McpResult<ToolCallResult> {
    let jql = required_str(&args, "jql")?;
    let fields = optional_str(&args, "fields")?.unwrap_or(DEFAULT_FIELDS);
    let limit = effective_limit(read_limit(&args)?);
    tracing::debug!("Searching Jira with JQL: {jql} (limit: {limit})");

    let issues = ctx.tracker.search_issues(jql, fields, limit).await?;
    let results: Vec<Value> = issues
        .into_iter()
        .map(|issue| {
            let meta = issue.metadata;
            json!({
                "key": meta.key,
                "title": meta.title,
                "type": meta.issue_type,
                "status": meta.status,
                "created_date": meta.created_date,
                "priority": meta.priority,
                "link": meta.link,
                "excerpt": excerpt(&issue.content),
            })
        })
        .collect();

    tracing::debug!("Found {} Jira search results", results.len());
    Ok(ToolCallResult::json(&results))
}
