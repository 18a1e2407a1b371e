//! Tool: confluence_get_comments. List the comments on a page.

use serde_json::{json, Value};

use crate::context::ServerContext;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::args::required_str;

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "confluence_get_comments".to_string(),
        description: Some("Get comments for a specific Confluence page".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "page_id": { "type": "string", "description": "Confluence page ID" }
            },
            "required": ["page_id"]
        }),
    }
}

pub async fn execute(args: Value, ctx: &ServerContext) -> McpResult<ToolCallResult> {
    let page_id = required_str(&args, "page_id")?;
    tracing::debug!("Fetching comments for page: {page_id}");

    let comments: Vec<Value> = ctx
        .wiki
        .page_comments(page_id)
        .await?
        .into_iter()
        .map(|c| {
            json!({
                "author": c.metadata.author_name,
                "created": c.metadata.last_modified,
                "content": c.content,
            })
        })
        .collect();

    tracing::debug!("Found {} comments", comments.len());
    Ok(ToolCallResult::json(&comments))
}
