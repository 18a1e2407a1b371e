//! Tool: confluence_get_page. Fetch one page by id.

use serde_json::{json, Value};

use crate::context::ServerContext;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::args::{bool_or, required_str};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "confluence_get_page".to_string(),
        description: Some("Get content of a specific Confluence page by ID".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "page_id": { "type": "string", "description": "Confluence page ID" },
                "include_metadata": {
                    "type": "boolean",
                    "description": "Whether to include page metadata",
                    "default": true
                }
            },
            "required": ["page_id"]
        }),
    }
}

pub async fn execute(args: Value, ctx: &ServerContext) -> McpResult<ToolCallResult> {
    let page_id = required_str(&args, "page_id")?;
    let include_metadata = bool_or(&args, "include_metadata", true)?;
    tracing::debug!("Fetching Confluence page: {page_id}");

    let page = ctx.wiki.page(page_id).await?;
    let result = if include_metadata {
        json!({ "content": page.content, "metadata": page.metadata })
    } else {
        json!({ "content": page.content })
    };

    Ok(ToolCallResult::json(&result))
}
