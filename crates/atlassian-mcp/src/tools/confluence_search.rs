//! Tool: confluence_search. Run a CQL query against Confluence.

use serde_json::{json, Value};

use crate::context::ServerContext;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::args::{effective_limit, read_limit, required_str};

const QUERY_HELP: &str = "CQL (Confluence Query Language) query string (e.g. 'type=page AND space=DEV').

Every query should name a space, otherwise it will likely return no results.

The \"~\" operator matches text fields such as title and text, either exactly or fuzzily. \
Wildcards must be quoted: \"?\" matches one character, \"*\" matches many.

Examples:
title ~ win
text ~ \"te?t\"
text ~ \"win*\"
type=page AND space=DEV AND (text ~ \"release notes\" OR text ~ \"changelog\")
creator = currentUser() and mention != currentUser()
created > now(\"-4w\")
lastModified < startOfYear() and type = page
creator = jsmith order by created, title asc";

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "confluence_search".to_string(),
        description: Some("Search Confluence content using CQL".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": QUERY_HELP },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of results (1-50)",
                    "default": 10,
                    "minimum": 1,
                    "maximum": 50
                }
            },
            "required": ["query"]
        }),
    }
}

pub async fn execute(args: Value, ctx: &ServerContext) -> McpResult<ToolCallResult> {
    let query = required_str(&args, "query")?;
    let limit = effective_limit(read_limit(&args)?);
    tracing::debug!("Searching Confluence with query: {query} (limit: {limit})");

    let pages = ctx.wiki.search(query, limit).await?;
    let results: Vec<Value> = pages
        .into_iter()
        .map(|page| {
            let meta = page.metadata;
            json!({
                "page_id": meta.page_id,
                "title": meta.title,
                "space": meta.space,
                "url": meta.url,
                "last_modified": meta.last_modified,
                "type": meta.content_type,
                "excerpt": page.content,
            })
        })
        .collect();

    tracing::debug!("Found {} Confluence search results", results.len());
    Ok(ToolCallResult::json(&results))
}
