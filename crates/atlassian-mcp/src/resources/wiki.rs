//! Wiki-backed resources: one per Confluence space.

use crate::context::ServerContext;
use crate::types::{McpError, McpResult, ResourceDefinition};

use super::uri::space_uri;

pub async fn list(ctx: &ServerContext) -> McpResult<Vec<ResourceDefinition>> {
    let spaces = ctx.wiki.spaces().await?;
    tracing::debug!("Found {} Confluence spaces", spaces.len());

    Ok(spaces
        .into_iter()
        .map(|space| ResourceDefinition {
            uri: space_uri(&space.key),
            name: format!("Confluence Space: {}", space.name),
            description: Some(space.description.unwrap_or_default()),
            mime_type: Some("text/plain".to_string()),
        })
        .collect())
}

/// Every page of the space as `# {title}\n\n{body}\n---`, joined by blank lines.
pub async fn read_space(space: &str, ctx: &ServerContext) -> McpResult<String> {
    let pages = ctx.wiki.space_pages(space).await?;
    Ok(pages
        .iter()
        .map(|page| format!("# {}\n\n{}\n---", page.metadata.title, page.content))
        .collect::<Vec<_>>()
        .join("\n\n"))
}

pub async fn read_page(space: &str, title: &str, ctx: &ServerContext) -> McpResult<String> {
    match ctx.wiki.page_by_title(space, title).await? {
        Some(page) => Ok(page.content),
        None => Err(McpError::ResourceNotFound(title.to_string())),
    }
}
