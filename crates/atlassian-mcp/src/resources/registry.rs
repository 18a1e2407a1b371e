//! Resource registration and dispatch.

use atlassian_fetch::FetchError;

use crate::context::ServerContext;
use crate::types::{
    McpError, McpResult, ReadResourceResult, ResourceDefinition, ResourceTemplateDefinition,
};

use super::uri::ResourceUri;
use super::{templates, tracker, wiki};

pub struct ResourceRegistry;

impl ResourceRegistry {
    pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
        templates::list_templates()
    }

    /// Spaces and projects, queried independently. A failing provider is
    /// logged and left out; the listing itself never fails.
    pub async fn list_resources(ctx: &ServerContext) -> Vec<ResourceDefinition> {
        let (spaces, projects) = tokio::join!(wiki::list(ctx), tracker::list(ctx));

        let mut resources = Vec::new();
        for (source, listed) in [("Confluence spaces", spaces), ("Jira projects", projects)] {
            match listed {
                Ok(found) => resources.extend(found),
                Err(e) => log_listing_failure(source, &e),
            }
        }

        tracing::info!("Listed {} total resources", resources.len());
        resources
    }

    pub async fn read(uri: &str, ctx: &ServerContext) -> McpResult<ReadResourceResult> {
        let text = match ResourceUri::parse(uri)? {
            ResourceUri::Space { space } => wiki::read_space(&space, ctx).await,
            ResourceUri::Page { space, title } => wiki::read_page(&space, &title, ctx).await,
            ResourceUri::Project { project } => tracker::read_project(&project, ctx).await,
            ResourceUri::Issue { key, .. } => tracker::read_issue(&key, ctx).await,
        }
        .map_err(|e| collapse_provider_error(uri, e))?;

        Ok(ReadResourceResult::text(uri, text))
    }
}

fn log_listing_failure(source: &str, err: &McpError) {
    let status = match err {
        McpError::Provider(fetch) => fetch.status_code(),
        _ => None,
    };
    match status {
        Some(status) => tracing::error!(status, "Error fetching {source}: {err}"),
        None => tracing::error!("Error fetching {source}: {err}"),
    }
}

fn collapse_provider_error(uri: &str, err: McpError) -> McpError {
    match err {
        McpError::Provider(FetchError::NotFound(what)) => {
            tracing::warn!(uri, "Resource target not found: {what}");
            McpError::ResourceNotFound(what)
        }
        McpError::Provider(fetch) => {
            match fetch.status_code() {
                Some(status) => tracing::error!(uri, status, "Resource read error: {fetch}"),
                None => tracing::error!(uri, "Resource read error: {fetch}"),
            }
            McpError::ResourceReadFailed
        }
        other => other,
    }
}
