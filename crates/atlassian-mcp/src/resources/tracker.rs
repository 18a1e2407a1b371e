//! Tracker-backed resources: one per Jira project.

use crate::context::ServerContext;
use crate::types::{McpResult, ResourceDefinition};

use super::uri::project_uri;

pub async fn list(ctx: &ServerContext) -> McpResult<Vec<ResourceDefinition>> {
    let projects = ctx.tracker.projects().await?;
    tracing::debug!("Found {} Jira projects", projects.len());

    Ok(projects
        .into_iter()
        .map(|project| ResourceDefinition {
            uri: project_uri(&project.key),
            name: format!("Jira Project: {}", project.name),
            description: Some(project.description.unwrap_or_default()),
            mime_type: Some("text/plain".to_string()),
        })
        .collect())
}

/// Every issue of the project as `# {key}: {title}\n\n{body}\n---`, joined by
/// blank lines.
pub async fn read_project(project: &str, ctx: &ServerContext) -> McpResult<String> {
    let issues = ctx.tracker.project_issues(project, None).await?;
    Ok(issues
        .iter()
        .map(|issue| {
            format!(
                "# {}: {}\n\n{}\n---",
                issue.metadata.key, issue.metadata.title, issue.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n"))
}

pub async fn read_issue(key: &str, ctx: &ServerContext) -> McpResult<String> {
    Ok(ctx.tracker.issue(key, None).await?.content)
}
