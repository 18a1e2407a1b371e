//! Provider traits the MCP server calls into for domain data.

use async_trait::async_trait;

use crate::types::{Comment, FetchResult, Issue, Page, Project, Space};

/// Read access to a wiki (Confluence).
#[async_trait]
pub trait WikiProvider: Send + Sync {
    /// All spaces visible to the configured user.
    async fn spaces(&self) -> FetchResult<Vec<Space>>;

    /// All pages in a space, with bodies.
    async fn space_pages(&self, space_key: &str) -> FetchResult<Vec<Page>>;

    /// Look up a single page by its title within a space.
    async fn page_by_title(&self, space_key: &str, title: &str) -> FetchResult<Option<Page>>;

    /// Run a CQL query. `limit` is forwarded unchanged.
    async fn search(&self, cql: &str, limit: i64) -> FetchResult<Vec<Page>>;

    async fn page(&self, page_id: &str) -> FetchResult<Page>;

    async fn page_comments(&self, page_id: &str) -> FetchResult<Vec<Comment>>;
}

/// Read access to an issue tracker (Jira).
#[async_trait]
pub trait TrackerProvider: Send + Sync {
    async fn projects(&self) -> FetchResult<Vec<Project>>;

    /// Issues of a project, newest first. `None` means the provider default.
    async fn project_issues(&self, project_key: &str, limit: Option<i64>) -> FetchResult<Vec<Issue>>;

    async fn issue(&self, issue_key: &str, expand: Option<&str>) -> FetchResult<Issue>;

    /// Run a JQL query. `limit` is forwarded unchanged.
    async fn search_issues(&self, jql: &str, fields: &str, limit: i64) -> FetchResult<Vec<Issue>>;
}
