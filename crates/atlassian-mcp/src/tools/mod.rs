//! MCP tool implementations.

pub mod args;
pub mod confluence_get_comments;
pub mod confluence_get_page;
pub mod confluence_search;
pub mod jira_get_issue;
pub mod jira_get_project_issues;
pub mod jira_search;
pub mod registry;

pub use registry::ToolRegistry;
