//! Core data types for wiki and tracker records.

use serde::{Deserialize, Serialize};

/// A Confluence space, as returned by the space listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A Jira project, as returned by the project listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Metadata attached to a wiki page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page_id: String,
    pub title: String,
    pub space: String,
    pub url: String,
    pub last_modified: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// A wiki page: its metadata and plain-text body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub metadata: PageMeta,
    pub content: String,
}

/// Metadata attached to a page comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentMeta {
    pub comment_id: String,
    pub author_name: String,
    pub last_modified: String,
}

/// A comment left on a wiki page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub metadata: CommentMeta,
    pub content: String,
}

/// Metadata attached to a tracker issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueMeta {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub status: String,
    pub created_date: String,
    pub priority: String,
    pub link: String,
}

/// A tracker issue: its metadata and plain-text description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub metadata: IssueMeta,
    pub content: String,
}

/// Errors raised by the data providers.
///
/// `Http` carries the response status when the failure came back from the
/// server, so callers can log it without inspecting the transport error.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP {}: {message}", display_status(.status))]
    Http { status: Option<u16>, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// HTTP status code of the failed call, when there was a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => *status,
            FetchError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "error".to_string())
}

/// Convenience result type.
pub type FetchResult<T> = Result<T, FetchError>;
