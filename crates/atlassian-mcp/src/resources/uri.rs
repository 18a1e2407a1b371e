//! Parsing of `wiki://` and `tracker://` resource URIs.

use crate::types::{McpError, McpResult};

pub const WIKI_SCHEME: &str = "wiki://";
pub const TRACKER_SCHEME: &str = "tracker://";

/// Accepted on read as aliases of the canonical schemes.
const WIKI_ALIAS: &str = "confluence://";
const TRACKER_ALIAS: &str = "jira://";

/// A parsed resource address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// `wiki://{space}`
    Space { space: String },
    /// `wiki://{space}/pages/{title}`
    Page { space: String, title: String },
    /// `tracker://{project}`
    Project { project: String },
    /// `tracker://{project}/issues/{key}`
    Issue { project: String, key: String },
}

impl ResourceUri {
    /// Path segments past the third are ignored. Titles are taken verbatim,
    /// without percent-decoding.
    pub fn parse(uri: &str) -> McpResult<Self> {
        let invalid = || McpError::InvalidResourceUri(uri.to_string());

        if let Some(rest) = strip_scheme(uri, WIKI_SCHEME, WIKI_ALIAS) {
            let parts: Vec<&str> = rest.split('/').collect();
            match parts.as_slice() {
                [space] if !space.is_empty() => Ok(Self::Space {
                    space: space.to_string(),
                }),
                [space, "pages", title, ..] if !space.is_empty() && !title.is_empty() => {
                    Ok(Self::Page {
                        space: space.to_string(),
                        title: title.to_string(),
                    })
                }
                _ => Err(invalid()),
            }
        } else if let Some(rest) = strip_scheme(uri, TRACKER_SCHEME, TRACKER_ALIAS) {
            let parts: Vec<&str> = rest.split('/').collect();
            match parts.as_slice() {
                [project] if !project.is_empty() => Ok(Self::Project {
                    project: project.to_string(),
                }),
                [project, "issues", key, ..] if !project.is_empty() && !key.is_empty() => {
                    Ok(Self::Issue {
                        project: project.to_string(),
                        key: key.to_string(),
                    })
                }
                _ => Err(invalid()),
            }
        } else {
            Err(invalid())
        }
    }
}

fn strip_scheme<'a>(uri: &'a str, scheme: &str, alias: &str) -> Option<&'a str> {
    uri.strip_prefix(scheme).or_else(|| uri.strip_prefix(alias))
}

pub fn space_uri(key: &str) -> String {
    format!("{WIKI_SCHEME}{key}")
}

pub fn project_uri(key: &str) -> String {
    format!("{TRACKER_SCHEME}{key}")
}
