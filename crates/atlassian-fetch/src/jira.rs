//! Jira REST provider.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{str_at, RestClient};
use crate::config::AtlassianConfig;
use crate::provider::TrackerProvider;
use crate::types::{FetchError, FetchResult, Issue, IssueMeta, Project};

/// `maxResults` used when a project listing does not ask for a limit.
const DEFAULT_PROJECT_LIMIT: i64 = 50;

pub struct JiraClient {
    rest: RestClient,
}

impl JiraClient {
    pub fn new(config: &AtlassianConfig) -> FetchResult<Self> {
        Ok(Self {
            rest: RestClient::new(config)?,
        })
    }

    fn issue_from_json(&self, v: &Value) -> Issue {
        let key = str_at(v, "/key");
        Issue {
            metadata: IssueMeta {
                link: format!("{}/browse/{}", self.rest.base_url(), key),
                title: str_at(v, "/fields/summary"),
                issue_type: str_at(v, "/fields/issuetype/name"),
                status: str_at(v, "/fields/status/name"),
                created_date: str_at(v, "/fields/created"),
                priority: str_at(v, "/fields/priority/name"),
                key,
            },
            content: str_at(v, "/fields/description"),
        }
    }
}

#[async_trait]
impl TrackerProvider for JiraClient {
    async fn projects(&self) -> FetchResult<Vec<Project>> {
        let body = self.rest.get_json(&["rest", "api", "2", "project"], &[]).await?;
        let items = body
            .as_array()
            .ok_or_else(|| FetchError::Decode("expected a project array".to_string()))?;

        Ok(items
            .iter()
            .map(|p| Project {
                key: str_at(p, "/key"),
                name: str_at(p, "/name"),
                description: p
                    .get("description")
                    .and_then(|d| d.as_str())
                    .map(String::from),
            })
            .collect())
    }

    async fn project_issues(&self, project_key: &str, limit: Option<i64>) -> FetchResult<Vec<Issue>> {
        let jql = format!("project = \"{project_key}\" ORDER BY created DESC");
        self.search_issues(&jql, "*all", limit.unwrap_or(DEFAULT_PROJECT_LIMIT))
            .await
    }

    async fn issue(&self, issue_key: &str, expand: Option<&str>) -> FetchResult<Issue> {
        let mut query = Vec::new();
        if let Some(expand) = expand {
            query.push(("expand", expand.to_string()));
        }

        let body = self
            .rest
            .get_json(&["rest", "api", "2", "issue", issue_key], &query)
            .await
            .map_err(|e| match e {
                FetchError::NotFound(_) => FetchError::NotFound(format!("issue {issue_key}")),
                other => other,
            })?;
        Ok(self.issue_from_json(&body))
    }

    async fn search_issues(&self, jql: &str, fields: &str, limit: i64) -> FetchResult<Vec<Issue>> {
        let body = self
            .rest
            .get_json(
                &["rest", "api", "2", "search"],
                &[
                    ("jql", jql.to_string()),
                    ("fields", fields.to_string()),
                    ("maxResults", limit.to_string()),
                ],
            )
            .await?;

        let issues = body
            .get("issues")
            .and_then(|i| i.as_array())
            .ok_or_else(|| FetchError::Decode("missing 'issues' array".to_string()))?;

        Ok(issues.iter().map(|v| self.issue_from_json(v)).collect())
    }
}
