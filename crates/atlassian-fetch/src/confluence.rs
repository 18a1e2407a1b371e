//! Confluence REST provider.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{str_at, RestClient};
use crate::config::AtlassianConfig;
use crate::markup::to_plain_text;
use crate::provider::WikiProvider;
use crate::types::{Comment, CommentMeta, FetchError, FetchResult, Page, PageMeta, Space};

const PAGE_EXPAND: &str = "body.storage,version,space";
/// Size of the single page requested from listing endpoints.
const LISTING_LIMIT: u32 = 100;

pub struct ConfluenceClient {
    rest: RestClient,
}

impl ConfluenceClient {
    pub fn new(config: &AtlassianConfig) -> FetchResult<Self> {
        Ok(Self {
            rest: RestClient::new(config)?,
        })
    }

    fn page_from_json(&self, v: &Value) -> Page {
        let webui = str_at(v, "/_links/webui");
        Page {
            metadata: PageMeta {
                page_id: str_at(v, "/id"),
                title: str_at(v, "/title"),
                space: str_at(v, "/space/key"),
                url: if webui.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", self.rest.base_url(), webui)
                },
                last_modified: str_at(v, "/version/when"),
                content_type: str_at(v, "/type"),
            },
            content: to_plain_text(&str_at(v, "/body/storage/value")),
        }
    }

    fn pages_from_results(&self, body: &Value) -> FetchResult<Vec<Page>> {
        results(body).map(|items| items.iter().map(|v| self.page_from_json(v)).collect())
    }
}

fn results(body: &Value) -> FetchResult<&Vec<Value>> {
    body.get("results")
        .and_then(|r| r.as_array())
        .ok_or_else(|| FetchError::Decode("missing 'results' array".to_string()))
}

#[async_trait]
impl WikiProvider for ConfluenceClient {
    async fn spaces(&self) -> FetchResult<Vec<Space>> {
        let body = self
            .rest
            .get_json(
                &["rest", "api", "space"],
                &[
                    ("limit", LISTING_LIMIT.to_string()),
                    ("expand", "description.plain".to_string()),
                ],
            )
            .await?;

        Ok(results(&body)?
            .iter()
            .map(|s| Space {
                key: str_at(s, "/key"),
                name: str_at(s, "/name"),
                description: s
                    .pointer("/description/plain/value")
                    .and_then(|d| d.as_str())
                    .map(String::from),
            })
            .collect())
    }

    async fn space_pages(&self, space_key: &str) -> FetchResult<Vec<Page>> {
        let body = self
            .rest
            .get_json(
                &["rest", "api", "content"],
                &[
                    ("spaceKey", space_key.to_string()),
                    ("type", "page".to_string()),
                    ("limit", LISTING_LIMIT.to_string()),
                    ("expand", PAGE_EXPAND.to_string()),
                ],
            )
            .await?;
        self.pages_from_results(&body)
    }

    async fn page_by_title(&self, space_key: &str, title: &str) -> FetchResult<Option<Page>> {
        let body = self
            .rest
            .get_json(
                &["rest", "api", "content"],
                &[
                    ("spaceKey", space_key.to_string()),
                    ("title", title.to_string()),
                    ("type", "page".to_string()),
                    ("expand", PAGE_EXPAND.to_string()),
                ],
            )
            .await?;
        Ok(self.pages_from_results(&body)?.into_iter().next())
    }

    async fn search(&self, cql: &str, limit: i64) -> FetchResult<Vec<Page>> {
        let body = self
            .rest
            .get_json(
                &["rest", "api", "content", "search"],
                &[
                    ("cql", cql.to_string()),
                    ("limit", limit.to_string()),
                    ("expand", PAGE_EXPAND.to_string()),
                ],
            )
            .await?;
        self.pages_from_results(&body)
    }

    async fn page(&self, page_id: &str) -> FetchResult<Page> {
        let body = self
            .rest
            .get_json(
                &["rest", "api", "content", page_id],
                &[("expand", PAGE_EXPAND.to_string())],
            )
            .await
            .map_err(|e| match e {
                FetchError::NotFound(_) => FetchError::NotFound(format!("page {page_id}")),
                other => other,
            })?;
        Ok(self.page_from_json(&body))
    }

    async fn page_comments(&self, page_id: &str) -> FetchResult<Vec<Comment>> {
        let body = self
            .rest
            .get_json(
                &["rest", "api", "content", page_id, "child", "comment"],
                &[
                    ("expand", "body.view,version".to_string()),
                    ("depth", "all".to_string()),
                ],
            )
            .await?;

        Ok(results(&body)?
            .iter()
            .map(|c| Comment {
                metadata: CommentMeta {
                    comment_id: str_at(c, "/id"),
                    author_name: str_at(c, "/version/by/displayName"),
                    last_modified: str_at(c, "/version/when"),
                },
                content: to_plain_text(&str_at(c, "/body/view/value")),
            })
            .collect())
    }
}
