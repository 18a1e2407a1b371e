//! Authenticated JSON-over-HTTP client shared by the Confluence and Jira providers.
//!
//! One GET per call. No retry and no pagination: callers get exactly what the
//! first page of the endpoint returns.

use std::time::Duration;

use serde_json::Value;

use crate::config::AtlassianConfig;
use crate::types::{FetchError, FetchResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper over `reqwest::Client` bound to one Atlassian base URL.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    api_token: String,
}

impl RestClient {
    pub fn new(config: &AtlassianConfig) -> FetchResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("atlassian-fetch/", env!("CARGO_PKG_VERSION")));

        if let Some(path) = &config.ca_bundle {
            let pem = std::fs::read(path)?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                FetchError::Config(format!("Invalid CA bundle {}: {e}", path.display()))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            username: config.username.clone(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/{segments...}` with the given query pairs and decode the
    /// JSON body. Each segment is percent-encoded, so an id can never escape
    /// its place in the path.
    ///
    /// 404 maps to [`FetchError::NotFound`], any other non-success status to
    /// [`FetchError::Http`] with the status attached.
    pub async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> FetchResult<Value> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {url}");
        let path = url.path().to_string();

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.api_token))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: Some(status.as_u16()),
                message: truncate(&body, 200),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn endpoint(&self, segments: &[&str]) -> FetchResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| FetchError::Config(format!("Invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Config(format!("Base URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Read a string at a JSON pointer, defaulting to empty.
pub(crate) fn str_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
