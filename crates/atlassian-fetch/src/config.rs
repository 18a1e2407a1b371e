//! Connection settings for the Confluence and Jira REST endpoints.

use std::path::PathBuf;

use crate::types::{FetchError, FetchResult};

/// Which Atlassian product a configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Confluence,
    Jira,
}

impl Service {
    fn env_prefix(self) -> &'static str {
        match self {
            Service::Confluence => "CONFLUENCE",
            Service::Jira => "JIRA",
        }
    }
}

/// Base URL and credentials for one Atlassian product.
#[derive(Debug, Clone)]
pub struct AtlassianConfig {
    pub url: String,
    pub username: String,
    pub api_token: String,
    /// PEM bundle used instead of the built-in roots, when set.
    pub ca_bundle: Option<PathBuf>,
}

impl AtlassianConfig {
    pub fn new(url: &str, username: &str, api_token: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            api_token: api_token.to_string(),
            ca_bundle: None,
        }
    }

    pub fn with_ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(path.into());
        self
    }

    /// Read `{CONFLUENCE,JIRA}_URL`, `_USERNAME`, `_API_TOKEN` and the
    /// optional `REQUESTS_CA_BUNDLE` from the environment.
    pub fn from_env(service: Service) -> FetchResult<Self> {
        Self::from_lookup(service, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(service: Service, lookup: F) -> FetchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = service.env_prefix();
        let read = |suffix: &str| -> FetchResult<String> {
            let key = format!("{prefix}_{suffix}");
            lookup(&key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| FetchError::Config(format!("{key} is not set")))
        };

        let mut config = Self::new(&read("URL")?, &read("USERNAME")?, &read("API_TOKEN")?);
        if let Some(bundle) = lookup("REQUESTS_CA_BUNDLE").filter(|v| !v.trim().is_empty()) {
            config = config.with_ca_bundle(bundle);
        }
        Ok(config)
    }
}
