//! Provider handles shared by every request the engine serves.

use std::sync::Arc;

use atlassian_fetch::{
    AtlassianConfig, ConfluenceClient, FetchResult, JiraClient, Service, TrackerProvider,
    WikiProvider,
};

/// Built once at startup and cloned into every handler task.
#[derive(Clone)]
pub struct ServerContext {
    pub wiki: Arc<dyn WikiProvider>,
    pub tracker: Arc<dyn TrackerProvider>,
}

impl ServerContext {
    pub fn new(wiki: Arc<dyn WikiProvider>, tracker: Arc<dyn TrackerProvider>) -> Self {
        Self { wiki, tracker }
    }

    /// REST-backed providers configured from `CONFLUENCE_*`, `JIRA_*` and
    /// `REQUESTS_CA_BUNDLE`.
    pub fn from_env() -> FetchResult<Self> {
        let wiki = ConfluenceClient::new(&AtlassianConfig::from_env(Service::Confluence)?)?;
        let tracker = JiraClient::new(&AtlassianConfig::from_env(Service::Jira)?)?;
        tracing::info!("Confluence and Jira providers configured");
        Ok(Self::new(Arc::new(wiki), Arc::new(tracker)))
    }
}
