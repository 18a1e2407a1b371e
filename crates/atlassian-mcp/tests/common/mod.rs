//! Shared fixtures: in-memory providers and JSON-RPC helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use atlassian_fetch::{
    Comment, CommentMeta, FetchError, FetchResult, Issue, IssueMeta, Page, PageMeta, Project,
    Space, TrackerProvider, WikiProvider,
};
use atlassian_mcp::protocol::ProtocolHandler;
use atlassian_mcp::types::JsonRpcMessage;
use atlassian_mcp::ServerContext;

/// How a fake provider answers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Mode {
    #[default]
    Healthy,
    /// Every call fails with this HTTP status.
    Fail(u16),
    /// Every call waits forever.
    Hang,
    /// Every call answers after this many seconds.
    Slow(u64),
}

impl Mode {
    async fn gate(self) -> FetchResult<()> {
        match self {
            Mode::Healthy => Ok(()),
            Mode::Fail(status) => Err(FetchError::Http {
                status: Some(status),
                message: "upstream exploded".to_string(),
            }),
            Mode::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Mode::Slow(secs) => {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct FakeWiki {
    pub mode: Mode,
    pub spaces: Vec<Space>,
    pub pages: Vec<Page>,
    pub comments: Vec<Comment>,
    pub last_limit: Mutex<Option<i64>>,
}

#[async_trait]
impl WikiProvider for FakeWiki {
    async fn spaces(&self) -> FetchResult<Vec<Space>> {
        self.mode.gate().await?;
        Ok(self.spaces.clone())
    }

    async fn space_pages(&self, space_key: &str) -> FetchResult<Vec<Page>> {
        self.mode.gate().await?;
        Ok(self
            .pages
            .iter()
            .filter(|p| p.metadata.space == space_key)
            .cloned()
            .collect())
    }

    async fn page_by_title(&self, space_key: &str, title: &str) -> FetchResult<Option<Page>> {
        self.mode.gate().await?;
        Ok(self
            .pages
            .iter()
            .find(|p| p.metadata.space == space_key && p.metadata.title == title)
            .cloned())
    }

    async fn search(&self, _cql: &str, limit: i64) -> FetchResult<Vec<Page>> {
        *self.last_limit.lock().unwrap() = Some(limit);
        self.mode.gate().await?;
        Ok(self.pages.clone())
    }

    async fn page(&self, page_id: &str) -> FetchResult<Page> {
        self.mode.gate().await?;
        self.pages
            .iter()
            .find(|p| p.metadata.page_id == page_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("page {page_id}")))
    }

    async fn page_comments(&self, _page_id: &str) -> FetchResult<Vec<Comment>> {
        self.mode.gate().await?;
        Ok(self.comments.clone())
    }
}

#[derive(Default)]
pub struct FakeTracker {
    pub mode: Mode,
    pub projects: Vec<Project>,
    pub issues: Vec<Issue>,
    pub last_limit: Mutex<Option<i64>>,
    pub last_fields: Mutex<Option<String>>,
}

#[async_trait]
impl TrackerProvider for FakeTracker {
    async fn projects(&self) -> FetchResult<Vec<Project>> {
        self.mode.gate().await?;
        Ok(self.projects.clone())
    }

    async fn project_issues(&self, project_key: &str, limit: Option<i64>) -> FetchResult<Vec<Issue>> {
        *self.last_limit.lock().unwrap() = limit;
        self.mode.gate().await?;
        let prefix = format!("{project_key}-");
        Ok(self
            .issues
            .iter()
            .filter(|i| i.metadata.key.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn issue(&self, issue_key: &str, _expand: Option<&str>) -> FetchResult<Issue> {
        self.mode.gate().await?;
        self.issues
            .iter()
            .find(|i| i.metadata.key == issue_key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("issue {issue_key}")))
    }

    async fn search_issues(&self, _jql: &str, fields: &str, limit: i64) -> FetchResult<Vec<Issue>> {
        *self.last_limit.lock().unwrap() = Some(limit);
        *self.last_fields.lock().unwrap() = Some(fields.to_string());
        self.mode.gate().await?;
        Ok(self.issues.clone())
    }
}

pub fn space(key: &str, name: &str) -> Space {
    Space {
        key: key.to_string(),
        name: name.to_string(),
        description: None,
    }
}

pub fn project(key: &str, name: &str) -> Project {
    Project {
        key: key.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} tracker")),
    }
}

pub fn page(id: &str, space: &str, title: &str, content: &str) -> Page {
    Page {
        metadata: PageMeta {
            page_id: id.to_string(),
            title: title.to_string(),
            space: space.to_string(),
            url: format!("https://wiki.example.com/spaces/{space}/pages/{id}"),
            last_modified: "2024-03-01T10:00:00.000Z".to_string(),
            content_type: "page".to_string(),
        },
        content: content.to_string(),
    }
}

pub fn comment(author: &str, content: &str) -> Comment {
    Comment {
        metadata: CommentMeta {
            comment_id: format!("c-{author}"),
            author_name: author.to_string(),
            last_modified: "2024-03-02T09:00:00.000Z".to_string(),
        },
        content: content.to_string(),
    }
}

pub fn issue(key: &str, title: &str, content: &str) -> Issue {
    Issue {
        metadata: IssueMeta {
            key: key.to_string(),
            title: title.to_string(),
            issue_type: "Bug".to_string(),
            status: "Open".to_string(),
            created_date: "2024-01-02".to_string(),
            priority: "High".to_string(),
            link: format!("https://example.atlassian.net/browse/{key}"),
        },
        content: content.to_string(),
    }
}

/// A wiki with one space of two pages and a tracker with one project of two issues.
pub fn populated() -> (Arc<FakeWiki>, Arc<FakeTracker>) {
    let wiki = FakeWiki {
        spaces: vec![space("ENG", "Engineering")],
        pages: vec![
            page("1", "ENG", "Runbook", "restart the service"),
            page("2", "ENG", "Oncall", "page the primary"),
        ],
        comments: vec![comment("Ada", "Looks good")],
        ..Default::default()
    };
    let tracker = FakeTracker {
        projects: vec![project("PROJ", "Project")],
        issues: vec![
            issue("PROJ-2", "Newer", "second body"),
            issue("PROJ-1", "Older", "first body"),
        ],
        ..Default::default()
    };
    (Arc::new(wiki), Arc::new(tracker))
}

pub fn context(wiki: &Arc<FakeWiki>, tracker: &Arc<FakeTracker>) -> ServerContext {
    ServerContext::new(wiki.clone(), tracker.clone())
}

pub fn handler_with(wiki: &Arc<FakeWiki>, tracker: &Arc<FakeTracker>) -> ProtocolHandler {
    ProtocolHandler::new(context(wiki, tracker))
}

/// Build an MCP JSON-RPC request.
pub fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

pub fn notification(method: &str) -> Value {
    json!({ "jsonrpc": "2.0", "method": method })
}

pub fn init_params() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {},
        "clientInfo": { "name": "test-client", "version": "1.0" }
    })
}

/// Build an initialize request.
pub fn init_request() -> Value {
    mcp_request(0, "initialize", init_params())
}

pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

pub fn parse(msg: Value) -> JsonRpcMessage {
    serde_json::from_value(msg).unwrap()
}

/// Send a JSON-RPC message through the handler and return the response.
pub async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    handler.handle_message(parse(msg)).await
}

/// Send and unwrap the response.
pub async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

/// A handler that has already completed `initialize`.
pub async fn initialized(wiki: &Arc<FakeWiki>, tracker: &Arc<FakeTracker>) -> ProtocolHandler {
    let handler = handler_with(wiki, tracker);
    let resp = send_unwrap(&handler, init_request()).await;
    assert!(resp.get("result").is_some(), "initialize failed: {resp}");
    handler
}

/// Decode the pretty JSON a tool returns in its single text block.
pub fn tool_json(resp: &Value) -> Value {
    let text = resp["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("no text content in {resp}"));
    serde_json::from_str(text).unwrap()
}

pub fn error_code(resp: &Value) -> i64 {
    resp["error"]["code"]
        .as_i64()
        .unwrap_or_else(|| panic!("expected an error, got {resp}"))
}

pub fn error_message(resp: &Value) -> &str {
    resp["error"]["message"].as_str().unwrap_or_default()
}
