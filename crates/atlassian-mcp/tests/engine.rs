//! Protocol engine behavior through `ProtocolHandler`, with in-memory providers.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{json, Value};

use atlassian_mcp::protocol::SessionState;
use common::*;

// ─────────────────────── lifecycle ───────────────────────

#[tokio::test]
async fn test_response_id_equals_request_id() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(41, "ping", json!({}))).await;
    assert_eq!(resp["id"], 41);

    let msg = json!({ "jsonrpc": "2.0", "id": "req-a", "method": "tools/list" });
    let resp = send_unwrap(&handler, msg).await;
    assert_eq!(resp["id"], "req-a");
}

#[tokio::test]
async fn test_notifications_never_reply() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    assert!(send(&handler, notification("notifications/initialized")).await.is_none());
    assert!(send(&handler, notification("notifications/made-up")).await.is_none());
    let cancel = json!({
        "jsonrpc": "2.0",
        "method": "notifications/cancelled",
        "params": { "requestId": 3, "reason": "user hit stop" }
    });
    assert!(send(&handler, cancel).await.is_none());
}

#[tokio::test]
async fn test_requests_before_initialize_are_rejected() {
    let (wiki, tracker) = populated();
    let handler = handler_with(&wiki, &tracker);

    let resp = send_unwrap(&handler, mcp_request(1, "tools/list", json!({}))).await;
    assert_eq!(error_code(&resp), -32002);
    assert_eq!(error_message(&resp), "Server not initialized");

    let resp = send_unwrap(&handler, mcp_request(2, "ping", json!({}))).await;
    assert!(resp.get("result").is_some());
    assert_eq!(handler.session_state().await, SessionState::Uninitialized);
}

#[tokio::test]
async fn test_initialize_negotiates_and_advances_state() {
    let (wiki, tracker) = populated();
    let handler = handler_with(&wiki, &tracker);

    let resp = send_unwrap(&handler, init_request()).await;
    assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(resp["result"]["serverInfo"]["name"], "mcp-atlassian");
    assert!(resp["result"]["capabilities"]["tools"].is_object());
    assert_eq!(handler.session_state().await, SessionState::Initialized);

    let again = send_unwrap(&handler, init_request()).await;
    assert!(again.get("result").is_some());
    assert_eq!(handler.session_state().await, SessionState::Initialized);
}

#[tokio::test]
async fn test_initialize_missing_capabilities_reports_exactly_that() {
    let (wiki, tracker) = populated();
    let handler = handler_with(&wiki, &tracker);

    let mut params = init_params();
    params.as_object_mut().unwrap().remove("capabilities");
    let resp = send_unwrap(&handler, mcp_request(1, "initialize", params)).await;

    assert_eq!(error_code(&resp), -32602);
    let missing: BTreeSet<&str> = resp["error"]["data"]["missing"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(missing, BTreeSet::from(["capabilities"]));
    assert_eq!(handler.session_state().await, SessionState::Uninitialized);
}

#[tokio::test]
async fn test_wrong_jsonrpc_version_is_invalid_request() {
    let (wiki, tracker) = populated();
    let handler = handler_with(&wiki, &tracker);

    let msg = json!({ "jsonrpc": "1.0", "id": 5, "method": "ping" });
    let resp = send_unwrap(&handler, msg).await;
    assert_eq!(error_code(&resp), -32600);
    assert_eq!(resp["id"], 5);
}

#[tokio::test]
async fn test_unknown_method() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(9, "foo/bar", json!({}))).await;
    assert_eq!(error_code(&resp), -32601);
    assert_eq!(error_message(&resp), "Method not found: foo/bar");
}

#[tokio::test]
async fn test_closed_session_rejects_dispatch() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;
    handler.close().await;

    let resp = send_unwrap(&handler, mcp_request(1, "ping", json!({}))).await;
    assert_eq!(error_message(&resp), "Session closed");
    assert_eq!(handler.session_state().await, SessionState::Closed);
}

// ─────────────────────── resources ───────────────────────

fn uris(resp: &Value) -> Vec<String> {
    resp["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_resources_list_is_union_of_both_providers() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(1, "resources/list", json!({}))).await;
    assert_eq!(uris(&resp), vec!["wiki://ENG", "tracker://PROJ"]);

    let resources = resp["result"]["resources"].as_array().unwrap();
    assert_eq!(resources[0]["name"], "Confluence Space: Engineering");
    assert_eq!(resources[0]["mimeType"], "text/plain");
    assert_eq!(resources[0]["description"], "");
    assert_eq!(resources[1]["name"], "Jira Project: Project");
    assert_eq!(resources[1]["description"], "Project tracker");
}

#[tokio::test]
async fn test_resources_list_skips_failing_tracker() {
    let (wiki, _) = populated();
    let tracker = Arc::new(FakeTracker {
        mode: Mode::Fail(401),
        projects: vec![project("PROJ", "Project")],
        ..Default::default()
    });
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(1, "resources/list", json!({}))).await;
    assert_eq!(uris(&resp), vec!["wiki://ENG"]);
}

#[tokio::test]
async fn test_resources_list_skips_failing_wiki() {
    let (_, tracker) = populated();
    let wiki = Arc::new(FakeWiki {
        mode: Mode::Fail(500),
        ..Default::default()
    });
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(1, "resources/list", json!({}))).await;
    assert_eq!(uris(&resp), vec!["tracker://PROJ"]);
}

#[tokio::test]
async fn test_resource_templates_list() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(1, "resources/templates/list", json!({}))).await;
    let templates: Vec<&str> = resp["result"]["resourceTemplates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["uriTemplate"].as_str().unwrap())
        .collect();
    assert!(templates.contains(&"wiki://{space_key}/pages/{title}"));
    assert!(templates.contains(&"tracker://{project_key}/issues/{issue_key}"));
}

async fn read(handler: &atlassian_mcp::ProtocolHandler, uri: &str) -> Value {
    send_unwrap(handler, mcp_request(1, "resources/read", json!({ "uri": uri }))).await
}

fn read_text(resp: &Value) -> &str {
    resp["result"]["contents"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("no text in {resp}"))
}

#[tokio::test]
async fn test_read_space_concatenates_pages() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = read(&handler, "wiki://ENG").await;
    assert_eq!(
        read_text(&resp),
        "# Runbook\n\nrestart the service\n---\n\n# Oncall\n\npage the primary\n---"
    );
    assert_eq!(resp["result"]["contents"][0]["uri"], "wiki://ENG");
    assert_eq!(resp["result"]["contents"][0]["mimeType"], "text/plain");
}

#[tokio::test]
async fn test_read_page_returns_its_body() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = read(&handler, "wiki://ENG/pages/Oncall").await;
    assert_eq!(read_text(&resp), "page the primary");

    let resp = read(&handler, "confluence://ENG/pages/Runbook").await;
    assert_eq!(read_text(&resp), "restart the service");
}

#[tokio::test]
async fn test_read_missing_page_names_the_title() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = read(&handler, "wiki://ENG/pages/Ghost").await;
    assert_eq!(error_code(&resp), -32802);
    assert_eq!(error_message(&resp), "Resource not found: Ghost");
}

#[tokio::test]
async fn test_read_project_and_issue() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = read(&handler, "tracker://PROJ").await;
    assert_eq!(
        read_text(&resp),
        "# PROJ-2: Newer\n\nsecond body\n---\n\n# PROJ-1: Older\n\nfirst body\n---"
    );

    let resp = read(&handler, "jira://PROJ/issues/PROJ-1").await;
    assert_eq!(read_text(&resp), "first body");
}

#[tokio::test]
async fn test_read_invalid_uri() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    for uri in ["bogus://x", "wiki://", "tracker://PROJ/sprints/1"] {
        let resp = read(&handler, uri).await;
        assert_eq!(error_message(&resp), format!("Invalid resource URI: {uri}"));
    }
}

#[tokio::test]
async fn test_read_provider_failure_is_generic() {
    let wiki = Arc::new(FakeWiki {
        mode: Mode::Fail(502),
        ..Default::default()
    });
    let (_, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = read(&handler, "wiki://ENG").await;
    assert_eq!(error_code(&resp), -32603);
    assert_eq!(error_message(&resp), "Resource read failed");
}

#[tokio::test]
async fn test_read_requires_uri() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(1, "resources/read", json!({}))).await;
    assert_eq!(error_code(&resp), -32602);
    assert_eq!(
        error_message(&resp),
        "resources/read request requires uri parameter"
    );
}

// ─────────────────────── tools ───────────────────────

#[tokio::test]
async fn test_tools_list_has_the_six_tools() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(1, "tools/list", json!({}))).await;
    let tools = resp["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "confluence_search",
            "confluence_get_page",
            "confluence_get_comments",
            "jira_get_issue",
            "jira_search",
            "jira_get_project_issues",
        ]
    );
    for tool in tools {
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert!(tool["inputSchema"]["required"].is_array(), "{}", tool["name"]);
    }
}

#[tokio::test]
async fn test_confluence_search_caps_limit_at_50() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(
        &handler,
        tool_call(1, "confluence_search", json!({ "query": "space=ENG", "limit": 1000 })),
    )
    .await;
    assert!(resp.get("result").is_some(), "{resp}");
    assert_eq!(*wiki.last_limit.lock().unwrap(), Some(50));

    send_unwrap(
        &handler,
        tool_call(2, "confluence_search", json!({ "query": "space=ENG" })),
    )
    .await;
    assert_eq!(*wiki.last_limit.lock().unwrap(), Some(10));

    send_unwrap(
        &handler,
        tool_call(3, "confluence_search", json!({ "query": "space=ENG", "limit": "5" })),
    )
    .await;
    assert_eq!(*wiki.last_limit.lock().unwrap(), Some(5));
}

#[tokio::test]
async fn test_confluence_search_result_shape() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(
        &handler,
        tool_call(1, "confluence_search", json!({ "query": "space=ENG" })),
    )
    .await;
    let results = tool_json(&resp);
    assert_eq!(results.as_array().unwrap().len(), 2);
    assert_eq!(results[0]["page_id"], "1");
    assert_eq!(results[0]["type"], "page");
    assert_eq!(results[0]["excerpt"], "restart the service");
    assert_eq!(resp["result"]["content"][0]["type"], "text");
}

#[tokio::test]
async fn test_jira_search_truncates_long_excerpts() {
    let (wiki, _) = populated();
    let tracker = Arc::new(FakeTracker {
        issues: vec![
            issue("PROJ-1", "Long", &"a".repeat(650)),
            issue("PROJ-2", "Short", &"b".repeat(300)),
        ],
        ..Default::default()
    });
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, tool_call(1, "jira_search", json!({ "jql": "project = PROJ" })))
        .await;
    let results = tool_json(&resp);
    assert_eq!(results[0]["excerpt"], format!("{}...", "a".repeat(500)));
    assert_eq!(results[1]["excerpt"], "b".repeat(300));
    assert_eq!(results[0]["priority"], "High");
    assert_eq!(tracker.last_fields.lock().unwrap().as_deref(), Some("*all"));
    assert_eq!(*tracker.last_limit.lock().unwrap(), Some(10));
}

#[tokio::test]
async fn test_confluence_get_page_with_and_without_metadata() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, tool_call(1, "confluence_get_page", json!({ "page_id": "2" })))
        .await;
    let body = tool_json(&resp);
    assert_eq!(body["content"], "page the primary");
    assert_eq!(body["metadata"]["title"], "Oncall");
    assert_eq!(body["metadata"]["type"], "page");

    let resp = send_unwrap(
        &handler,
        tool_call(
            2,
            "confluence_get_page",
            json!({ "page_id": "2", "include_metadata": false }),
        ),
    )
    .await;
    let body = tool_json(&resp);
    assert!(body.get("metadata").is_none());
}

#[tokio::test]
async fn test_not_found_names_the_identifier() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, tool_call(1, "confluence_get_page", json!({ "page_id": "42" })))
        .await;
    assert_eq!(error_code(&resp), -32802);
    assert!(error_message(&resp).contains("page 42"));

    let resp = send_unwrap(&handler, tool_call(2, "jira_get_issue", json!({ "issue_key": "NOPE-1" })))
        .await;
    assert!(error_message(&resp).contains("NOPE-1"));
}

#[tokio::test]
async fn test_confluence_get_comments_shape() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(
        &handler,
        tool_call(1, "confluence_get_comments", json!({ "page_id": "1" })),
    )
    .await;
    assert_eq!(
        tool_json(&resp),
        json!([{
            "author": "Ada",
            "created": "2024-03-02T09:00:00.000Z",
            "content": "Looks good"
        }])
    );
}

#[tokio::test]
async fn test_jira_get_issue_includes_metadata() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(
        &handler,
        tool_call(1, "jira_get_issue", json!({ "issue_key": "PROJ-2", "expand": "changelog" })),
    )
    .await;
    let body = tool_json(&resp);
    assert_eq!(body["content"], "second body");
    assert_eq!(body["metadata"]["type"], "Bug");
    assert_eq!(body["metadata"]["link"], "https://example.atlassian.net/browse/PROJ-2");
}

#[tokio::test]
async fn test_jira_get_project_issues_shape_and_limit() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(
        &handler,
        tool_call(
            1,
            "jira_get_project_issues",
            json!({ "project_key": "PROJ", "limit": 75 }),
        ),
    )
    .await;
    let results = tool_json(&resp);
    assert_eq!(results.as_array().unwrap().len(), 2);
    assert_eq!(results[0]["key"], "PROJ-2");
    assert!(results[0].get("priority").is_none());
    assert_eq!(*tracker.last_limit.lock().unwrap(), Some(50));
}

#[tokio::test]
async fn test_unknown_tool() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, tool_call(1, "nope", json!({}))).await;
    assert_eq!(error_message(&resp), "Unknown tool: nope");
}

#[tokio::test]
async fn test_missing_tool_argument_is_invalid_params() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, tool_call(1, "jira_search", json!({}))).await;
    assert_eq!(error_code(&resp), -32602);
    assert!(error_message(&resp).contains("jql"));
}

#[tokio::test]
async fn test_provider_failure_is_collapsed() {
    let (wiki, _) = populated();
    let tracker = Arc::new(FakeTracker {
        mode: Mode::Fail(401),
        ..Default::default()
    });
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, tool_call(1, "jira_search", json!({ "jql": "x" }))).await;
    assert_eq!(error_code(&resp), -32603);
    assert_eq!(error_message(&resp), "Tool execution failed");
    assert!(!resp.to_string().contains("upstream exploded"));
}

// ─────────────────────── completion ───────────────────────

#[tokio::test]
async fn test_completion_filters_resource_uris_by_prefix() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let params = json!({
        "ref": { "type": "ref/resource", "uri": "wiki://{space_key}" },
        "argument": { "name": "space_key", "value": "wiki://" }
    });
    let resp = send_unwrap(&handler, mcp_request(1, "completion/complete", params)).await;
    assert_eq!(resp["result"]["completion"]["values"], json!(["wiki://ENG"]));
    assert_eq!(resp["result"]["completion"]["hasMore"], false);
}

#[tokio::test]
async fn test_completion_for_prompts_is_empty() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let params = json!({
        "ref": { "type": "ref/prompt", "name": "summarize" },
        "argument": { "name": "topic", "value": "" }
    });
    let resp = send_unwrap(&handler, mcp_request(1, "completion/complete", params)).await;
    assert_eq!(resp["result"]["completion"]["values"], json!([]));
}

#[tokio::test]
async fn test_completion_requires_ref_and_argument() {
    let (wiki, tracker) = populated();
    let handler = initialized(&wiki, &tracker).await;

    let resp = send_unwrap(&handler, mcp_request(1, "completion/complete", json!({}))).await;
    assert_eq!(error_code(&resp), -32602);
    let missing = resp["error"]["data"]["missing"].as_object().unwrap();
    assert!(missing.contains_key("ref") && missing.contains_key("argument"));
}
