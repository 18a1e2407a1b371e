//! Configuration loading and resolution for the server process.
//!
//! Provider credentials are read by `atlassian_fetch::AtlassianConfig`; this
//! module only covers the server's own settings.

use crate::protocol::engine::DEFAULT_WORKERS;

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8000";

/// HTTP listen address: explicit flag, then `MCP_HTTP_ADDR`, then the default.
pub fn resolve_http_addr(explicit: Option<&str>) -> String {
    resolve_http_addr_with(explicit, |key| std::env::var(key).ok())
}

/// Bearer token for the HTTP transport: explicit flag, then `MCP_AUTH_TOKEN`.
pub fn resolve_auth_token(explicit: Option<String>) -> Option<String> {
    resolve_auth_token_with(explicit, |key| std::env::var(key).ok())
}

/// Dispatch slots for the HTTP engine loop: explicit flag, then
/// `MCP_HTTP_WORKERS`, then the default. Zero or unparseable values fall
/// through to the next source.
pub fn resolve_http_workers(explicit: Option<usize>) -> usize {
    resolve_http_workers_with(explicit, |key| std::env::var(key).ok())
}

fn resolve_http_addr_with<F>(explicit: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = explicit {
        return addr.to_string();
    }

    lookup("MCP_HTTP_ADDR")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
}

fn resolve_auth_token_with<F>(explicit: Option<String>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .or_else(|| lookup("MCP_AUTH_TOKEN"))
        .filter(|t| !t.is_empty())
}

fn resolve_http_workers_with<F>(explicit: Option<usize>, lookup: F) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .filter(|&n| n > 0)
        .or_else(|| {
            lookup("MCP_HTTP_WORKERS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
        })
        .unwrap_or(DEFAULT_WORKERS)
}
