//! Confluence and Jira data providers.
//!
//! The MCP server only sees the [`WikiProvider`] and [`TrackerProvider`]
//! traits; [`ConfluenceClient`] and [`JiraClient`] are the REST-backed
//! implementations.

pub mod client;
pub mod config;
pub mod confluence;
pub mod jira;
pub mod markup;
pub mod provider;
pub mod types;

pub use client::RestClient;
pub use config::{AtlassianConfig, Service};
pub use confluence::ConfluenceClient;
pub use jira::JiraClient;
pub use provider::{TrackerProvider, WikiProvider};
pub use types::*;
