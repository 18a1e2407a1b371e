//! Atlassian MCP server: Confluence and Jira over the Model Context Protocol.
//!
//! One [`ProtocolHandler`] serves both transports: [`StdioTransport`] for
//! desktop clients and, with the `http` feature, an HTTP bridge that runs the
//! engine loop in the background and correlates replies by request id.

pub mod completion;
pub mod config;
pub mod context;
pub mod protocol;
pub mod resources;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::{resolve_auth_token, resolve_http_addr, resolve_http_workers};
pub use context::ServerContext;
pub use protocol::ProtocolHandler;
pub use transport::StdioTransport;
