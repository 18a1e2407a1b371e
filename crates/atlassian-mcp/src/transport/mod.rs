//! Transport layer for MCP communication.

pub mod framing;
#[cfg(feature = "http")]
pub mod http;
pub mod stdio;

#[cfg(feature = "http")]
pub use http::{HttpBridge, HttpTransport};
pub use stdio::StdioTransport;
