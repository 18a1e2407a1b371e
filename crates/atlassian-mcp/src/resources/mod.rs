//! MCP resource implementations: wiki spaces and tracker projects.

pub mod registry;
pub mod templates;
pub mod tracker;
pub mod uri;
pub mod wiki;

pub use registry::ResourceRegistry;
pub use uri::ResourceUri;
