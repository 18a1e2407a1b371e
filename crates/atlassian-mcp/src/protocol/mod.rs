//! MCP protocol handling: validation, session lifecycle and JSON-RPC dispatch.

pub mod engine;
pub mod handler;
pub mod session;
pub mod validator;

pub use engine::EngineLoop;
pub use handler::ProtocolHandler;
pub use session::{Session, SessionState};
pub use validator::ParamValidator;
