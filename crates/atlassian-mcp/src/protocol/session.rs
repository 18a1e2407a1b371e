//! Session lifecycle and capability negotiation.

use crate::types::{
    ClientCapabilities, Implementation, InitializeParams, InitializeResult, McpError, McpResult,
    MCP_VERSION,
};

/// Transitions only move forward: `Uninitialized → Initialized → Closed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initialized,
    Closed,
}

/// Methods honored before `initialize` has succeeded.
const PRE_INIT_METHODS: &[&str] = &["initialize", "ping"];

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    client: Option<Implementation>,
    client_capabilities: ClientCapabilities,
    handshake_complete: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn client(&self) -> Option<&Implementation> {
        self.client.as_ref()
    }

    pub fn client_capabilities(&self) -> &ClientCapabilities {
        &self.client_capabilities
    }

    pub fn handshake_complete(&self) -> bool {
        self.handshake_complete
    }

    /// Whether a request for `method` may be dispatched in the current state.
    pub fn admit(&self, method: &str) -> McpResult<()> {
        match self.state {
            SessionState::Closed => Err(McpError::SessionClosed),
            SessionState::Uninitialized if !PRE_INIT_METHODS.contains(&method) => {
                Err(McpError::NotInitialized)
            }
            _ => Ok(()),
        }
    }

    /// Negotiate with the client. Re-initializing an initialized session
    /// re-negotiates without changing state.
    pub fn initialize(&mut self, params: InitializeParams) -> McpResult<InitializeResult> {
        if self.state == SessionState::Closed {
            return Err(McpError::SessionClosed);
        }

        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        self.client_capabilities = params.capabilities;
        self.client = Some(params.client_info);
        self.state = SessionState::Initialized;

        Ok(InitializeResult::default_result())
    }

    /// Record the client's `notifications/initialized`.
    pub fn mark_initialized(&mut self) {
        if self.state == SessionState::Initialized {
            self.handshake_complete = true;
            tracing::info!("MCP handshake complete");
        } else {
            tracing::warn!("Ignoring initialized notification in state {:?}", self.state);
        }
    }

    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            tracing::info!("Session closed");
            self.state = SessionState::Closed;
        }
    }
}
