//! Stdio transport: JSON-RPC lines on stdin, replies on stdout.
//!
//! Strictly sequential: each reply is written before the next line is read,
//! so replies come out in arrival order.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

use super::framing;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Serve the process stdin and stdout.
    pub async fn run(&self) -> McpResult<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run_on(stdin, stdout).await
    }

    /// Serve one session over any line-oriented reader and writer. The
    /// session is closed when the reader hits EOF.
    pub async fn run_on<R, W>(&self, mut reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();
        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let reply = match framing::parse_message(trimmed) {
                Ok(msg) => self.handler.handle_message(msg).await,
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    Some(framing::error_without_id(&e))
                }
            };

            if let Some(reply) = reply {
                let framed = framing::frame_message(&reply)?;
                writer
                    .write_all(framed.as_bytes())
                    .await
                    .map_err(McpError::Io)?;
                writer.flush().await.map_err(McpError::Io)?;
            }
        }

        self.handler.close().await;
        Ok(())
    }
}
