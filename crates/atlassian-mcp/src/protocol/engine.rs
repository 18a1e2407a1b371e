//! Channel-driven engine loop used by the HTTP binding.
//!
//! Messages arrive on an inbound channel; replies leave on an outbound
//! channel. Each message runs on its own worker task, at most `workers` at a
//! time, so a slow provider call does not hold up unrelated traffic.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinSet;

use crate::types::JsonRpcMessage;

use super::handler::ProtocolHandler;

pub const DEFAULT_WORKERS: usize = 8;

pub struct EngineLoop {
    handler: ProtocolHandler,
    workers: usize,
}

impl EngineLoop {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Run until the inbound channel closes, then wait for in-flight workers.
    ///
    /// `ready` fires once the loop is accepting messages. Aborting the task
    /// running this future also aborts every worker it spawned.
    pub async fn run(
        self,
        mut inbound: mpsc::Receiver<JsonRpcMessage>,
        outbound: mpsc::Sender<Value>,
        ready: Option<oneshot::Sender<()>>,
    ) {
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        if let Some(ready) = ready {
            let _ = ready.send(());
        }
        tracing::info!(workers = self.workers, "Engine loop started");

        loop {
            tokio::select! {
                msg = inbound.recv() => {
                    let Some(msg) = msg else { break };
                    let Ok(permit) = permits.clone().acquire_owned().await else { break };
                    let handler = self.handler.clone();
                    let outbound = outbound.clone();
                    tasks.spawn(async move {
                        let _permit = permit;
                        if let Some(reply) = handler.handle_message(msg).await {
                            if outbound.send(reply).await.is_err() {
                                tracing::warn!("Outbound channel closed, dropping reply");
                            }
                        }
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Engine worker failed: {e}");
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Engine worker failed: {e}");
            }
        }
        tracing::info!("Engine loop stopped");
    }
}
