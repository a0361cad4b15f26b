//! Serialized execution of brokerage operations.
//!
//! Every brokerage-facing operation is a [`Command`] sent through the
//! [`ExecutionQueue`]. A single [`ExecutionWorker`] task drains the queue in
//! FIFO order, so at most one brokerage call is in flight at any time. Each
//! command carries its own reply slot; callers wait on their [`Ticket`] and
//! never observe another command's outcome.

pub mod command;
pub mod connection;
pub mod error;
pub mod queue;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{
    Command, CommandId, CommandKind, CommandOutput, CommandResult, TradeParams, TradeParamsError,
};
pub use connection::{ConnectionState, RecordedError, SharedConnection};
pub use error::ExecutionError;
pub use queue::{ExecutionQueue, Ticket};
pub use worker::ExecutionWorker;

use crate::brokerage::Brokerage;
use crate::registry::TradeRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

/// A running execution worker and the handles used to reach it.
pub struct ExecutionService {
    queue: ExecutionQueue,
    connection: SharedConnection,
    registry: Arc<TradeRegistry>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ExecutionService {
    /// Spawns a worker that owns `brokerage`.
    pub fn spawn<B: Brokerage>(brokerage: B, connect_timeout: Duration) -> Self {
        let registry = Arc::new(TradeRegistry::new());
        let connection = SharedConnection::new();
        let (queue, commands) = ExecutionQueue::channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = ExecutionWorker::new(
            brokerage,
            Arc::clone(&registry),
            connection.clone(),
            connect_timeout,
        );
        let handle = tokio::spawn(worker.run(commands, shutdown_rx));

        Self {
            queue,
            connection,
            registry,
            shutdown_tx,
            handle,
        }
    }

    /// Queue handle for submitting commands.
    #[must_use]
    pub fn queue(&self) -> ExecutionQueue {
        self.queue.clone()
    }

    /// Shared connection state.
    #[must_use]
    pub fn connection(&self) -> SharedConnection {
        self.connection.clone()
    }

    /// Order and position registry.
    #[must_use]
    pub fn registry(&self) -> Arc<TradeRegistry> {
        Arc::clone(&self.registry)
    }

    /// Signals the worker to stop and waits for it to disconnect.
    ///
    /// The command being processed, if any, finishes first. Commands still
    /// queued are dropped and their tickets resolve to
    /// [`ExecutionError::WorkerUnavailable`].
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!("Execution worker ended abnormally: {}", e);
        }
    }
}
