//! Command queue feeding the execution worker.

use super::command::{Command, CommandId, CommandResult, QueuedCommand};
use super::error::ExecutionError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Producer side of the worker's command channel.
///
/// Cheap to clone; every request task can hold its own handle.
#[derive(Debug, Clone)]
pub struct ExecutionQueue {
    tx: mpsc::UnboundedSender<QueuedCommand>,
    next_id: Arc<AtomicU64>,
}

impl ExecutionQueue {
    /// Creates a queue and the receiver the worker drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<QueuedCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (queue, rx)
    }

    /// Enqueues a command without blocking.
    ///
    /// If the worker has stopped, the returned ticket resolves immediately
    /// to [`ExecutionError::WorkerUnavailable`].
    pub fn enqueue(&self, command: Command) -> Ticket {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let kind = command.kind();
        let (reply, rx) = oneshot::channel();

        match self.tx.send(QueuedCommand { id, command, reply }) {
            Ok(()) => debug!("Queued command #{} ({})", id, kind),
            Err(mpsc::error::SendError(rejected)) => {
                warn!("Execution worker stopped, command #{} ({}) dropped", id, kind);
                let _ = rejected.reply.send(Err(ExecutionError::WorkerUnavailable));
            }
        }

        Ticket { id, rx }
    }

    /// Whether the worker side has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Handle to one queued command's result.
#[derive(Debug)]
pub struct Ticket {
    id: CommandId,
    rx: oneshot::Receiver<CommandResult>,
}

impl Ticket {
    /// Command id.
    #[must_use]
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Waits up to `timeout` for the command's result.
    ///
    /// Returns `None` when the wait elapses; the command keeps running. A
    /// reply slot dropped without an answer means the worker went away.
    pub async fn wait(self, timeout: Duration) -> Option<CommandResult> {
        match tokio::time::timeout(timeout, self.rx).await {
            Ok(Ok(result)) => Some(result),
            Ok(Err(_)) => Some(Err(ExecutionError::WorkerUnavailable)),
            Err(_) => None,
        }
    }

    /// Waits for the command's result without a deadline.
    pub async fn result(self) -> CommandResult {
        self.rx
            .await
            .unwrap_or(Err(ExecutionError::WorkerUnavailable))
    }
}
