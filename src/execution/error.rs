//! Errors produced while executing a command.

use crate::brokerage::BrokerageError;
use std::time::Duration;

/// Execution-layer error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The command needs a live session and there is none.
    #[error("brokerage not connected")]
    NotConnected,

    /// Opening a session failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Opening a session did not finish in time.
    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// No venue contract matches the descriptor.
    #[error("contract not found: {0}. Check that this strike and expiry are listed")]
    ContractNotFound(String),

    /// The venue failed the request.
    #[error(transparent)]
    Brokerage(#[from] BrokerageError),

    /// The worker has stopped and will not process commands.
    #[error("execution worker unavailable")]
    WorkerUnavailable,
}
