//! Shared brokerage connection state.

use super::command::{CommandId, CommandKind};
use crate::brokerage::Endpoint;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// The most recent command failure, kept for status reporting only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecordedError {
    /// Id of the command that failed.
    pub command_id: CommandId,
    /// Kind of the command that failed.
    pub command: CommandKind,
    /// Error message.
    pub message: String,
    /// When the failure was recorded.
    pub at: DateTime<Utc>,
}

/// Connection status snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConnectionState {
    /// A session is live.
    pub connected: bool,
    /// Endpoint of the live session.
    pub endpoint: Option<Endpoint>,
    /// When the live session was opened.
    pub connected_at: Option<DateTime<Utc>>,
    /// Most recent command failure.
    pub last_error: Option<RecordedError>,
}

/// Connection state shared between the worker (writer) and readers.
#[derive(Debug, Clone, Default)]
pub struct SharedConnection {
    inner: Arc<RwLock<ConnectionState>>,
}

impl SharedConnection {
    /// Creates a disconnected state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ConnectionState {
        self.inner.read().clone()
    }

    /// Whether a session is live.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.read().connected
    }

    pub(crate) fn mark_connected(&self, endpoint: Endpoint) {
        let mut state = self.inner.write();
        state.connected = true;
        state.endpoint = Some(endpoint);
        state.connected_at = Some(Utc::now());
        state.last_error = None;
    }

    pub(crate) fn mark_disconnected(&self) {
        let mut state = self.inner.write();
        state.connected = false;
        state.endpoint = None;
        state.connected_at = None;
    }

    pub(crate) fn record_error(&self, command_id: CommandId, command: CommandKind, message: String) {
        self.inner.write().last_error = Some(RecordedError {
            command_id,
            command,
            message,
            at: Utc::now(),
        });
    }
}
