//! Integration tests for the Ladder Execution API.
//!
//! Each test starts its own server on an ephemeral local port, backed by the
//! paper venue, and talks to it through [`ladder_client::LadderClient`].
//! Servers never share execution state.

use ladder_client::{ClientConfig, LadderClient};
use ladder_execution_backend::api::create_router;
use ladder_execution_backend::config::Config;
use ladder_execution_backend::execution::ExecutionService;
use ladder_execution_backend::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Listed expiry served by the default paper venue.
pub const PAPER_EXPIRY: &str = "20251219";

/// A running in-process server.
pub struct TestServer {
    /// Client pointed at the server.
    pub client: LadderClient,
    /// Base URL of the server.
    pub base_url: String,
    execution: Option<ExecutionService>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Starts a server with default configuration.
    ///
    /// # Panics
    /// Panics if the server cannot bind or the client cannot be built.
    pub async fn start() -> Self {
        Self::start_with(Config::default()).await
    }

    /// Starts a server with the given configuration.
    ///
    /// # Panics
    /// Panics if the server cannot bind or the client cannot be built.
    pub async fn start_with(config: Config) -> Self {
        let (state, execution) = AppState::from_config(config);
        let app = create_router(Arc::new(state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = format!("http://{}", addr);
        let client = LadderClient::new(ClientConfig {
            base_url: base_url.clone(),
            timeout: Duration::from_secs(10),
        })
        .expect("Failed to create client");

        Self {
            client,
            base_url,
            execution: Some(execution),
            handle,
        }
    }

    /// Stops the execution worker, then the HTTP server.
    pub async fn stop(mut self) {
        if let Some(execution) = self.execution.take() {
            execution.shutdown().await;
        }
        self.handle.abort();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
