//! Application state management.

use crate::brokerage::{Brokerage, PaperBrokerage};
use crate::config::Config;
use crate::execution::ExecutionService;
use crate::gateway::RequestGateway;
use std::sync::Arc;
use tracing::info;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Entry point for every operation.
    pub gateway: Arc<RequestGateway>,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state backed by the paper venue.
    ///
    /// The returned service owns the execution worker; dropping it stops the
    /// worker.
    #[must_use]
    pub fn from_config(config: Config) -> (Self, ExecutionService) {
        let brokerage = PaperBrokerage::new(&config.instrument.symbol, config.paper.clone());
        Self::with_brokerage(config, brokerage)
    }

    /// Creates state backed by the given brokerage.
    #[must_use]
    pub fn with_brokerage<B: Brokerage>(config: Config, brokerage: B) -> (Self, ExecutionService) {
        let service = ExecutionService::spawn(brokerage, config.brokerage.connect_timeout());
        let gateway = RequestGateway::new(
            service.queue(),
            service.registry(),
            service.connection(),
            &config,
        );

        info!(
            "Execution worker ready for {} (default endpoint {})",
            config.instrument.symbol,
            config.brokerage.endpoint()
        );

        let state = Self {
            gateway: Arc::new(gateway),
            config: Arc::new(config),
        };
        (state, service)
    }
}
