//! The single consumer of the command queue.
//!
//! The worker is the only owner of the brokerage and its session. It takes
//! one command at a time, runs it to completion, publishes the outcome to the
//! registry and connection state, then resolves the command's reply slot.

use super::command::{Command, CommandOutput, CommandResult, QueuedCommand, TradeParams};
use super::connection::SharedConnection;
use super::error::ExecutionError;
use crate::brokerage::{
    Brokerage, ContractDescriptor, Endpoint, LimitOrder, OrderAction, OrderHandle, OrderId,
    TradeId,
};
use crate::registry::{OrderRecord, OrderStatus, PositionRecord, TradeRegistry};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

struct LiveSession<S> {
    endpoint: Endpoint,
    session: S,
}

/// Drains the command queue against a brokerage.
pub struct ExecutionWorker<B: Brokerage> {
    brokerage: B,
    live: Option<LiveSession<B::Session>>,
    registry: Arc<TradeRegistry>,
    connection: SharedConnection,
    connect_timeout: Duration,
}

impl<B: Brokerage> ExecutionWorker<B> {
    /// Creates a worker with no live session.
    pub fn new(
        brokerage: B,
        registry: Arc<TradeRegistry>,
        connection: SharedConnection,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            brokerage,
            live: None,
            registry,
            connection,
            connect_timeout,
        }
    }

    /// Runs until shutdown is signalled or every queue handle is dropped.
    ///
    /// Any live session is disconnected before returning.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<QueuedCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("Execution worker started");

        loop {
            let queued = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Execution worker received shutdown");
                        break;
                    }
                    continue;
                }
                next = commands.recv() => match next {
                    Some(queued) => queued,
                    None => {
                        debug!("Command queue closed");
                        break;
                    }
                },
            };

            self.process(queued).await;
        }

        self.teardown().await;
        info!("Execution worker stopped");
    }

    async fn process(&mut self, queued: QueuedCommand) {
        let QueuedCommand { id, command, reply } = queued;
        let kind = command.kind();
        debug!("Processing command #{} ({})", id, kind);

        let result = self.execute(command).await;

        if let Err(e) = &result {
            error!("Command #{} ({}) failed: {}", id, kind, e);
            self.connection.record_error(id, kind, e.to_string());
        }

        if reply.send(result).is_err() {
            debug!("Caller for command #{} stopped waiting", id);
        }
    }

    async fn execute(&mut self, command: Command) -> CommandResult {
        match command {
            Command::Connect(endpoint) => self.connect(endpoint).await,
            Command::Disconnect => {
                self.teardown().await;
                Ok(CommandOutput::Disconnected)
            }
            Command::PlaceTrade(params) => self.place_trade(&params).await,
            Command::CancelOrder(order_id) => self.cancel_order(order_id).await,
            Command::ClosePosition(trade_id) => Ok(self.close_position(trade_id)),
            Command::QualifyContract(descriptor) => self.qualify(&descriptor).await,
            Command::FetchOptionChain { symbol } => {
                let live = self.live.as_mut().ok_or(ExecutionError::NotConnected)?;
                let chains = self.brokerage.option_chain(&mut live.session, &symbol).await?;
                info!("Fetched {} option chain(s) for {}", chains.len(), symbol);
                Ok(CommandOutput::OptionChain(chains))
            }
        }
    }

    async fn teardown(&mut self) {
        if let Some(live) = self.live.take() {
            info!("Disconnecting from {}", live.endpoint);
            self.brokerage.disconnect(live.session).await;
        }
        self.connection.mark_disconnected();
    }

    async fn connect(&mut self, endpoint: Endpoint) -> CommandResult {
        self.teardown().await;

        info!("Connecting to brokerage at {}", endpoint);
        let attempt = tokio::time::timeout(self.connect_timeout, self.brokerage.connect(&endpoint));

        match attempt.await {
            Ok(Ok(session)) => {
                self.live = Some(LiveSession {
                    endpoint: endpoint.clone(),
                    session,
                });
                self.connection.mark_connected(endpoint.clone());
                info!("Connected to brokerage at {}", endpoint);
                Ok(CommandOutput::Connected(endpoint))
            }
            Ok(Err(e)) => Err(ExecutionError::Connection(e.to_string())),
            Err(_) => Err(ExecutionError::ConnectTimeout(self.connect_timeout)),
        }
    }

    async fn qualify(&mut self, descriptor: &ContractDescriptor) -> CommandResult {
        let live = self.live.as_mut().ok_or(ExecutionError::NotConnected)?;

        debug!("Qualifying {}", descriptor);
        match self
            .brokerage
            .qualify_contract(&mut live.session, descriptor)
            .await?
        {
            Some(contract) => {
                info!("Qualified {} as conId {}", descriptor, contract.con_id);
                Ok(CommandOutput::ContractQualified(contract))
            }
            None => Err(ExecutionError::ContractNotFound(descriptor.to_string())),
        }
    }

    async fn place_trade(&mut self, params: &TradeParams) -> CommandResult {
        let live = self.live.as_mut().ok_or(ExecutionError::NotConnected)?;
        let descriptor = params.descriptor();

        let contract = self
            .brokerage
            .qualify_contract(&mut live.session, descriptor)
            .await?
            .ok_or_else(|| ExecutionError::ContractNotFound(descriptor.to_string()))?;

        let order = LimitOrder {
            action: OrderAction::Buy,
            quantity: params.quantity(),
            limit_price: params.limit_price(),
        };
        info!(
            "Placing {} {}x {} @ {}",
            order.action, order.quantity, descriptor, order.limit_price
        );
        let handle = self
            .brokerage
            .place_order(&mut live.session, &contract, &order)
            .await?;

        let now = Utc::now();
        self.registry.insert_order(OrderRecord {
            order_id: handle.order_id,
            contract: contract.clone(),
            action: order.action,
            quantity: order.quantity,
            limit_price: order.limit_price,
            status: OrderStatus::Submitted,
            created_at: now,
        });
        self.registry.open_position(PositionRecord {
            trade_id: handle.order_id,
            order_id: handle.order_id,
            opened_at: now,
            entry_trigger: params.trigger_price(),
            take_profit: params.take_profit(),
            stop_loss: params.stop_loss(),
        });

        info!("Order {} placed on conId {}", handle.order_id, contract.con_id);
        Ok(CommandOutput::OrderPlaced {
            order_id: handle.order_id,
            contract,
        })
    }

    async fn cancel_order(&mut self, order_id: OrderId) -> CommandResult {
        if self.registry.order(order_id).is_none() {
            debug!("Order {} not tracked, nothing to cancel", order_id);
            return Ok(CommandOutput::OrderCancelled {
                order_id,
                removed: false,
            });
        }

        // The order stays tracked until the venue has accepted the request.
        let live = self.live.as_mut().ok_or(ExecutionError::NotConnected)?;
        self.brokerage
            .cancel_order(&mut live.session, &OrderHandle { order_id })
            .await?;

        let removed = self.registry.remove_order(order_id).is_some();
        info!("Order {} cancelled", order_id);
        Ok(CommandOutput::OrderCancelled { order_id, removed })
    }

    fn close_position(&mut self, trade_id: TradeId) -> CommandOutput {
        let removed = self.registry.remove_position(trade_id).is_some();
        if removed {
            info!("Position {} closed", trade_id);
        } else {
            debug!("Position {} not tracked, nothing to close", trade_id);
        }
        CommandOutput::PositionClosed { trade_id, removed }
    }
}
