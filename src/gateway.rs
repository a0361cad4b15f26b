//! Request-facing surface over the execution queue.
//!
//! Every brokerage operation is validated, enqueued, and then awaited on the
//! command's own ticket for a bounded time. Giving up the wait never cancels
//! the command; the registry stays the source of truth.

use crate::brokerage::{ContractDescriptor, Endpoint, OrderId, TradeId};
use crate::config::{BrokerageConfig, Config, GatewayConfig, InstrumentConfig, LadderConfig};
use crate::error::ApiError;
use crate::execution::{
    Command, CommandId, CommandOutput, ExecutionQueue, SharedConnection, TradeParams,
};
use crate::ladder::{
    LadderParams, LadderWindow, MAX_PRICE, compute_ladder, is_valid_distance, is_valid_price,
    round_price,
};
use crate::models::{
    AckResponse, CancelOrderResponse, ClosePositionResponse, ConnectRequest, ConnectResponse,
    LadderQuery, LadderResponse, LadderStatus, OptionChainResponse, OrdersResponse,
    PlaceTradeRequest, PlaceTradeResponse, PriceTick, StatusResponse, UpdatePriceRequest,
    UpdatePriceResponse, VerifyContractRequest, VerifyContractResponse,
};
use crate::registry::TradeRegistry;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Expirations reported in an option chain summary.
const CHAIN_EXPIRATIONS: usize = 10;
/// Strikes reported in an option chain summary.
const CHAIN_STRIKES: usize = 20;
/// Strikes further than this from the underlying are left out of the summary.
const CHAIN_STRIKE_RANGE: Decimal = dec!(50);

/// Concurrent entry point for all operations.
pub struct RequestGateway {
    queue: ExecutionQueue,
    registry: Arc<TradeRegistry>,
    connection: SharedConnection,
    latest_price: RwLock<Option<PriceTick>>,
    brokerage: BrokerageConfig,
    instrument: InstrumentConfig,
    ladder: LadderConfig,
    waits: GatewayConfig,
    port: u16,
}

impl RequestGateway {
    /// Creates a gateway over a running execution worker.
    pub fn new(
        queue: ExecutionQueue,
        registry: Arc<TradeRegistry>,
        connection: SharedConnection,
        config: &Config,
    ) -> Self {
        Self {
            queue,
            registry,
            connection,
            latest_price: RwLock::new(None),
            brokerage: config.brokerage.clone(),
            instrument: config.instrument.clone(),
            ladder: config.ladder.clone(),
            waits: config.gateway.clone(),
            port: config.server.port,
        }
    }

    /// Enqueues a command and waits for its own result.
    async fn submit(
        &self,
        command: Command,
        wait: Duration,
    ) -> Result<(CommandId, CommandOutput), ApiError> {
        let operation = command.kind();
        let ticket = self.queue.enqueue(command);
        let command_id = ticket.id();

        match ticket.wait(wait).await {
            Some(Ok(output)) => Ok((command_id, output)),
            Some(Err(e)) => Err(e.into()),
            None => {
                warn!(
                    "No confirmation for command #{} ({}) within {:?}",
                    command_id, operation, wait
                );
                Err(ApiError::NoConfirmation {
                    command_id,
                    operation,
                })
            }
        }
    }

    fn unexpected(output: &CommandOutput) -> ApiError {
        ApiError::Internal(format!("unexpected command output: {:?}", output))
    }

    /// Opens a brokerage session, replacing any live one.
    pub async fn connect(&self, request: ConnectRequest) -> Result<ConnectResponse, ApiError> {
        let defaults = self.brokerage.endpoint();
        let endpoint = Endpoint {
            host: request
                .host
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: request.port.unwrap_or(defaults.port),
            client_id: request.client_id.unwrap_or(defaults.client_id),
        };
        if endpoint.port == 0 {
            return Err(ApiError::InvalidRequest("port must be non-zero".to_string()));
        }

        let (command_id, output) = self
            .submit(Command::Connect(endpoint), self.waits.connect_wait())
            .await?;
        match output {
            CommandOutput::Connected(endpoint) => Ok(ConnectResponse {
                status: "connected".to_string(),
                endpoint,
                command_id,
            }),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Closes the brokerage session.
    pub async fn disconnect(&self) -> Result<AckResponse, ApiError> {
        let (command_id, _) = self
            .submit(Command::Disconnect, self.waits.command_wait())
            .await?;
        Ok(AckResponse {
            status: "success".to_string(),
            message: "Disconnected".to_string(),
            command_id,
        })
    }

    /// Places a BUY limit order.
    ///
    /// Does not check the connection first: a connect queued ahead of this
    /// trade must get the chance to complete.
    pub async fn place_trade(
        &self,
        request: PlaceTradeRequest,
    ) -> Result<PlaceTradeResponse, ApiError> {
        let params = TradeParams::from_request(&self.instrument, &request)?;
        let (command_id, output) = self
            .submit(Command::PlaceTrade(params), self.waits.command_wait())
            .await?;

        match output {
            CommandOutput::OrderPlaced { order_id, contract } => {
                let message = format!(
                    "Order placed: {}x @ ${}",
                    request.qty,
                    request.price.normalize()
                );
                info!("{} (order {})", message, order_id);
                Ok(PlaceTradeResponse {
                    status: "success".to_string(),
                    message,
                    order_id,
                    contract,
                    command_id,
                })
            }
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Cancels an order. Unknown ids succeed without effect.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<CancelOrderResponse, ApiError> {
        let (command_id, output) = self
            .submit(Command::CancelOrder(order_id), self.waits.command_wait())
            .await?;

        match output {
            CommandOutput::OrderCancelled { order_id, removed } => Ok(CancelOrderResponse {
                status: "success".to_string(),
                order_id,
                removed,
                command_id,
            }),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Closes a position. Unknown ids succeed without effect.
    pub async fn close_position(
        &self,
        trade_id: TradeId,
    ) -> Result<ClosePositionResponse, ApiError> {
        let (command_id, output) = self
            .submit(Command::ClosePosition(trade_id), self.waits.command_wait())
            .await?;

        match output {
            CommandOutput::PositionClosed { trade_id, removed } => Ok(ClosePositionResponse {
                status: "success".to_string(),
                trade_id,
                removed,
                command_id,
            }),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Checks that a contract on the configured instrument is listed.
    pub async fn verify_contract(
        &self,
        request: VerifyContractRequest,
    ) -> Result<VerifyContractResponse, ApiError> {
        if crate::brokerage::parse_expiry(request.expiry.trim()).is_none() {
            return Err(ApiError::InvalidRequest(format!(
                "invalid expiry '{}', expected YYYYMMDD",
                request.expiry
            )));
        }
        if request.strike <= Decimal::ZERO {
            return Err(ApiError::InvalidRequest(format!(
                "strike must be positive, got {}",
                request.strike
            )));
        }

        let descriptor = ContractDescriptor {
            symbol: self.instrument.symbol.clone(),
            expiry: request.expiry.trim().to_string(),
            strike: request.strike,
            right: request.right,
            exchange: self.instrument.exchange.clone(),
            currency: self.instrument.currency.clone(),
        };
        let (_, output) = self
            .submit(
                Command::QualifyContract(descriptor),
                self.waits.command_wait(),
            )
            .await?;

        match output {
            CommandOutput::ContractQualified(contract) => Ok(VerifyContractResponse {
                status: "success".to_string(),
                message: "Contract found".to_string(),
                contract,
            }),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Fetches and summarizes the option chain of the configured instrument.
    pub async fn option_chain(&self) -> Result<OptionChainResponse, ApiError> {
        let symbol = self.instrument.symbol.clone();
        let (_, output) = self
            .submit(
                Command::FetchOptionChain {
                    symbol: symbol.clone(),
                },
                self.waits.command_wait(),
            )
            .await?;

        let chains = match output {
            CommandOutput::OptionChain(chains) => chains,
            other => return Err(Self::unexpected(&other)),
        };
        let Some(chain) = chains.into_iter().next() else {
            return Err(ApiError::NotFound(format!(
                "no option chains found for {}",
                symbol
            )));
        };

        let mut expirations = chain.expirations;
        expirations.sort();
        expirations.truncate(CHAIN_EXPIRATIONS);

        let underlying_price = self.latest_price().map(|tick| tick.price);
        let strikes = summarize_strikes(chain.strikes, underlying_price);

        Ok(OptionChainResponse {
            status: "success".to_string(),
            message: format!(
                "Found {} expirations and {} nearby strikes",
                expirations.len(),
                strikes.len()
            ),
            symbol,
            exchange: chain.exchange,
            expirations,
            strikes,
            underlying_price,
        })
    }

    /// Stores the latest underlying price.
    pub fn update_price(
        &self,
        request: UpdatePriceRequest,
    ) -> Result<UpdatePriceResponse, ApiError> {
        if !is_valid_price(request.price) {
            return Err(ApiError::InvalidRequest(format!(
                "price must be positive and at most {}, got {}",
                MAX_PRICE, request.price
            )));
        }

        *self.latest_price.write() = Some(PriceTick {
            price: request.price,
            received_at: Utc::now(),
        });
        Ok(UpdatePriceResponse {
            status: "success".to_string(),
            price: request.price,
        })
    }

    /// Latest underlying price, if any has been received.
    #[must_use]
    pub fn latest_price(&self) -> Option<PriceTick> {
        *self.latest_price.read()
    }

    /// Computes the ladder around the latest underlying price.
    ///
    /// TP and SL distances must lie within `[0, MAX_PRICE]`.
    pub fn ladder(&self, query: &LadderQuery) -> Result<LadderResponse, ApiError> {
        let params = LadderParams {
            selected_offset: query.offset.unwrap_or(0),
            window_radius: query.radius.unwrap_or(self.ladder.window_radius),
            take_profit: query.tp.unwrap_or(self.ladder.take_profit),
            stop_loss: query.sl.unwrap_or(self.ladder.stop_loss),
        };
        for (name, value) in [("tp", params.take_profit), ("sl", params.stop_loss)] {
            if !is_valid_distance(value) {
                return Err(ApiError::InvalidRequest(format!(
                    "{} must be between 0 and {}, got {}",
                    name, MAX_PRICE, value
                )));
            }
        }

        let response = match compute_ladder(self.latest_price().map(|tick| tick.price), &params) {
            LadderWindow::NoPrice => LadderResponse {
                status: LadderStatus::Waiting,
                underlying_price: None,
                levels: None,
                entries: Vec::new(),
            },
            LadderWindow::Ready(ladder) => LadderResponse {
                status: LadderStatus::Ready,
                underlying_price: Some(ladder.underlying),
                levels: Some(ladder.levels),
                entries: ladder.entries,
            },
        };
        Ok(response)
    }

    /// Status snapshot.
    #[must_use]
    pub fn status(&self) -> StatusResponse {
        let connection = self.connection.snapshot();
        let tick = self.latest_price();

        StatusResponse {
            server_running: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            port: self.port,
            brokerage_connected: connection.connected,
            brokerage_endpoint: connection.endpoint,
            last_error: connection.last_error,
            underlying_price: tick.map(|t| round_price(t.price)),
            price_updated_at: tick.map(|t| t.received_at),
            open_orders: self.registry.order_count(),
            open_positions: self.registry.position_count(),
        }
    }

    /// Tracked orders and positions; empty while disconnected.
    #[must_use]
    pub fn orders(&self) -> OrdersResponse {
        if !self.connection.is_connected() {
            return OrdersResponse {
                connected: false,
                orders: Vec::new(),
                positions: Vec::new(),
            };
        }

        OrdersResponse {
            connected: true,
            orders: self.registry.orders(),
            positions: self.registry.positions(),
        }
    }
}

/// Picks the strikes shown in a chain summary.
///
/// With a known underlying price: strikes within $50 of it. Otherwise the
/// lowest strikes. At most 20, ascending.
fn summarize_strikes(mut strikes: Vec<Decimal>, underlying: Option<Decimal>) -> Vec<Decimal> {
    strikes.sort();
    if let Some(price) = underlying {
        strikes.retain(|strike| (*strike - price).abs() <= CHAIN_STRIKE_RANGE);
    }
    strikes.truncate(CHAIN_STRIKES);
    strikes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokerage::{Brokerage, OptionRight, PaperBrokerage};
    use crate::execution::testing::RecordingBrokerage;
    use crate::execution::{CommandKind, ExecutionService};

    fn config() -> Config {
        let mut config = Config::default();
        config.paper.expirations = vec!["20251219".to_string(), "20251212".to_string()];
        config.paper.strike_center = dec!(600);
        config.paper.num_strikes = 121;
        config
    }

    fn setup(config: Config) -> (RequestGateway, ExecutionService) {
        let brokerage = PaperBrokerage::new(&config.instrument.symbol, config.paper.clone());
        setup_with(brokerage, config)
    }

    fn setup_with<B: Brokerage>(brokerage: B, config: Config) -> (RequestGateway, ExecutionService) {
        let service = ExecutionService::spawn(brokerage, config.brokerage.connect_timeout());
        let gateway = RequestGateway::new(
            service.queue(),
            service.registry(),
            service.connection(),
            &config,
        );
        (gateway, service)
    }

    fn trade_request(strike: Decimal) -> PlaceTradeRequest {
        PlaceTradeRequest {
            price: dec!(2.45),
            strike: Some(strike),
            expiry: Some("20251219".to_string()),
            right: OptionRight::Call,
            qty: 2,
            tp: Some(dec!(0.05)),
            sl: Some(dec!(0.03)),
            trigger_price: Some(dec!(600.27)),
        }
    }

    #[test]
    fn test_summarize_strikes_near_price() {
        let strikes: Vec<Decimal> = (500..=700).rev().map(Decimal::from).collect();

        let near = summarize_strikes(strikes.clone(), Some(dec!(612.40)));
        assert_eq!(near.len(), 20);
        assert_eq!(near[0], dec!(563));
        assert!(near.windows(2).all(|w| w[0] < w[1]));

        let first = summarize_strikes(strikes, None);
        assert_eq!(first[0], dec!(500));
        assert_eq!(first[19], dec!(519));

        let none = summarize_strikes(vec![dec!(100), dec!(900)], Some(dec!(600)));
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_place_trade_while_disconnected() {
        let (gateway, _service) = setup(config());

        let err = gateway
            .place_trade(trade_request(dec!(600)))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotConnected));
        assert!(err.to_string().to_lowercase().contains("not connected"));
        assert_eq!(gateway.status().open_orders, 0);
    }

    #[tokio::test]
    async fn test_invalid_trade_is_not_queued() {
        let (gateway, _service) = setup(config());
        let mut request = trade_request(dec!(600));
        request.expiry = None;

        let err = gateway.place_trade(request).await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(gateway.status().last_error.is_none());
    }

    #[tokio::test]
    async fn test_trade_lifecycle() {
        let (gateway, _service) = setup(config());

        let connected = gateway.connect(ConnectRequest::default()).await.unwrap();
        assert_eq!(connected.endpoint.port, 7497);

        let placed = gateway.place_trade(trade_request(dec!(600))).await.unwrap();
        assert_eq!(placed.order_id, 1);
        assert_eq!(placed.contract.strike, dec!(600));
        assert_eq!(placed.message, "Order placed: 2x @ $2.45");

        let listing = gateway.orders();
        assert!(listing.connected);
        assert_eq!(listing.orders.len(), 1);
        assert_eq!(listing.positions[0].take_profit, Some(dec!(600.32)));

        let cancelled = gateway.cancel_order(placed.order_id).await.unwrap();
        assert!(cancelled.removed);

        let closed = gateway.close_position(placed.order_id).await.unwrap();
        assert!(closed.removed);

        let listing = gateway.orders();
        assert!(listing.orders.is_empty());
        assert!(listing.positions.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_unknown_order_succeeds() {
        let (gateway, _service) = setup(config());

        let response = gateway.cancel_order(999).await.unwrap();

        assert_eq!(response.status, "success");
        assert!(!response.removed);
    }

    #[tokio::test]
    async fn test_unlisted_contract() {
        let (gateway, _service) = setup(config());
        gateway.connect(ConnectRequest::default()).await.unwrap();

        let err = gateway
            .place_trade(trade_request(dec!(1000)))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ContractNotFound(ref d) if d.contains("$1000")));
        assert!(gateway.orders().orders.is_empty());
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let mut config = config();
        config.paper.reject_connections = true;
        let (gateway, _service) = setup(config);

        let err = gateway.connect(ConnectRequest::default()).await.unwrap_err();

        assert!(matches!(err, ApiError::Connection(_)));
        let status = gateway.status();
        assert!(!status.brokerage_connected);
        assert_eq!(status.last_error.unwrap().command, CommandKind::Connect);
    }

    #[tokio::test]
    async fn test_no_confirmation_keeps_command_running() {
        let (mut brokerage, _calls) = RecordingBrokerage::new();
        brokerage.call_delay = Duration::from_millis(100);
        let mut config = config();
        config.gateway.command_wait_ms = 10;
        let (gateway, service) = setup_with(brokerage, config);
        gateway.connect(ConnectRequest::default()).await.unwrap();

        let err = gateway
            .place_trade(trade_request(dec!(600)))
            .await
            .unwrap_err();
        let command_id = match err {
            ApiError::NoConfirmation {
                command_id,
                operation,
            } => {
                assert_eq!(operation, CommandKind::PlaceTrade);
                command_id
            }
            other => panic!("unexpected error: {:?}", other),
        };
        assert!(command_id > 1);

        // The placement still lands in the registry.
        let registry = service.registry();
        for _ in 0..50 {
            if registry.order_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(registry.order_count(), 1);
        assert_eq!(registry.position_count(), 1);
    }

    #[tokio::test]
    async fn test_stopped_worker() {
        let (gateway, service) = setup(config());
        service.shutdown().await;

        let err = gateway.disconnect().await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_option_chain_summary() {
        let (gateway, _service) = setup(config());
        gateway.connect(ConnectRequest::default()).await.unwrap();

        let chain = gateway.option_chain().await.unwrap();
        assert_eq!(chain.expirations, vec!["20251212", "20251219"]);
        assert_eq!(chain.strikes.len(), 20);
        assert_eq!(chain.strikes[0], dec!(540));
        assert!(chain.underlying_price.is_none());

        gateway
            .update_price(UpdatePriceRequest {
                price: dec!(610.55),
            })
            .unwrap();
        let chain = gateway.option_chain().await.unwrap();
        assert_eq!(chain.strikes[0], dec!(561));
        assert_eq!(chain.underlying_price, Some(dec!(610.55)));
    }

    #[tokio::test]
    async fn test_verify_contract() {
        let (gateway, _service) = setup(config());
        gateway.connect(ConnectRequest::default()).await.unwrap();

        let found = gateway
            .verify_contract(VerifyContractRequest {
                strike: dec!(605),
                expiry: "20251219".to_string(),
                right: OptionRight::Put,
            })
            .await
            .unwrap();
        assert_eq!(found.contract.right, OptionRight::Put);
        assert_eq!(found.contract.symbol, "SPY");

        let missing = gateway
            .verify_contract(VerifyContractRequest {
                strike: dec!(605),
                expiry: "20260320".to_string(),
                right: OptionRight::Put,
            })
            .await
            .unwrap_err();
        assert!(matches!(missing, ApiError::ContractNotFound(_)));
    }

    #[tokio::test]
    async fn test_ladder_and_price() {
        let (gateway, _service) = setup(config());

        let waiting = gateway.ladder(&LadderQuery::default()).unwrap();
        assert_eq!(waiting.status, LadderStatus::Waiting);
        assert!(waiting.entries.is_empty());

        assert!(
            gateway
                .update_price(UpdatePriceRequest { price: dec!(0) })
                .is_err()
        );
        gateway
            .update_price(UpdatePriceRequest {
                price: dec!(149.23),
            })
            .unwrap();

        let ladder = gateway
            .ladder(&LadderQuery {
                offset: Some(2),
                ..LadderQuery::default()
            })
            .unwrap();
        assert_eq!(ladder.status, LadderStatus::Ready);
        assert_eq!(ladder.entries.len(), 31);
        let levels = ladder.levels.unwrap();
        assert_eq!(levels.entry_trigger, dec!(149.25));
        assert_eq!(levels.take_profit, dec!(149.30));
        assert_eq!(levels.stop_loss, dec!(149.22));

        assert_eq!(gateway.status().underlying_price, Some(dec!(149.23)));
    }

    #[tokio::test]
    async fn test_out_of_range_inputs_are_rejected() {
        let (gateway, _service) = setup(config());

        let err = gateway
            .update_price(UpdatePriceRequest {
                price: Decimal::MAX,
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(gateway.latest_price().is_none());

        gateway
            .update_price(UpdatePriceRequest { price: dec!(100) })
            .unwrap();

        let huge_tp = gateway.ladder(&LadderQuery {
            tp: Some(Decimal::MAX),
            ..LadderQuery::default()
        });
        assert!(matches!(huge_tp, Err(ApiError::InvalidRequest(ref m)) if m.contains("tp")));

        let negative_sl = gateway.ladder(&LadderQuery {
            sl: Some(dec!(-0.03)),
            ..LadderQuery::default()
        });
        assert!(matches!(negative_sl, Err(ApiError::InvalidRequest(ref m)) if m.contains("sl")));

        let huge_sl = gateway.ladder(&LadderQuery {
            sl: Some(Decimal::MAX),
            ..LadderQuery::default()
        });
        assert!(huge_sl.is_err());
    }

    #[tokio::test]
    async fn test_rejected_cancel_keeps_order_listed() {
        let (mut brokerage, _calls) = RecordingBrokerage::new();
        brokerage.reject_cancels = true;
        let (gateway, _service) = setup_with(brokerage, config());
        gateway.connect(ConnectRequest::default()).await.unwrap();
        let placed = gateway.place_trade(trade_request(dec!(600))).await.unwrap();

        let err = gateway.cancel_order(placed.order_id).await.unwrap_err();

        assert!(matches!(err, ApiError::Brokerage(ref m) if m.contains("already filled")));
        let listing = gateway.orders();
        assert_eq!(listing.orders.len(), 1);
        assert_eq!(listing.orders[0].order_id, placed.order_id);
        let last_error = gateway.status().last_error.unwrap();
        assert_eq!(last_error.command, CommandKind::CancelOrder);
    }

    #[tokio::test]
    async fn test_orders_empty_while_disconnected() {
        let (gateway, _service) = setup(config());
        gateway.connect(ConnectRequest::default()).await.unwrap();
        gateway.place_trade(trade_request(dec!(600))).await.unwrap();
        gateway.disconnect().await.unwrap();

        let listing = gateway.orders();
        assert!(!listing.connected);
        assert!(listing.orders.is_empty());
        assert_eq!(gateway.status().open_orders, 1);
    }
}
