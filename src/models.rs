//! Request and response models for the REST API.

use crate::brokerage::{Contract, Endpoint, OptionRight, OrderId, TradeId};
use crate::execution::{CommandId, RecordedError};
use crate::ladder::{LadderEntry, TradeLevels};
use crate::registry::{OrderRecord, PositionRecord};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Latest underlying price as pushed by the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceTick {
    /// Underlying price.
    pub price: Decimal,
    /// When the price was received.
    pub received_at: DateTime<Utc>,
}

/// Server and brokerage status snapshot.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// The HTTP server is up.
    pub server_running: bool,
    /// Service version.
    pub version: String,
    /// Port the server listens on.
    pub port: u16,
    /// A brokerage session is live.
    pub brokerage_connected: bool,
    /// Endpoint of the live session.
    pub brokerage_endpoint: Option<Endpoint>,
    /// Most recent command failure, with the command that produced it.
    pub last_error: Option<RecordedError>,
    /// Latest underlying price, rounded to cents.
    pub underlying_price: Option<Decimal>,
    /// When the latest price was received.
    pub price_updated_at: Option<DateTime<Utc>>,
    /// Orders currently tracked.
    pub open_orders: usize,
    /// Positions currently tracked.
    pub open_positions: usize,
}

/// Underlying price push.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePriceRequest {
    /// Underlying price.
    pub price: Decimal,
}

/// Acknowledgement of a price push.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePriceResponse {
    /// Always "success".
    pub status: String,
    /// Price now held as latest.
    pub price: Decimal,
}

/// Ladder query parameters. Unset values fall back to configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LadderQuery {
    /// Selected row relative to the middle row (clamped to ±250).
    pub offset: Option<i32>,
    /// Rows on each side of the selected row.
    pub radius: Option<u32>,
    /// Take-profit distance in dollars.
    pub tp: Option<Decimal>,
    /// Stop-loss distance in dollars.
    pub sl: Option<Decimal>,
}

/// Whether a ladder could be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LadderStatus {
    /// No underlying price yet.
    Waiting,
    /// Ladder computed.
    Ready,
}

/// Ladder window and trade levels.
#[derive(Debug, Serialize, ToSchema)]
pub struct LadderResponse {
    /// Ladder status.
    pub status: LadderStatus,
    /// Underlying price the ladder was computed from.
    pub underlying_price: Option<Decimal>,
    /// Levels for the selected row.
    pub levels: Option<TradeLevels>,
    /// Rows in ascending grid order.
    pub entries: Vec<LadderEntry>,
}

/// Connect request. Unset fields fall back to the configured endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ConnectRequest {
    /// Gateway host.
    pub host: Option<String>,
    /// Gateway port.
    pub port: Option<u16>,
    /// Client id.
    pub client_id: Option<i32>,
}

/// Connect confirmation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectResponse {
    /// Always "connected".
    pub status: String,
    /// Endpoint of the new session.
    pub endpoint: Endpoint,
    /// Id of the connect command.
    pub command_id: CommandId,
}

/// Generic command acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AckResponse {
    /// Always "success".
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Id of the command.
    pub command_id: CommandId,
}

fn default_quantity() -> u32 {
    1
}

/// Trade request.
///
/// `tp` and `sl` are dollar distances from `trigger_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlaceTradeRequest {
    /// Option limit price.
    pub price: Decimal,
    /// Strike price.
    pub strike: Option<Decimal>,
    /// Expiration (YYYYMMDD).
    pub expiry: Option<String>,
    /// Call or put.
    #[serde(default, alias = "type")]
    pub right: OptionRight,
    /// Number of contracts.
    #[serde(default = "default_quantity")]
    pub qty: u32,
    /// Take-profit distance in dollars.
    pub tp: Option<Decimal>,
    /// Stop-loss distance in dollars.
    pub sl: Option<Decimal>,
    /// Underlying entry trigger.
    pub trigger_price: Option<Decimal>,
}

/// Trade confirmation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceTradeResponse {
    /// Always "success".
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Venue-assigned order id. Also the trade id of the opened position.
    pub order_id: OrderId,
    /// Qualified contract.
    pub contract: Contract,
    /// Id of the place-trade command.
    pub command_id: CommandId,
}

/// Cancel confirmation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelOrderResponse {
    /// Always "success".
    pub status: String,
    /// Requested order id.
    pub order_id: OrderId,
    /// The order was tracked and has been removed.
    pub removed: bool,
    /// Id of the cancel command.
    pub command_id: CommandId,
}

/// Close confirmation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClosePositionResponse {
    /// Always "success".
    pub status: String,
    /// Requested trade id.
    pub trade_id: TradeId,
    /// The position was tracked and has been removed.
    pub removed: bool,
    /// Id of the close command.
    pub command_id: CommandId,
}

/// Orders and positions listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrdersResponse {
    /// A brokerage session is live. Lists are empty otherwise.
    pub connected: bool,
    /// Tracked orders.
    pub orders: Vec<OrderRecord>,
    /// Tracked positions.
    pub positions: Vec<PositionRecord>,
}

/// Contract verification request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyContractRequest {
    /// Strike price.
    pub strike: Decimal,
    /// Expiration (YYYYMMDD).
    pub expiry: String,
    /// Call or put.
    #[serde(default, alias = "type")]
    pub right: OptionRight,
}

/// Contract verification result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyContractResponse {
    /// Always "success".
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Qualified contract.
    pub contract: Contract,
}

/// Summarized option chain for the configured instrument.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OptionChainResponse {
    /// Always "success".
    pub status: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Exchange the chain is listed on.
    pub exchange: String,
    /// Nearest expirations, ascending.
    pub expirations: Vec<String>,
    /// Strikes near the underlying, ascending.
    pub strikes: Vec<Decimal>,
    /// Underlying price used to pick strikes.
    pub underlying_price: Option<Decimal>,
    /// Human-readable summary.
    pub message: String,
}
