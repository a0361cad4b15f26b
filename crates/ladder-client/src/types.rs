//! Request and response types mirroring the Ladder Execution API.
//!
//! Prices are [`Decimal`] and travel as JSON strings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
mod tests;

/// Venue-assigned order id.
pub type OrderId = u64;

/// Trade id. Equal to the id of the order that opened the position.
pub type TradeId = u64;

/// Id of a queued execution command.
pub type CommandId = u64;

// ============================================================================
// Shared
// ============================================================================

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OptionRight {
    /// Call option.
    #[default]
    #[serde(rename = "C", alias = "c", alias = "call", alias = "CALL")]
    Call,
    /// Put option.
    #[serde(rename = "P", alias = "p", alias = "put", alias = "PUT")]
    Put,
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// Order action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderAction {
    /// Buy to open.
    Buy,
    /// Sell to close.
    Sell,
}

/// Brokerage gateway address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Gateway host.
    pub host: String,
    /// Gateway port.
    pub port: u16,
    /// Client id.
    pub client_id: i32,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} client={}", self.host, self.port, self.client_id)
    }
}

/// A qualified option contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Venue contract id.
    pub con_id: i64,
    /// Underlying symbol.
    pub symbol: String,
    /// Expiration (YYYYMMDD).
    pub expiry: String,
    /// Strike price.
    pub strike: Decimal,
    /// Call or put.
    pub right: OptionRight,
    /// Exchange.
    pub exchange: String,
}

/// Kind of an execution command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Open a brokerage session.
    Connect,
    /// Close the brokerage session.
    Disconnect,
    /// Place a trade.
    PlaceTrade,
    /// Cancel an order.
    CancelOrder,
    /// Close a position.
    ClosePosition,
    /// Qualify a contract.
    QualifyContract,
    /// Fetch option chain parameters.
    FetchOptionChain,
}

/// Most recent command failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    /// Id of the failed command.
    pub command_id: CommandId,
    /// Kind of the failed command.
    pub command: CommandKind,
    /// Failure message.
    pub message: String,
    /// When the failure happened.
    pub at: DateTime<Utc>,
}

// ============================================================================
// Health & Status
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Server and brokerage status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// The HTTP server is up.
    pub server_running: bool,
    /// Service version.
    pub version: String,
    /// Server port.
    pub port: u16,
    /// A brokerage session is live.
    pub brokerage_connected: bool,
    /// Endpoint of the live session.
    pub brokerage_endpoint: Option<Endpoint>,
    /// Most recent command failure.
    pub last_error: Option<RecordedError>,
    /// Latest underlying price.
    pub underlying_price: Option<Decimal>,
    /// When the latest price was received.
    pub price_updated_at: Option<DateTime<Utc>>,
    /// Orders currently tracked.
    pub open_orders: usize,
    /// Positions currently tracked.
    pub open_positions: usize,
}

// ============================================================================
// Price & Ladder
// ============================================================================

/// Underlying price push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePriceRequest {
    /// Underlying price.
    pub price: Decimal,
}

/// Price push acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePriceResponse {
    /// Status.
    pub status: String,
    /// Price now held as latest.
    pub price: Decimal,
}

/// Ladder query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LadderQuery {
    /// Selected row relative to the middle row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i32>,
    /// Rows on each side of the selected row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    /// Take-profit distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp: Option<Decimal>,
    /// Stop-loss distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl: Option<Decimal>,
}

/// Ladder status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LadderStatus {
    /// No underlying price yet.
    Waiting,
    /// Ladder computed.
    Ready,
}

impl fmt::Display for LadderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// One ladder row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderEntry {
    /// Grid index (0..=1000).
    pub grid_index: i32,
    /// Option price for the row.
    pub option_price: Decimal,
    /// Underlying trigger price for the row.
    pub trigger_price: Decimal,
    /// Trigger equals the underlying.
    pub is_mid_market: bool,
    /// Row is the selected one.
    pub is_selected: bool,
}

/// Entry, take-profit and stop-loss levels for the selected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLevels {
    /// Selected offset after clamping.
    pub offset: i32,
    /// Option price of the selected row.
    pub option_price: Decimal,
    /// Underlying entry trigger.
    pub entry_trigger: Decimal,
    /// Take-profit level.
    pub take_profit: Decimal,
    /// Stop-loss level.
    pub stop_loss: Decimal,
}

/// Ladder response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderResponse {
    /// Ladder status.
    pub status: LadderStatus,
    /// Underlying price used.
    pub underlying_price: Option<Decimal>,
    /// Levels for the selected row.
    pub levels: Option<TradeLevels>,
    /// Rows in ascending grid order.
    pub entries: Vec<LadderEntry>,
}

// ============================================================================
// Brokerage Session
// ============================================================================

/// Connect request. Unset fields use the server's configured endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Gateway host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Gateway port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Client id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i32>,
}

/// Connect confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    /// Status.
    pub status: String,
    /// Endpoint of the session.
    pub endpoint: Endpoint,
    /// Command id.
    pub command_id: CommandId,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    /// Status.
    pub status: String,
    /// Message.
    pub message: String,
    /// Command id.
    pub command_id: CommandId,
}

// ============================================================================
// Trading
// ============================================================================

/// Trade request. `tp` and `sl` are dollar distances from `trigger_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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
    pub qty: u32,
    /// Take-profit distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp: Option<Decimal>,
    /// Stop-loss distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl: Option<Decimal>,
    /// Underlying entry trigger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<Decimal>,
}

impl PlaceTradeRequest {
    /// Creates a single-contract request without trade levels.
    #[must_use]
    pub fn new(price: Decimal, strike: Decimal, expiry: &str, right: OptionRight) -> Self {
        Self {
            price,
            strike: Some(strike),
            expiry: Some(expiry.to_string()),
            right,
            qty: 1,
            tp: None,
            sl: None,
            trigger_price: None,
        }
    }

    /// Sets the number of contracts.
    #[must_use]
    pub fn with_qty(mut self, qty: u32) -> Self {
        self.qty = qty;
        self
    }

    /// Sets the entry trigger with take-profit and stop-loss distances.
    #[must_use]
    pub fn with_levels(mut self, trigger_price: Decimal, tp: Decimal, sl: Decimal) -> Self {
        self.trigger_price = Some(trigger_price);
        self.tp = Some(tp);
        self.sl = Some(sl);
        self
    }
}

/// Trade confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceTradeResponse {
    /// Status.
    pub status: String,
    /// Message.
    pub message: String,
    /// Order id, also the trade id.
    pub order_id: OrderId,
    /// Qualified contract.
    pub contract: Contract,
    /// Command id.
    pub command_id: CommandId,
}

/// Cancel confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrderResponse {
    /// Status.
    pub status: String,
    /// Order id.
    pub order_id: OrderId,
    /// The order was tracked and has been removed.
    pub removed: bool,
    /// Command id.
    pub command_id: CommandId,
}

/// Close confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosePositionResponse {
    /// Status.
    pub status: String,
    /// Trade id.
    pub trade_id: TradeId,
    /// The position was tracked and has been removed.
    pub removed: bool,
    /// Command id.
    pub command_id: CommandId,
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Working.
    Submitted,
    /// Filled.
    Filled,
    /// Cancelled.
    Cancelled,
    /// Rejected.
    Rejected,
}

/// A tracked order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order id.
    pub order_id: OrderId,
    /// Contract.
    pub contract: Contract,
    /// Action.
    pub action: OrderAction,
    /// Number of contracts.
    pub quantity: u32,
    /// Limit price.
    pub limit_price: Decimal,
    /// Status.
    pub status: OrderStatus,
    /// Placement time.
    pub created_at: DateTime<Utc>,
}

/// A tracked position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Trade id.
    pub trade_id: TradeId,
    /// Originating order.
    pub order_id: OrderId,
    /// Open time.
    pub opened_at: DateTime<Utc>,
    /// Entry trigger.
    pub entry_trigger: Option<Decimal>,
    /// Take-profit level.
    pub take_profit: Option<Decimal>,
    /// Stop-loss level.
    pub stop_loss: Option<Decimal>,
}

/// Orders and positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersResponse {
    /// A brokerage session is live.
    pub connected: bool,
    /// Orders.
    pub orders: Vec<OrderRecord>,
    /// Positions.
    pub positions: Vec<PositionRecord>,
}

// ============================================================================
// Discovery
// ============================================================================

/// Contract verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyContractRequest {
    /// Strike price.
    pub strike: Decimal,
    /// Expiration (YYYYMMDD).
    pub expiry: String,
    /// Call or put.
    pub right: OptionRight,
}

/// Contract verification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyContractResponse {
    /// Status.
    pub status: String,
    /// Message.
    pub message: String,
    /// Qualified contract.
    pub contract: Contract,
}

/// Option chain summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChainResponse {
    /// Status.
    pub status: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Exchange.
    pub exchange: String,
    /// Nearest expirations.
    pub expirations: Vec<String>,
    /// Strikes near the underlying.
    pub strikes: Vec<Decimal>,
    /// Underlying price used.
    pub underlying_price: Option<Decimal>,
    /// Summary.
    pub message: String,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}
