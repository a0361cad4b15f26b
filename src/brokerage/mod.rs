//! Brokerage capability used by the execution worker.
//!
//! The venue is an opaque collaborator: it opens sessions, qualifies option
//! contracts, accepts limit orders and cancellation requests, and reports
//! option chain parameters. Only the execution worker ever holds a session.

mod paper;

pub use paper::PaperBrokerage;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Venue-assigned order identifier.
pub type OrderId = u64;

/// Position identifier. Positions share the id of their originating order.
pub type TradeId = u64;

/// Brokerage-layer error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerageError {
    /// The venue could not be reached or refused the session.
    #[error("venue unreachable: {0}")]
    Unreachable(String),

    /// The venue rejected the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The session is no longer usable.
    #[error("session error: {0}")]
    Session(String),
}

/// Address of a brokerage gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Endpoint {
    /// Gateway host.
    pub host: String,
    /// Gateway port.
    pub port: u16,
    /// Client id presented to the gateway.
    pub client_id: i32,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} client={}", self.host, self.port, self.client_id)
    }
}

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
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
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderAction {
    /// Buy to open.
    Buy,
    /// Sell to close.
    Sell,
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Unqualified description of an option contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContractDescriptor {
    /// Underlying symbol.
    pub symbol: String,
    /// Expiration in YYYYMMDD format.
    pub expiry: String,
    /// Strike price.
    pub strike: Decimal,
    /// Call or put.
    pub right: OptionRight,
    /// Routing exchange.
    pub exchange: String,
    /// Trading currency.
    pub currency: String,
}

impl fmt::Display for ContractDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ${} {}",
            self.symbol,
            self.expiry,
            self.strike.normalize(),
            self.right
        )
    }
}

/// A contract the venue has resolved to a tradeable instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Contract {
    /// Venue contract id.
    pub con_id: i64,
    /// Underlying symbol.
    pub symbol: String,
    /// Expiration in YYYYMMDD format.
    pub expiry: String,
    /// Strike price.
    pub strike: Decimal,
    /// Call or put.
    pub right: OptionRight,
    /// Exchange the contract was qualified on.
    pub exchange: String,
}

/// Limit order as submitted to the venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrder {
    /// Order action.
    pub action: OrderAction,
    /// Number of contracts.
    pub quantity: u32,
    /// Limit price per contract.
    pub limit_price: Decimal,
}

/// Handle to an order accepted by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderHandle {
    /// Venue-assigned order id.
    pub order_id: OrderId,
}

/// Option chain parameters for an underlying on one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChainParams {
    /// Exchange the chain is listed on.
    pub exchange: String,
    /// Listed expirations (YYYYMMDD).
    pub expirations: Vec<String>,
    /// Listed strikes.
    pub strikes: Vec<Decimal>,
}

/// Execution venue capability.
///
/// Implementations are driven by a single task; sessions are never shared.
#[async_trait]
pub trait Brokerage: Send + 'static {
    /// Live session with the venue.
    type Session: Send + 'static;

    /// Opens a new session.
    async fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Session, BrokerageError>;

    /// Closes a session.
    async fn disconnect(&mut self, session: Self::Session);

    /// Resolves a descriptor to a tradeable contract, `None` when nothing matches.
    async fn qualify_contract(
        &mut self,
        session: &mut Self::Session,
        descriptor: &ContractDescriptor,
    ) -> Result<Option<Contract>, BrokerageError>;

    /// Submits a limit order.
    async fn place_order(
        &mut self,
        session: &mut Self::Session,
        contract: &Contract,
        order: &LimitOrder,
    ) -> Result<OrderHandle, BrokerageError>;

    /// Requests cancellation of a working order.
    async fn cancel_order(
        &mut self,
        session: &mut Self::Session,
        handle: &OrderHandle,
    ) -> Result<(), BrokerageError>;

    /// Fetches option chain parameters for an underlying.
    async fn option_chain(
        &mut self,
        session: &mut Self::Session,
        symbol: &str,
    ) -> Result<Vec<OptionChainParams>, BrokerageError>;
}

/// Parses an expiration string (YYYYMMDD).
#[must_use]
pub fn parse_expiry(expiry: &str) -> Option<chrono::NaiveDate> {
    if expiry.len() != 8 || !expiry.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    chrono::NaiveDate::parse_from_str(expiry, "%Y%m%d").ok()
}
