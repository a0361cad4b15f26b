//! Commands accepted by the execution worker.

use super::error::ExecutionError;
use crate::brokerage::{
    Contract, ContractDescriptor, Endpoint, OptionChainParams, OptionRight, OrderId, TradeId,
    parse_expiry,
};
use crate::config::InstrumentConfig;
use crate::ladder::{MAX_PRICE, is_valid_distance, is_valid_price, round_price};
use crate::models::PlaceTradeRequest;
use rust_decimal::Decimal;
use std::fmt;
use tokio::sync::oneshot;

/// Identifier assigned to each queued command, increasing in submission order.
pub type CommandId = u64;

/// A brokerage-facing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a session, tearing down any live one first.
    Connect(Endpoint),
    /// Close the live session, if any.
    Disconnect,
    /// Qualify a contract and submit a BUY limit order on it.
    PlaceTrade(TradeParams),
    /// Cancel a working order.
    CancelOrder(OrderId),
    /// Close a position.
    ClosePosition(TradeId),
    /// Resolve a descriptor to a venue contract.
    QualifyContract(ContractDescriptor),
    /// Fetch option chain parameters for an underlying.
    FetchOptionChain {
        /// Underlying symbol.
        symbol: String,
    },
}

/// Command discriminant, used for logging and error records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// [`Command::Connect`]
    Connect,
    /// [`Command::Disconnect`]
    Disconnect,
    /// [`Command::PlaceTrade`]
    PlaceTrade,
    /// [`Command::CancelOrder`]
    CancelOrder,
    /// [`Command::ClosePosition`]
    ClosePosition,
    /// [`Command::QualifyContract`]
    QualifyContract,
    /// [`Command::FetchOptionChain`]
    FetchOptionChain,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::PlaceTrade => "place_trade",
            Self::CancelOrder => "cancel_order",
            Self::ClosePosition => "close_position",
            Self::QualifyContract => "qualify_contract",
            Self::FetchOptionChain => "fetch_option_chain",
        };
        write!(f, "{}", name)
    }
}

impl Command {
    /// Returns the command kind.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Connect(_) => CommandKind::Connect,
            Self::Disconnect => CommandKind::Disconnect,
            Self::PlaceTrade(_) => CommandKind::PlaceTrade,
            Self::CancelOrder(_) => CommandKind::CancelOrder,
            Self::ClosePosition(_) => CommandKind::ClosePosition,
            Self::QualifyContract(_) => CommandKind::QualifyContract,
            Self::FetchOptionChain { .. } => CommandKind::FetchOptionChain,
        }
    }
}

/// Why a trade request could not be turned into [`TradeParams`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeParamsError {
    /// No strike was given.
    #[error("strike is required")]
    MissingStrike,

    /// No expiry was given.
    #[error("expiry is required")]
    MissingExpiry,

    /// Expiry is not a YYYYMMDD date.
    #[error("invalid expiry '{0}', expected YYYYMMDD")]
    InvalidExpiry(String),

    /// Strike is zero or negative.
    #[error("strike must be positive, got {0}")]
    NonPositiveStrike(Decimal),

    /// Limit price is negative.
    #[error("limit price must not be negative, got {0}")]
    NegativeLimitPrice(Decimal),

    /// Quantity is zero.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// A price or distance is outside its accepted range.
    #[error("{field} out of range, got {value}")]
    OutOfRange {
        /// Request field name.
        field: &'static str,
        /// Rejected value.
        value: Decimal,
    },
}

/// Validated parameters of a trade.
///
/// Only constructible through [`TradeParams::from_request`], so a
/// `PlaceTrade` command always carries a strike and a valid expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeParams {
    descriptor: ContractDescriptor,
    limit_price: Decimal,
    quantity: u32,
    trigger_price: Option<Decimal>,
    take_profit: Option<Decimal>,
    stop_loss: Option<Decimal>,
}

impl TradeParams {
    /// Validates a trade request for the configured instrument.
    ///
    /// `tp`/`sl` in the request are dollar distances from the trigger price;
    /// the stored levels are absolute. Levels are only derived when a trigger
    /// price is present.
    ///
    /// # Errors
    ///
    /// Returns [`TradeParamsError`] when a required field is missing or out of range.
    pub fn from_request(
        instrument: &InstrumentConfig,
        request: &PlaceTradeRequest,
    ) -> Result<Self, TradeParamsError> {
        let strike = request.strike.ok_or(TradeParamsError::MissingStrike)?;
        if strike <= Decimal::ZERO {
            return Err(TradeParamsError::NonPositiveStrike(strike));
        }

        let expiry = request
            .expiry
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(TradeParamsError::MissingExpiry)?;
        if parse_expiry(expiry).is_none() {
            return Err(TradeParamsError::InvalidExpiry(expiry.to_string()));
        }

        if request.price < Decimal::ZERO {
            return Err(TradeParamsError::NegativeLimitPrice(request.price));
        }
        if request.qty == 0 {
            return Err(TradeParamsError::ZeroQuantity);
        }

        let out_of_range = |field, value| TradeParamsError::OutOfRange { field, value };
        if strike > MAX_PRICE {
            return Err(out_of_range("strike", strike));
        }
        if request.price > MAX_PRICE {
            return Err(out_of_range("price", request.price));
        }
        if let Some(trigger) = request.trigger_price.filter(|t| !is_valid_price(*t)) {
            return Err(out_of_range("trigger_price", trigger));
        }
        if let Some(tp) = request.tp.filter(|d| !is_valid_distance(*d)) {
            return Err(out_of_range("tp", tp));
        }
        if let Some(sl) = request.sl.filter(|d| !is_valid_distance(*d)) {
            return Err(out_of_range("sl", sl));
        }

        let trigger_price = request.trigger_price.map(round_price);
        let take_profit = trigger_price
            .zip(request.tp)
            .map(|(trigger, tp)| round_price(trigger + tp));
        let stop_loss = trigger_price
            .zip(request.sl)
            .map(|(trigger, sl)| round_price(trigger - sl));

        Ok(Self {
            descriptor: ContractDescriptor {
                symbol: instrument.symbol.clone(),
                expiry: expiry.to_string(),
                strike,
                right: request.right,
                exchange: instrument.exchange.clone(),
                currency: instrument.currency.clone(),
            },
            limit_price: request.price,
            quantity: request.qty,
            trigger_price,
            take_profit,
            stop_loss,
        })
    }

    /// Contract to qualify.
    #[must_use]
    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    /// Option right.
    #[must_use]
    pub fn right(&self) -> OptionRight {
        self.descriptor.right
    }

    /// Limit price per contract.
    #[must_use]
    pub fn limit_price(&self) -> Decimal {
        self.limit_price
    }

    /// Number of contracts.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Underlying entry trigger.
    #[must_use]
    pub fn trigger_price(&self) -> Option<Decimal> {
        self.trigger_price
    }

    /// Absolute take-profit level.
    #[must_use]
    pub fn take_profit(&self) -> Option<Decimal> {
        self.take_profit
    }

    /// Absolute stop-loss level.
    #[must_use]
    pub fn stop_loss(&self) -> Option<Decimal> {
        self.stop_loss
    }
}

/// Successful outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Session opened.
    Connected(Endpoint),
    /// No session is live any more.
    Disconnected,
    /// Order accepted by the venue.
    OrderPlaced {
        /// Venue-assigned order id.
        order_id: OrderId,
        /// Contract the order was placed on.
        contract: Contract,
    },
    /// Cancel processed.
    OrderCancelled {
        /// Requested order id.
        order_id: OrderId,
        /// The order was in the registry and has been removed.
        removed: bool,
    },
    /// Close processed.
    PositionClosed {
        /// Requested trade id.
        trade_id: TradeId,
        /// The position was in the registry and has been removed.
        removed: bool,
    },
    /// Contract resolved.
    ContractQualified(Contract),
    /// Chain parameters, one entry per exchange.
    OptionChain(Vec<OptionChainParams>),
}

/// Result delivered through a command's reply slot.
pub type CommandResult = Result<CommandOutput, ExecutionError>;

/// A command waiting in the queue together with its reply slot.
#[derive(Debug)]
pub struct QueuedCommand {
    /// Command id.
    pub id: CommandId,
    /// The command.
    pub command: Command,
    /// Resolved exactly once by the worker.
    pub reply: oneshot::Sender<CommandResult>,
}
