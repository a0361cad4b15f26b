//! In-memory store of orders and positions.
//!
//! Two independent DashMap tables:
//! - orders keyed by the venue-assigned order id
//! - positions keyed by trade id (the id of the originating order)
//!
//! There is no foreign-key link between the tables. Only the execution
//! worker mutates the registry; everyone else reads snapshots.

use crate::brokerage::{Contract, OrderAction, OrderId, TradeId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted by the venue, working.
    Submitted,
    /// Filled.
    Filled,
    /// Cancelled.
    Cancelled,
    /// Rejected by the venue.
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Filled => write!(f, "filled"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// An order placed through the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderRecord {
    /// Venue-assigned order id.
    pub order_id: OrderId,
    /// Qualified contract the order was placed on.
    pub contract: Contract,
    /// Order action.
    pub action: OrderAction,
    /// Number of contracts.
    pub quantity: u32,
    /// Limit price per contract.
    pub limit_price: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// A position opened by a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PositionRecord {
    /// Trade id.
    pub trade_id: TradeId,
    /// Order that opened the position.
    pub order_id: OrderId,
    /// When the position was opened.
    pub opened_at: DateTime<Utc>,
    /// Underlying entry trigger, as submitted.
    pub entry_trigger: Option<Decimal>,
    /// Take-profit level, as submitted.
    pub take_profit: Option<Decimal>,
    /// Stop-loss level, as submitted.
    pub stop_loss: Option<Decimal>,
}

/// Concurrent order and position tables.
#[derive(Debug, Default)]
pub struct TradeRegistry {
    orders: DashMap<OrderId, OrderRecord>,
    positions: DashMap<TradeId, PositionRecord>,
}

impl TradeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_order(&self, order: OrderRecord) {
        self.orders.insert(order.order_id, order);
    }

    pub(crate) fn open_position(&self, position: PositionRecord) {
        self.positions.insert(position.trade_id, position);
    }

    /// Removes an order, returning it if it was present.
    pub(crate) fn remove_order(&self, order_id: OrderId) -> Option<OrderRecord> {
        self.orders.remove(&order_id).map(|(_, order)| order)
    }

    /// Removes a position, returning it if it was present.
    pub(crate) fn remove_position(&self, trade_id: TradeId) -> Option<PositionRecord> {
        self.positions.remove(&trade_id).map(|(_, position)| position)
    }

    /// Gets an order by id.
    #[must_use]
    pub fn order(&self, order_id: OrderId) -> Option<OrderRecord> {
        self.orders.get(&order_id).map(|entry| entry.value().clone())
    }

    /// Gets a position by trade id.
    #[must_use]
    pub fn position(&self, trade_id: TradeId) -> Option<PositionRecord> {
        self.positions.get(&trade_id).map(|entry| entry.value().clone())
    }

    /// All orders, ordered by id.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRecord> {
        let mut orders: Vec<OrderRecord> =
            self.orders.iter().map(|entry| entry.value().clone()).collect();
        orders.sort_by_key(|order| order.order_id);
        orders
    }

    /// All positions, ordered by trade id.
    #[must_use]
    pub fn positions(&self) -> Vec<PositionRecord> {
        let mut positions: Vec<PositionRecord> = self
            .positions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        positions.sort_by_key(|position| position.trade_id);
        positions
    }

    /// Number of orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of positions.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }
}
