//! In-memory paper venue.
//!
//! Lists a fixed set of expirations and a strike grid for one underlying,
//! assigns sequential order ids and keeps working orders across sessions, so
//! an order placed before a reconnect can still be cancelled after it.

use super::{
    Brokerage, BrokerageError, Contract, ContractDescriptor, Endpoint, LimitOrder,
    OptionChainParams, OptionRight, OrderHandle, OrderId,
};
use crate::config::PaperVenueConfig;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, info};

/// Session with the paper venue.
#[derive(Debug)]
pub struct PaperSession {
    endpoint: Endpoint,
}

/// Simulated execution venue.
#[derive(Debug)]
pub struct PaperBrokerage {
    symbol: String,
    config: PaperVenueConfig,
    strikes: Vec<Decimal>,
    next_order_id: OrderId,
    working: HashMap<OrderId, LimitOrder>,
}

impl PaperBrokerage {
    /// Creates a paper venue listing options on `symbol`.
    #[must_use]
    pub fn new(symbol: &str, config: PaperVenueConfig) -> Self {
        let strikes = config.generate_strikes();
        Self {
            symbol: symbol.to_string(),
            config,
            strikes,
            next_order_id: 1,
            working: HashMap::new(),
        }
    }

    /// Number of orders still working at the venue.
    #[must_use]
    pub fn working_count(&self) -> usize {
        self.working.len()
    }

    /// Venue contract id: stable per (expiry, strike, right) listing.
    fn con_id(&self, expiry_idx: usize, strike_idx: usize, right: OptionRight) -> i64 {
        let right_code = match right {
            OptionRight::Call => 0,
            OptionRight::Put => 1,
        };
        let listing = (expiry_idx * self.strikes.len() + strike_idx) * 2 + right_code;
        500_000_000 + listing as i64
    }
}

#[async_trait]
impl Brokerage for PaperBrokerage {
    type Session = PaperSession;

    async fn connect(&mut self, endpoint: &Endpoint) -> Result<PaperSession, BrokerageError> {
        if self.config.reject_connections {
            return Err(BrokerageError::Unreachable(format!(
                "connection refused by {}",
                endpoint
            )));
        }

        info!("Paper session opened for {}", endpoint);
        Ok(PaperSession {
            endpoint: endpoint.clone(),
        })
    }

    async fn disconnect(&mut self, session: PaperSession) {
        info!(
            "Paper session closed for {} ({} orders still working)",
            session.endpoint,
            self.working.len()
        );
    }

    async fn qualify_contract(
        &mut self,
        _session: &mut PaperSession,
        descriptor: &ContractDescriptor,
    ) -> Result<Option<Contract>, BrokerageError> {
        if !descriptor.symbol.eq_ignore_ascii_case(&self.symbol) {
            return Ok(None);
        }

        let expiry_idx = self
            .config
            .expirations
            .iter()
            .position(|exp| *exp == descriptor.expiry);
        let strike_idx = self.strikes.iter().position(|s| *s == descriptor.strike);

        let (Some(expiry_idx), Some(strike_idx)) = (expiry_idx, strike_idx) else {
            debug!("No paper listing for {}", descriptor);
            return Ok(None);
        };

        Ok(Some(Contract {
            con_id: self.con_id(expiry_idx, strike_idx, descriptor.right),
            symbol: self.symbol.clone(),
            expiry: descriptor.expiry.clone(),
            strike: descriptor.strike,
            right: descriptor.right,
            exchange: self.config.exchange.clone(),
        }))
    }

    async fn place_order(
        &mut self,
        _session: &mut PaperSession,
        contract: &Contract,
        order: &LimitOrder,
    ) -> Result<OrderHandle, BrokerageError> {
        if order.quantity == 0 {
            return Err(BrokerageError::Rejected(
                "order quantity must be positive".to_string(),
            ));
        }

        let order_id = self.next_order_id;
        self.next_order_id += 1;
        self.working.insert(order_id, order.clone());

        debug!(
            "Paper order {} working: {} {}x conId={} @ {}",
            order_id, order.action, order.quantity, contract.con_id, order.limit_price
        );
        Ok(OrderHandle { order_id })
    }

    async fn cancel_order(
        &mut self,
        _session: &mut PaperSession,
        handle: &OrderHandle,
    ) -> Result<(), BrokerageError> {
        match self.working.remove(&handle.order_id) {
            Some(_) => Ok(()),
            None => Err(BrokerageError::Rejected(format!(
                "order {} is not working",
                handle.order_id
            ))),
        }
    }

    async fn option_chain(
        &mut self,
        _session: &mut PaperSession,
        symbol: &str,
    ) -> Result<Vec<OptionChainParams>, BrokerageError> {
        if !symbol.eq_ignore_ascii_case(&self.symbol) {
            return Ok(Vec::new());
        }

        Ok(vec![OptionChainParams {
            exchange: self.config.exchange.clone(),
            expirations: self.config.expirations.clone(),
            strikes: self.strikes.clone(),
        }])
    }
}
