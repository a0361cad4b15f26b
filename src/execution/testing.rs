//! Recording brokerage double for worker tests.

use crate::brokerage::{
    Brokerage, BrokerageError, Contract, ContractDescriptor, Endpoint, LimitOrder,
    OptionChainParams, OrderHandle, OrderId,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A brokerage call as observed by the double.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(u16),
    Disconnect(u16),
    Qualify(Decimal),
    Place(OrderId),
    Cancel(OrderId),
    OptionChain(String),
}

/// Observation handle kept by the test after the double moves into the worker.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
    in_flight: Arc<AtomicBool>,
    overlapped: Arc<AtomicBool>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Whether two brokerage calls ever ran at the same time.
    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    fn enter(&self, call: Call) -> InFlight {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.calls.lock().push(call);
        InFlight {
            flag: Arc::clone(&self.in_flight),
        }
    }
}

struct InFlight {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct MockSession {
    port: u16,
}

/// Brokerage double that records every call.
#[derive(Debug, Default)]
pub struct RecordingBrokerage {
    call_log: CallLog,
    /// Delay inside every call, to widen overlap windows.
    pub call_delay: Duration,
    /// Delay before `connect` answers.
    pub connect_delay: Duration,
    /// Port whose connection attempts are refused.
    pub refused_port: Option<u16>,
    /// Strike that has no listed contract.
    pub unlisted_strike: Option<Decimal>,
    /// Every cancel request is rejected.
    pub reject_cancels: bool,
    next_order_id: OrderId,
}

impl RecordingBrokerage {
    pub fn new() -> (Self, CallLog) {
        let brokerage = Self {
            next_order_id: 100,
            ..Self::default()
        };
        let call_log = brokerage.call_log.clone();
        (brokerage, call_log)
    }

    async fn pause(&self) {
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }
    }
}

#[async_trait]
impl Brokerage for RecordingBrokerage {
    type Session = MockSession;

    async fn connect(&mut self, endpoint: &Endpoint) -> Result<MockSession, BrokerageError> {
        let _guard = self.call_log.enter(Call::Connect(endpoint.port));
        self.pause().await;
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
        if self.refused_port == Some(endpoint.port) {
            return Err(BrokerageError::Unreachable(format!(
                "connection refused on port {}",
                endpoint.port
            )));
        }
        Ok(MockSession {
            port: endpoint.port,
        })
    }

    async fn disconnect(&mut self, session: MockSession) {
        let _guard = self.call_log.enter(Call::Disconnect(session.port));
        self.pause().await;
    }

    async fn qualify_contract(
        &mut self,
        _session: &mut MockSession,
        descriptor: &ContractDescriptor,
    ) -> Result<Option<Contract>, BrokerageError> {
        let _guard = self.call_log.enter(Call::Qualify(descriptor.strike));
        self.pause().await;
        if self.unlisted_strike == Some(descriptor.strike) {
            return Ok(None);
        }
        Ok(Some(Contract {
            con_id: 42,
            symbol: descriptor.symbol.clone(),
            expiry: descriptor.expiry.clone(),
            strike: descriptor.strike,
            right: descriptor.right,
            exchange: descriptor.exchange.clone(),
        }))
    }

    async fn place_order(
        &mut self,
        _session: &mut MockSession,
        _contract: &Contract,
        _order: &LimitOrder,
    ) -> Result<OrderHandle, BrokerageError> {
        let order_id = self.next_order_id;
        self.next_order_id += 1;
        let _guard = self.call_log.enter(Call::Place(order_id));
        self.pause().await;
        Ok(OrderHandle { order_id })
    }

    async fn cancel_order(
        &mut self,
        _session: &mut MockSession,
        handle: &OrderHandle,
    ) -> Result<(), BrokerageError> {
        let _guard = self.call_log.enter(Call::Cancel(handle.order_id));
        self.pause().await;
        if self.reject_cancels {
            return Err(BrokerageError::Rejected(format!(
                "order {} already filled",
                handle.order_id
            )));
        }
        Ok(())
    }

    async fn option_chain(
        &mut self,
        _session: &mut MockSession,
        symbol: &str,
    ) -> Result<Vec<OptionChainParams>, BrokerageError> {
        let _guard = self.call_log.enter(Call::OptionChain(symbol.to_string()));
        self.pause().await;
        Ok(vec![OptionChainParams {
            exchange: "SMART".to_string(),
            expirations: vec!["20251219".to_string()],
            strikes: vec![Decimal::from(600)],
        }])
    }
}
