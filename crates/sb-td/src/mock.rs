//! In-memory [`FuturesExchange`] for tests.
//!
//! Prices, lot sizes and positions are seeded up front; order responses can be
//! scripted. Every submitted order is recorded so tests can assert on exactly
//! what would have reached the exchange.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sb_core::OrderStatus;
use sb_core::trading::*;

use crate::FuturesExchange;

/// Scriptable mock exchange.
#[derive(Default)]
pub struct MockExchange {
    prices: Mutex<HashMap<String, Decimal>>,
    lot_sizes: Mutex<HashMap<String, LotSizeRule>>,
    positions: Mutex<HashMap<String, Decimal>>,
    /// Responses handed out to `place_order` in FIFO order.
    scripted: Mutex<VecDeque<OrderAck>>,
    orders: Mutex<Vec<OrderRequest>>,
    cancels: Mutex<Vec<(String, u64)>>,
    next_order_id: AtomicU64,
    fail_requests: AtomicBool,
}

impl MockExchange {
    pub fn new() -> Self {
        Self {
            next_order_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    /// Seed a tradable symbol.
    pub fn with_symbol(self, symbol: &str, price: Decimal, rule: LotSizeRule) -> Self {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
        self.lot_sizes.lock().unwrap().insert(symbol.to_string(), rule);
        self
    }

    /// Seed a symbol that has a price but no `LOT_SIZE` filter.
    pub fn with_price_only(self, symbol: &str, price: Decimal) -> Self {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
        self
    }

    /// Seed a signed position.
    pub fn with_position(self, symbol: &str, signed_qty: Decimal) -> Self {
        self.positions.lock().unwrap().insert(symbol.to_string(), signed_qty);
        self
    }

    /// Queue the response for the next `place_order` call.
    pub fn push_response(&self, ack: OrderAck) {
        self.scripted.lock().unwrap().push_back(ack);
    }

    /// Make every call fail as if the exchange were unreachable.
    pub fn fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Orders submitted so far, in submission order.
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    /// Cancels requested so far.
    pub fn cancels(&self) -> Vec<(String, u64)> {
        self.cancels.lock().unwrap().clone()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            bail!("mock exchange unreachable");
        }
        Ok(())
    }

    fn accepted(&self) -> OrderAck {
        OrderAck {
            order_id: Some(self.next_order_id.fetch_add(1, Ordering::SeqCst)),
            status: Some(OrderStatus::New),
            message: None,
        }
    }
}

#[async_trait]
impl FuturesExchange for MockExchange {
    fn name(&self) -> &str {
        "mock"
    }

    async fn price(&self, symbol: &str) -> Result<Option<Decimal>> {
        self.check_reachable()?;
        Ok(self.prices.lock().unwrap().get(symbol).copied())
    }

    async fn lot_size(&self, symbol: &str) -> Result<Option<LotSizeRule>> {
        self.check_reachable()?;
        Ok(self.lot_sizes.lock().unwrap().get(symbol).copied())
    }

    async fn position(&self, symbol: &str) -> Result<PositionSnapshot> {
        self.check_reachable()?;
        let signed_qty = self
            .positions
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .unwrap_or(Decimal::ZERO);
        Ok(PositionSnapshot {
            symbol: symbol.to_string(),
            signed_qty,
        })
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        self.check_reachable()?;
        self.orders.lock().unwrap().push(order.clone());
        let scripted = self.scripted.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| self.accepted()))
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<OrderAck> {
        self.check_reachable()?;
        self.cancels.lock().unwrap().push((symbol.to_string(), order_id));
        Ok(OrderAck {
            order_id: Some(order_id),
            status: Some(OrderStatus::Canceled),
            message: None,
        })
    }
}
