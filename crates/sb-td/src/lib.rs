//! # sb-td
//!
//! Order execution for USDT-margined futures.
//!
//! The exchange is reached through the [`FuturesExchange`] trait, which covers
//! the handful of lookups and order operations a trade signal needs. The
//! [`executor`] drives one signal through price lookup, sizing, position
//! reconciliation and order submission.
//!
//! ## Supported exchanges
//!
//! | Exchange | Module    | Account      | Order channel |
//! |----------|-----------|--------------|---------------|
//! | Binance  | `binance` | USDT-M (fapi)| REST          |

pub mod binance;
pub mod executor;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod reconcile;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sb_core::trading::*;
use sb_core::Side;

/// Trait implemented by every futures exchange backend.
///
/// Lookups that can legitimately find nothing (unknown symbol, missing
/// filter) return `Ok(None)`; `Err` is reserved for transport and decoding
/// failures.
///
/// Order operations return an [`OrderAck`] even when the exchange refuses
/// the order; only failures to get an answer at all are `Err`.
///
/// All methods take `&self` so concurrent webhook requests can share one
/// instance.
#[async_trait]
pub trait FuturesExchange: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Latest traded price of `symbol`.
    async fn price(&self, symbol: &str) -> Result<Option<Decimal>>;

    /// `LOT_SIZE` filter of `symbol`.
    async fn lot_size(&self, symbol: &str) -> Result<Option<LotSizeRule>>;

    /// Current net position on `symbol`. Flat when none is reported.
    async fn position(&self, symbol: &str) -> Result<PositionSnapshot>;

    /// Submit an order.
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck>;

    /// Market order on `side` that may only shrink the position on `symbol`.
    async fn close_position(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderAck> {
        let order = OrderRequest::market(symbol, side, quantity)
            .reduce_only()
            .with_client_order_id(client_order_id("c"));
        self.place_order(&order).await
    }

    /// Cancel an open order by exchange order ID.
    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<OrderAck>;
}

/// Fresh `newClientOrderId`: `prefix` plus a simple UUID (34 chars, within
/// Binance's 36-char limit).
pub fn client_order_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}
