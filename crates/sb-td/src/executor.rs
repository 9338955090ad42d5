//! Order pipeline for a single trade signal.
//!
//! ```text
//! price → LOT_SIZE → size → position → reconcile → (close) → open
//! ```
//!
//! [`Executor::execute`] never fails: every error from any step is folded into
//! an [`OrderOutcome`] so the webhook always has a text answer.

use std::sync::Arc;

use anyhow::{Context, Result};
use sb_core::sizing::SizingConfig;
use sb_core::trading::{OrderOutcome, OrderRequest, TradeSignal};
use tracing::{debug, error, info, warn};

use crate::reconcile::{Reconciliation, reconcile};
use crate::{FuturesExchange, client_order_id};

/// Runs trade signals against one exchange account.
#[derive(Clone)]
pub struct Executor {
    exchange: Arc<dyn FuturesExchange>,
    sizing: SizingConfig,
}

impl Executor {
    pub fn new(exchange: Arc<dyn FuturesExchange>, sizing: SizingConfig) -> Self {
        Self { exchange, sizing }
    }

    pub fn exchange(&self) -> &dyn FuturesExchange {
        self.exchange.as_ref()
    }

    /// Drive `signal` through the full pipeline.
    pub async fn execute(&self, signal: &TradeSignal) -> OrderOutcome {
        let entry = signal.entry.map_or_else(|| "n/a".to_string(), |p| p.to_string());
        info!(
            "[executor] {} {} signal (entry {entry}) via {}",
            signal.symbol,
            signal.side,
            self.exchange.name()
        );

        let outcome = match self.run(signal).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[executor] {} failed: {e:#}", signal.symbol);
                OrderOutcome::Failed(format!("{e:#}"))
            }
        };

        match &outcome {
            OrderOutcome::Placed { .. } => info!("[executor] {outcome}"),
            OrderOutcome::Failed(_) => {}
            _ => warn!("[executor] {outcome}"),
        }
        outcome
    }

    async fn run(&self, signal: &TradeSignal) -> Result<OrderOutcome> {
        let symbol = signal.symbol.as_str();

        let Some(price) = self.exchange.price(symbol).await? else {
            return Ok(OrderOutcome::LookupFailed("Failed to get tickers".into()));
        };
        let Some(rule) = self.exchange.lot_size(symbol).await? else {
            return Ok(OrderOutcome::LookupFailed(format!(
                "Symbol details not found for {symbol}"
            )));
        };

        let quantity = self
            .sizing
            .order_quantity(price, &rule)
            .with_context(|| format!("cannot size {symbol} at price {price}"))?;
        debug!(
            "[executor] {symbol}: price {price}, step {}, min {}, qty {quantity}",
            rule.step_size, rule.min_qty
        );

        let position = self.exchange.position(symbol).await?;
        match reconcile(signal.side, &position) {
            Reconciliation::Open => {}
            Reconciliation::AlreadyExists => {
                return Ok(OrderOutcome::AlreadyExists {
                    symbol: symbol.to_string(),
                });
            }
            Reconciliation::CloseThenOpen { close_qty } => {
                info!(
                    "[executor] {symbol}: closing {} position of {close_qty}",
                    signal.side.opposite()
                );
                let ack = self
                    .exchange
                    .close_position(symbol, signal.side, close_qty)
                    .await?;
                if !ack.is_accepted() {
                    return Ok(OrderOutcome::Rejected(ack.rejection_reason()));
                }
            }
        }

        let order = OrderRequest::market(symbol, signal.side, quantity)
            .with_client_order_id(client_order_id("o"));
        let ack = self.exchange.place_order(&order).await?;
        if !ack.is_accepted() {
            return Ok(OrderOutcome::Rejected(ack.rejection_reason()));
        }

        Ok(OrderOutcome::Placed {
            order_id: ack.order_id,
            symbol: order.symbol,
            side: order.side,
            quantity: order.quantity,
        })
    }
}
