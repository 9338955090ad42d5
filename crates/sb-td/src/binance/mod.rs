//! Binance USDT-margined futures exchange.
//!
//! Implements [`FuturesExchange`](crate::FuturesExchange) on top of the REST
//! [`FuturesClient`](futures::FuturesClient).
//!
//! # Architecture
//!
//! ```text
//! BinanceFutures
//! ├── FuturesClient   (REST, HMAC-signed private calls)
//! └── JSON → typed    (ticker price, LOT_SIZE filter, positionRisk, order ack)
//! ```
//!
//! Nothing is cached: exchange info and positions are fetched on every call so
//! each webhook acts on the exchange's current view.

pub mod auth;
pub mod futures;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sb_core::config::BinanceConfig;
use sb_core::error::SbError;
use sb_core::trading::{LotSizeRule, OrderAck, OrderRequest, PositionSnapshot};
use sb_core::OrderStatus;
use tracing::{debug, info};

use self::futures::FuturesClient;

/// Binance error code for an unknown symbol.
const ERR_INVALID_SYMBOL: i64 = -1121;

/// Binance USDT-M futures exchange.
pub struct BinanceFutures {
    client: FuturesClient,
}

impl BinanceFutures {
    pub fn new(config: &BinanceConfig) -> Result<Self> {
        let client = FuturesClient::new(config)?;
        info!("[binance] futures client ready — {}", config.rest_url);
        Ok(Self { client })
    }
}

#[async_trait]
impl crate::FuturesExchange for BinanceFutures {
    fn name(&self) -> &str {
        "binance-futures"
    }

    async fn price(&self, symbol: &str) -> Result<Option<Decimal>> {
        match self.client.get_ticker_price(symbol).await {
            Ok(val) => Ok(parse_ticker_price(&val, symbol)),
            Err(e) if exchange_error_code(&e) == Some(ERR_INVALID_SYMBOL) => {
                debug!("[binance] ticker lookup: unknown symbol {symbol}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn lot_size(&self, symbol: &str) -> Result<Option<LotSizeRule>> {
        let info = self.client.get_exchange_info().await?;
        Ok(parse_lot_size(&info, symbol))
    }

    async fn position(&self, symbol: &str) -> Result<PositionSnapshot> {
        let val = self.client.get_positions(Some(symbol)).await?;
        parse_position(&val, symbol)
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        match self.client.place_order(order).await {
            Ok(val) => Ok(parse_order_ack(&val)),
            Err(e) => rejection_or_error(e),
        }
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<OrderAck> {
        match self.client.cancel_order(symbol, order_id).await {
            Ok(val) => Ok(parse_order_ack(&val)),
            Err(e) => rejection_or_error(e),
        }
    }
}

/// An exchange-reported error is a rejection; anything else propagates.
fn rejection_or_error(err: anyhow::Error) -> Result<OrderAck> {
    match exchange_error(&err) {
        Some((_, msg)) => Ok(OrderAck::rejected(msg)),
        None => Err(err),
    }
}

fn exchange_error(err: &anyhow::Error) -> Option<(i64, String)> {
    err.chain().find_map(|cause| match cause.downcast_ref::<SbError>() {
        Some(SbError::Exchange { code, msg }) => Some((*code, msg.clone())),
        _ => None,
    })
}

fn exchange_error_code(err: &anyhow::Error) -> Option<i64> {
    exchange_error(err).map(|(code, _)| code)
}

// ---------------------------------------------------------------------------
// JSON → typed helpers
// ---------------------------------------------------------------------------

/// Decimal from a JSON string (`"0.001"`) or number.
fn decimal_field(v: &serde_json::Value, key: &str) -> Option<Decimal> {
    match v.get(key)? {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

/// Extract the price from a `/ticker/price` response for `symbol`.
fn parse_ticker_price(v: &serde_json::Value, symbol: &str) -> Option<Decimal> {
    if v.get("symbol").and_then(|s| s.as_str()) != Some(symbol) {
        return None;
    }
    decimal_field(v, "price")
}

/// Find `symbol`'s `LOT_SIZE` filter in an `exchangeInfo` response.
///
/// Returns `None` when the symbol or filter is missing, or the filter has no
/// usable step size.
fn parse_lot_size(info: &serde_json::Value, symbol: &str) -> Option<LotSizeRule> {
    let sym_info = info
        .get("symbols")?
        .as_array()?
        .iter()
        .find(|s| s.get("symbol").and_then(|v| v.as_str()) == Some(symbol))?;

    let filter = sym_info
        .get("filters")?
        .as_array()?
        .iter()
        .find(|f| f.get("filterType").and_then(|v| v.as_str()) == Some("LOT_SIZE"))?;

    let step_size = decimal_field(filter, "stepSize").filter(|s| *s > Decimal::ZERO)?;
    let min_qty = decimal_field(filter, "minQty")?;

    Some(LotSizeRule {
        min_qty,
        step_size,
        max_qty: decimal_field(filter, "maxQty"),
    })
}

/// Build a snapshot from a `positionRisk` array.
///
/// The first entry for `symbol` is used (one-way mode reports exactly one);
/// an empty array means flat.
fn parse_position(v: &serde_json::Value, symbol: &str) -> Result<PositionSnapshot> {
    let entries = v
        .as_array()
        .ok_or_else(|| SbError::Parse("positionRisk response is not an array".into()))?;

    let Some(entry) = entries
        .iter()
        .find(|p| p.get("symbol").and_then(|s| s.as_str()) == Some(symbol))
    else {
        return Ok(PositionSnapshot::flat(symbol));
    };

    let signed_qty = decimal_field(entry, "positionAmt")
        .with_context(|| format!("positionAmt missing for {symbol}"))?;

    Ok(PositionSnapshot {
        symbol: symbol.to_string(),
        signed_qty,
    })
}

/// Interpret a new-order (or cancel) response body.
fn parse_order_ack(v: &serde_json::Value) -> OrderAck {
    OrderAck {
        order_id: v.get("orderId").and_then(|id| id.as_u64()),
        status: v
            .get("status")
            .and_then(|s| s.as_str())
            .and_then(OrderStatus::from_exchange),
        message: v.get("msg").and_then(|m| m.as_str()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn exchange_info() -> serde_json::Value {
        json!({
            "timezone": "UTC",
            "symbols": [
                {
                    "symbol": "BTCUSDT",
                    "filters": [
                        {"filterType": "PRICE_FILTER", "tickSize": "0.10"},
                        {"filterType": "LOT_SIZE", "minQty": "0.001", "maxQty": "1000", "stepSize": "0.001"},
                        {"filterType": "MARKET_LOT_SIZE", "minQty": "0.001", "maxQty": "120", "stepSize": "0.001"}
                    ]
                },
                {
                    "symbol": "BROKENUSDT",
                    "filters": [
                        {"filterType": "LOT_SIZE", "minQty": "1", "maxQty": "100", "stepSize": "0"}
                    ]
                }
            ]
        })
    }

    #[test]
    fn lot_size_is_read_from_exchange_info() {
        let rule = parse_lot_size(&exchange_info(), "BTCUSDT").unwrap();
        assert_eq!(rule.min_qty, dec!(0.001));
        assert_eq!(rule.step_size, dec!(0.001));
        assert_eq!(rule.max_qty, Some(dec!(1000)));
    }

    #[test]
    fn unknown_symbol_or_zero_step_has_no_lot_size() {
        assert!(parse_lot_size(&exchange_info(), "DOGEUSDT").is_none());
        assert!(parse_lot_size(&exchange_info(), "BROKENUSDT").is_none());
    }

    #[test]
    fn ticker_price_parses_string_price() {
        let v = json!({"symbol": "XRPUSDT", "price": "0.2745", "time": 1589437530011u64});
        assert_eq!(parse_ticker_price(&v, "XRPUSDT"), Some(dec!(0.2745)));
        assert_eq!(parse_ticker_price(&v, "BTCUSDT"), None);
    }

    #[test]
    fn position_amount_is_signed() {
        let v = json!([
            {"symbol": "ETHUSDT", "positionSide": "BOTH", "positionAmt": "-0.250", "entryPrice": "3000.0"}
        ]);
        let pos = parse_position(&v, "ETHUSDT").unwrap();
        assert_eq!(pos.signed_qty, dec!(-0.25));

        let flat = parse_position(&json!([]), "ETHUSDT").unwrap();
        assert_eq!(flat, PositionSnapshot::flat("ETHUSDT"));
        assert!(parse_position(&json!({"code": 0}), "ETHUSDT").is_err());
    }

    #[test]
    fn order_ack_from_new_order_response() {
        let v = json!({
            "orderId": 22542179u64,
            "symbol": "BTCUSDT",
            "status": "NEW",
            "clientOrderId": "o-abc",
            "origQty": "1.000",
            "executedQty": "0",
            "type": "MARKET",
            "side": "BUY"
        });
        let ack = parse_order_ack(&v);
        assert_eq!(ack.order_id, Some(22542179));
        assert!(ack.is_accepted());
    }

    #[test]
    fn exchange_error_becomes_rejection() {
        let err = anyhow::Error::new(SbError::Exchange {
            code: -2019,
            msg: "Margin is insufficient.".into(),
        })
        .context("new order request failed");

        let ack = rejection_or_error(err).unwrap();
        assert!(!ack.is_accepted());
        assert_eq!(ack.rejection_reason(), "Margin is insufficient.");
    }

    #[test]
    fn transport_error_propagates() {
        let err = anyhow::anyhow!("connection reset").context("new order request failed");
        assert!(rejection_or_error(err).is_err());
    }
}
