//! Webhook payload → [`TradeSignal`].
//!
//! Expected body (charting-platform alert):
//!
//! ```json
//! {"symbol": "XRPUSDT.P", "price": "0.2745", "signal": "Buy"}
//! ```

use rust_decimal::Decimal;
use sb_core::Side;
use sb_core::trading::TradeSignal;
use serde_json::{Map, Value};

/// Perpetual-contract marker appended by charting platforms.
const PERP_SUFFIX: &str = ".P";

/// Result of interpreting one webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSignal {
    Signal(TradeSignal),
    /// `signal` absent, null or empty: nothing to do.
    NoSignal,
    /// Payload present but unusable.
    Invalid(String),
}

/// Interpret a decoded JSON object.
pub fn parse_signal(payload: &Map<String, Value>) -> ParsedSignal {
    let raw_signal = match payload.get("signal") {
        None | Some(Value::Null) => return ParsedSignal::NoSignal,
        Some(Value::String(s)) if s.is_empty() => return ParsedSignal::NoSignal,
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return ParsedSignal::Invalid(format!("signal must be a string, got {other}"));
        }
    };

    match build(payload, raw_signal) {
        Ok(signal) => ParsedSignal::Signal(signal),
        Err(reason) => ParsedSignal::Invalid(reason),
    }
}

fn build(payload: &Map<String, Value>, raw_signal: &str) -> Result<TradeSignal, String> {
    let symbol = match payload.get("symbol") {
        Some(Value::String(s)) => normalize_symbol(s),
        Some(other) => return Err(format!("symbol must be a string, got {other}")),
        None => return Err("symbol is missing".into()),
    };

    Ok(TradeSignal {
        symbol,
        side: side_from_signal(raw_signal),
        entry: payload.get("price").and_then(parse_price),
    })
}

/// Quoted price from a JSON string or number. Anything else (including
/// unfilled alert placeholders such as `"{{close}}"`) yields `None`.
fn parse_price(v: &Value) -> Option<Decimal> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => {
            let text = n.to_string();
            text.parse().or_else(|_| Decimal::from_scientific(&text)).ok()
        }
        _ => None,
    }
}

/// `"BTCUSDT.P"` → `"BTCUSDT"`.
fn normalize_symbol(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix(PERP_SUFFIX).unwrap_or(trimmed).trim().to_string()
}

/// `"buy"` in any case is a buy; every other value sells.
fn side_from_signal(raw: &str) -> Side {
    if raw.trim().eq_ignore_ascii_case("buy") {
        Side::Buy
    } else {
        Side::Sell
    }
}
