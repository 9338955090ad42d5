//! Binance USDT-margined futures REST client.
//!
//! Thin wrappers over the endpoints the order pipeline needs. Every method
//! returns the decoded JSON body; turning it into domain types happens in the
//! parent module so the wire shapes can be tested without a network.
//!
//! # REST endpoints
//!
//! | Operation      | Method | Path                     | Signed |
//! |----------------|--------|--------------------------|--------|
//! | Ticker price   | GET    | `/fapi/v1/ticker/price`  | no     |
//! | Exchange info  | GET    | `/fapi/v1/exchangeInfo`  | no     |
//! | Positions      | GET    | `/fapi/v3/positionRisk`  | yes    |
//! | New order      | POST   | `/fapi/v1/order`         | yes    |
//! | Cancel order   | DELETE | `/fapi/v1/order`         | yes    |
//!
//! Non-2xx responses carrying Binance's `{"code": .., "msg": ..}` body become
//! [`SbError::Exchange`]; anything else non-2xx becomes [`SbError::Http`].

use std::time::Duration;

use anyhow::{Context, Result};
use sb_core::config::BinanceConfig;
use sb_core::error::SbError;
use sb_core::trading::OrderRequest;
use serde::Deserialize;
use tracing::debug;

use super::auth::RequestSigner;

/// Binance error body.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

/// Binance USDT-M futures account client.
pub struct FuturesClient {
    /// Shared HTTP client.
    http: reqwest::Client,
    /// API key, sent as `X-MBX-APIKEY`.
    api_key: String,
    /// Signs private requests.
    signer: RequestSigner,
    /// REST base URL (e.g. `https://fapi.binance.com`).
    base_url: String,
}

impl FuturesClient {
    /// Create a new client (no connections opened yet).
    pub fn new(config: &BinanceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            signer: RequestSigner::new(config.secret_key.clone(), config.recv_window),
            base_url: config.rest_url.trim_end_matches('/').to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Public market data
    // -----------------------------------------------------------------------

    /// Latest price for one symbol: `{"symbol": .., "price": .., "time": ..}`.
    pub async fn get_ticker_price(&self, symbol: &str) -> Result<serde_json::Value> {
        let url = format!("{}/fapi/v1/ticker/price", self.base_url);
        let req = self.http.get(&url).query(&[("symbol", symbol)]);
        send(req).await.context("ticker price request failed")
    }

    /// Exchange info (symbol list, filters, etc.).
    pub async fn get_exchange_info(&self) -> Result<serde_json::Value> {
        let url = format!("{}/fapi/v1/exchangeInfo", self.base_url);
        send(self.http.get(&url)).await.context("exchange info request failed")
    }

    // -----------------------------------------------------------------------
    // Signed account queries
    // -----------------------------------------------------------------------

    /// Query current positions, optionally for one symbol only.
    pub async fn get_positions(&self, symbol: Option<&str>) -> Result<serde_json::Value> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(sym) = symbol {
            params.push(("symbol", sym));
        }

        let query = self.signer.signed_query(&params);
        let url = format!("{}/fapi/v3/positionRisk?{query}", self.base_url);
        let req = self.http.get(&url).header("X-MBX-APIKEY", &self.api_key);
        send(req).await.context("position risk request failed")
    }

    // -----------------------------------------------------------------------
    // Order operations
    // -----------------------------------------------------------------------

    /// Place a new order.
    ///
    /// Returns the full JSON response including the exchange order ID.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<serde_json::Value> {
        let quantity = order.quantity.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("symbol", order.symbol.as_str()),
            ("side", order.side.as_str()),
            ("type", order.order_type.as_str()),
            ("quantity", quantity.as_str()),
        ];
        if order.reduce_only {
            params.push(("reduceOnly", "true"));
        }
        if let Some(cid) = order.client_order_id.as_deref() {
            params.push(("newClientOrderId", cid));
        }

        let query = self.signer.signed_query(&params);
        debug!("[binance] POST /fapi/v1/order {}", strip_signature(&query));

        let url = format!("{}/fapi/v1/order?{query}", self.base_url);
        let req = self.http.post(&url).header("X-MBX-APIKEY", &self.api_key);
        send(req).await.context("new order request failed")
    }

    /// Cancel an existing order by exchange order ID.
    pub async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<serde_json::Value> {
        let oid = order_id.to_string();
        let query = self.signer.signed_query(&[("symbol", symbol), ("orderId", oid.as_str())]);

        let url = format!("{}/fapi/v1/order?{query}", self.base_url);
        let req = self.http.delete(&url).header("X-MBX-APIKEY", &self.api_key);
        send(req).await.context("cancel order request failed")
    }
}

/// Send a request and decode the JSON body, mapping error responses.
async fn send(req: reqwest::RequestBuilder) -> Result<serde_json::Value> {
    let resp = req.send().await?;
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(decode_error(status.as_u16(), &text).into());
    }

    serde_json::from_str(&text).map_err(|e| {
        SbError::Parse(format!("invalid JSON from exchange: {e}: {}", snippet(&text))).into()
    })
}

/// Turn a non-2xx body into the most specific error available.
fn decode_error(status: u16, body: &str) -> SbError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => SbError::Exchange {
            code: err.code,
            msg: err.msg,
        },
        Err(_) => SbError::Http(format!("status {status}, response: {}", snippet(body))),
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Drop the trailing signature before logging a query string.
fn strip_signature(query: &str) -> &str {
    query.rsplit_once("&signature=").map_or(query, |(q, _)| q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binance_error_body_is_typed() {
        let err = decode_error(400, r#"{"code":-2019,"msg":"Margin is insufficient."}"#);
        match err {
            SbError::Exchange { code, msg } => {
                assert_eq!(code, -2019);
                assert_eq!(msg, "Margin is insufficient.");
            }
            other => panic!("expected Exchange, got {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_is_http_error() {
        let err = decode_error(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, SbError::Http(ref m) if m.contains("502")));
    }

    #[test]
    fn signature_is_not_logged() {
        assert_eq!(strip_signature("symbol=X&timestamp=1&signature=abc"), "symbol=X&timestamp=1");
        assert_eq!(strip_signature("symbol=X"), "symbol=X");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let cfg = BinanceConfig {
            rest_url: "https://testnet.binancefuture.com/".into(),
            ..BinanceConfig::default()
        };
        let client = FuturesClient::new(&cfg).unwrap();
        assert_eq!(client.base_url, "https://testnet.binancefuture.com");
    }
}
