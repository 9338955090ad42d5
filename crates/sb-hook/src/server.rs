//! HTTP surface: webhook intake and a liveness page.
//!
//! | Method | Path       | Response                                   |
//! |--------|------------|--------------------------------------------|
//! | GET    | `/`        | `200` running banner                       |
//! | POST   | `/webhook` | `200` outcome text, `400` undecodable body |

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use sb_core::trading::OrderOutcome;
use sb_td::executor::Executor;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::signal::{ParsedSignal, parse_signal};

pub const RUNNING_BANNER: &str = "BINANCE TRADING BOT IS RUNNING";
pub const INVALID_SIGNAL: &str = "Invalid signal received.";
pub const NO_SIGNAL: &str = "No actionable signal found";

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub executor: Executor,
}

impl AppState {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/webhook", post(webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    RUNNING_BANNER
}

async fn webhook(State(state): State<AppState>, body: Bytes) -> (StatusCode, String) {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!("[webhook] payload is not a JSON object: {other}");
            return (StatusCode::BAD_REQUEST, INVALID_SIGNAL.to_string());
        }
        Err(e) => {
            warn!("[webhook] undecodable payload: {e}");
            return (StatusCode::BAD_REQUEST, INVALID_SIGNAL.to_string());
        }
    };

    match parse_signal(&payload) {
        ParsedSignal::Signal(signal) => {
            let outcome = state.executor.execute(&signal).await;
            (StatusCode::OK, outcome.to_string())
        }
        ParsedSignal::NoSignal => {
            info!("[webhook] no actionable signal");
            (StatusCode::OK, NO_SIGNAL.to_string())
        }
        ParsedSignal::Invalid(reason) => {
            let outcome = OrderOutcome::ParseError(reason);
            warn!("[webhook] {outcome}");
            (StatusCode::OK, outcome.to_string())
        }
    }
}

/// Bind `0.0.0.0:port` and serve until Ctrl+C.
pub async fn serve(port: u16, state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        "[server] listening on {addr} (exchange: {})",
        state.executor.exchange().name()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("[server] stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => warn!("[server] received Ctrl+C, shutting down"),
        Err(e) => warn!("[server] Ctrl+C handler unavailable: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal_macros::dec;
    use sb_core::sizing::SizingConfig;
    use sb_core::trading::LotSizeRule;
    use sb_td::mock::MockExchange;
    use tower::ServiceExt;

    use super::*;

    fn app(mock: Arc<MockExchange>) -> Router {
        let sizing = SizingConfig::parse("100", "5").unwrap();
        router(AppState::new(Executor::new(mock, sizing)))
    }

    fn seeded() -> Arc<MockExchange> {
        let rule = LotSizeRule {
            min_qty: dec!(0.001),
            step_size: dec!(0.001),
            max_qty: None,
        };
        Arc::new(MockExchange::new().with_symbol("BTCUSDT", dec!(500), rule))
    }

    async fn post(app: Router, body: &'static str) -> (StatusCode, String) {
        let req = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_reports_running() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app(seeded()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], RUNNING_BANNER.as_bytes());
    }

    #[tokio::test]
    async fn valid_signal_places_order() {
        let mock = seeded();
        let (status, text) = post(
            app(mock.clone()),
            r#"{"symbol":"BTCUSDT.P","price":"500","signal":"Buy"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(text.starts_with("Market Order placed: BTCUSDT BUY, Quantity: 1.000"));
        assert_eq!(mock.orders().len(), 1);
    }

    #[tokio::test]
    async fn missing_or_placeholder_price_still_orders() {
        for body in [
            r#"{"symbol":"BTCUSDT","signal":"buy"}"#,
            r#"{"symbol":"BTCUSDT","price":"{{close}}","signal":"buy"}"#,
        ] {
            let mock = seeded();
            let (status, text) = post(app(mock.clone()), body).await;
            assert_eq!(status, StatusCode::OK);
            assert!(text.starts_with("Market Order placed: BTCUSDT BUY"), "{text}");
            assert_eq!(mock.orders().len(), 1);
        }
    }

    #[tokio::test]
    async fn empty_symbol_reaches_the_exchange_lookup() {
        let mock = seeded();
        let (status, text) = post(app(mock.clone()), r#"{"symbol":"","price":"1","signal":"buy"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "Failed to get tickers");
        assert!(mock.orders().is_empty());
    }

    #[tokio::test]
    async fn undecodable_body_is_bad_request() {
        let (status, text) = post(app(seeded()), "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, INVALID_SIGNAL);

        let (status, _) = post(app(seeded()), "[1,2]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_signal_is_not_an_error() {
        let mock = seeded();
        let (status, text) = post(app(mock.clone()), r#"{"symbol":"BTCUSDT","price":"500"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, NO_SIGNAL);
        assert!(mock.orders().is_empty());
    }

    #[tokio::test]
    async fn non_string_symbol_is_parse_error() {
        let (status, text) =
            post(app(seeded()), r#"{"symbol":42,"price":"500","signal":"buy"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.starts_with("Error parsing signal: "));
    }

    #[tokio::test]
    async fn exchange_failure_is_still_ok_text() {
        let mock = seeded();
        mock.fail_requests(true);
        let (status, text) = post(
            app(mock),
            r#"{"symbol":"BTCUSDT","price":"500","signal":"sell"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.starts_with("An error occurred while placing the order: "));
    }
}
