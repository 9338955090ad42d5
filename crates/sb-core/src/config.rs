//! Configuration for the signal bridge.
//!
//! Everything is read once at startup from the process environment (optionally
//! seeded from a `.env` file) into an explicit [`AppConfig`] that is then passed
//! down to the order pipeline. Numeric values are parsed and validated here so
//! a typo in `TOTAL_MARGIN_SIZE` stops the process instead of sizing orders
//! from garbage.
//!
//! # Environment
//!
//! | Variable                    | Required | Default                    |
//! |-----------------------------|----------|----------------------------|
//! | `TOTAL_MARGIN_SIZE`         | yes      |                            |
//! | `TARGET_LEVERAGE`           | yes      |                            |
//! | `BINANCE_API_KEY`           | yes      |                            |
//! | `BINANCE_API_SECRET`        | yes      |                            |
//! | `PORT`                      | no       | `3000`                     |
//! | `BINANCE_FUTURES_URL`       | no       | `https://fapi.binance.com` |
//! | `BINANCE_RECV_WINDOW`       | no       | `5000`                     |
//! | `BINANCE_HTTP_TIMEOUT_SECS` | no       | `10`                       |

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{SbError, SbResult};
use crate::sizing::SizingConfig;

/// Default webhook listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Top-level application config.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Margin and leverage used to size every order.
    pub sizing: SizingConfig,
    /// Exchange credentials and endpoints.
    pub binance: BinanceConfig,
    /// Webhook listening port.
    pub port: u16,
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// `env_file` names an alternate dotenv file; otherwise `.env` in the
    /// working directory is used if present. Variables already set in the
    /// environment win over the file.
    pub fn from_env(env_file: Option<&Path>) -> SbResult<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| {
                    SbError::Config(format!("failed to load {}: {e}", path.display()))
                })?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> SbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SbError::Config(format!("{key} is not set")))
        };

        let sizing = SizingConfig::parse(
            &required("TOTAL_MARGIN_SIZE")?,
            &required("TARGET_LEVERAGE")?,
        )?;

        let mut binance = BinanceConfig {
            api_key: required("BINANCE_API_KEY")?,
            secret_key: required("BINANCE_API_SECRET")?,
            ..BinanceConfig::default()
        };
        if let Some(url) = lookup("BINANCE_FUTURES_URL").filter(|v| !v.trim().is_empty()) {
            binance.rest_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("BINANCE_RECV_WINDOW") {
            binance.recv_window = parse_number("BINANCE_RECV_WINDOW", &v)?;
        }
        if let Some(v) = lookup("BINANCE_HTTP_TIMEOUT_SECS") {
            binance.http_timeout_secs = parse_number("BINANCE_HTTP_TIMEOUT_SECS", &v)?;
        }

        let port = match lookup("PORT") {
            Some(v) if !v.trim().is_empty() => parse_number("PORT", &v)?,
            _ => DEFAULT_PORT,
        };

        Ok(Self {
            sizing,
            binance,
            port,
        })
    }
}

/// Binance USDT-margined futures connection settings.
///
/// All URL and timing fields have production defaults so only `api_key` and
/// `secret_key` need to be specified.
#[derive(Clone, Deserialize)]
pub struct BinanceConfig {
    /// Binance API key.
    pub api_key: String,

    /// Binance API secret (HMAC-SHA256 signing).
    pub secret_key: String,

    /// USDT-margined futures REST API base URL.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,

    /// `recvWindow` for signed requests (milliseconds).
    #[serde(default = "default_recv_window")]
    pub recv_window: u64,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            rest_url: default_rest_url(),
            recv_window: default_recv_window(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl std::fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceConfig")
            .field("api_key", &redact(&self.api_key))
            .field("secret_key", &"***")
            .field("rest_url", &self.rest_url)
            .field("recv_window", &self.recv_window)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_rest_url() -> String {
    "https://fapi.binance.com".into()
}

fn default_recv_window() -> u64 {
    5000
}

fn default_http_timeout() -> u64 {
    10
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> SbResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| SbError::Config(format!("{key}={raw:?} is not a valid number: {e}")))
}

/// Keep the first four characters of a key for log correlation.
fn redact(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}***")
}
