//! Binance request signing.
//!
//! Signed USDT-M futures endpoints (`positionRisk`, `order`) expect the
//! URL-encoded query string to end with `recvWindow`, `timestamp`, and an
//! HMAC-SHA256 `signature` over everything before it, hex-encoded. The API
//! key travels separately in the `X-MBX-APIKEY` header.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs query strings with an account's API secret.
#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
    recv_window: u64,
}

impl RequestSigner {
    pub fn new(secret: impl Into<String>, recv_window: u64) -> Self {
        Self {
            secret: secret.into(),
            recv_window,
        }
    }

    /// Lowercase hex HMAC-SHA256 of `message` under the secret.
    pub fn sign(&self, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Encode `params`, append `recvWindow` and the current `timestamp`, and
    /// sign the result.
    pub fn signed_query(&self, params: &[(&str, &str)]) -> String {
        self.signed_query_at(params, current_timestamp_ms())
    }

    /// [`signed_query`](Self::signed_query) with an explicit timestamp.
    pub fn signed_query_at(&self, params: &[(&str, &str)], timestamp_ms: u128) -> String {
        let recv_window = self.recv_window.to_string();
        let timestamp = timestamp_ms.to_string();
        let query = params
            .iter()
            .copied()
            .chain([("recvWindow", recv_window.as_str()), ("timestamp", timestamp.as_str())])
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let signature = self.sign(&query);
        format!("{query}&signature={signature}")
    }
}

/// Returns the current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
