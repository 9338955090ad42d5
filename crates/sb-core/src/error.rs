//! Typed error definitions for the signal bridge.
//!
//! Provides [`SbError`] for domain-specific errors that are more informative
//! than plain `anyhow::Error` strings. All variants implement `std::error::Error`
//! via `thiserror`, so they integrate seamlessly with `anyhow::Result` and can
//! be recovered with `downcast_ref` where a caller needs to branch on them.

use thiserror::Error;

/// Domain-specific errors for the signal bridge.
#[derive(Debug, Error)]
pub enum SbError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Webhook payload or exchange response parsing error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Quantity sizing could not produce a valid order quantity.
    #[error("sizing error: {0}")]
    Sizing(String),

    /// The exchange answered with an error body (`{"code": .., "msg": ..}`).
    #[error("exchange error {code}: {msg}")]
    Exchange {
        /// Exchange-specific error code (e.g. `-2019` margin insufficient).
        code: i64,
        /// Human-readable reason reported by the exchange.
        msg: String,
    },

    /// Non-success HTTP status without a decodable exchange error body.
    #[error("http error: {0}")]
    Http(String),
}

/// Convenience alias for results carrying an [`SbError`].
pub type SbResult<T> = std::result::Result<T, SbError>;
