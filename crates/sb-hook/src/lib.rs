//! # sb-hook
//!
//! Webhook intake for the signal bridge: decodes alert payloads into
//! [`TradeSignal`](sb_core::trading::TradeSignal)s and hands them to the
//! [`Executor`](sb_td::executor::Executor).

pub mod server;
pub mod signal;

pub use server::{AppState, router, serve};
