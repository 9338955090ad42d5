//! Core data types and enums shared by the exchange client, the order
//! pipeline, and the webhook endpoint.
//!
//! Quantities and prices are [`rust_decimal::Decimal`] so lot-grid arithmetic
//! is exact.

pub mod enums;
pub mod trading;

pub use enums::*;
pub use trading::*;
