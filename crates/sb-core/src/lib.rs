//! # sb-core
//!
//! Core crate for the signal bridge, providing:
//!
//! - **Types** (`types`) — sides, order statuses, signals, lot-size rules,
//!   position snapshots, order requests and outcomes
//! - **Configuration** (`config`) — environment-sourced `AppConfig`
//! - **Error types** (`error`) — domain-specific `SbError` via thiserror
//! - **Sizing** (`sizing`) — margin × leverage quantity sizing on the lot grid
//! - **Logging** (`logging`) — tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod sizing;
pub mod types;

// Re-export types at crate root for convenience.
pub use types::*;
