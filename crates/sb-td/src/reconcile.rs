//! Position reconciliation.
//!
//! Decides what has to happen on the exchange before a signal's opening order
//! may be sent, given the position currently held on the symbol.

use rust_decimal::Decimal;
use sb_core::trading::PositionSnapshot;
use sb_core::Side;

/// Action required before (or instead of) opening a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Flat: open directly.
    Open,
    /// Already positioned in the requested direction: do nothing.
    AlreadyExists,
    /// Positioned against the signal: close `close_qty` first, then open.
    CloseThenOpen { close_qty: Decimal },
}

/// Compare the requested `side` with the current position.
///
/// The close quantity is the absolute position size; the closing order goes
/// out on the signal's own side, which is the opposite of the position.
pub fn reconcile(side: Side, position: &PositionSnapshot) -> Reconciliation {
    match position.side() {
        None => Reconciliation::Open,
        Some(held) if held == side => Reconciliation::AlreadyExists,
        Some(_) => Reconciliation::CloseThenOpen {
            close_qty: position.signed_qty.abs(),
        },
    }
}
