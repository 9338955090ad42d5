//! Trading-related data structures — signals, lot-size rules, positions,
//! orders, and pipeline outcomes.
//!
//! None of these outlive a single webhook request; the exchange account is the
//! only source of truth between requests.

use rust_decimal::Decimal;

use super::enums::{OrderStatus, OrderType, Side};

// ---------------------------------------------------------------------------
// Trade signal (webhook → pipeline)
// ---------------------------------------------------------------------------

/// Canonical trade intent extracted from a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeSignal {
    /// Exchange symbol with any `.P` marker removed (e.g. `"BTCUSDT"`).
    pub symbol: String,
    /// Requested direction.
    pub side: Side,
    /// Price quoted by the signal source, `None` when absent or unparsable.
    /// Informational only; sizing uses the live market price.
    pub entry: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Exchange metadata
// ---------------------------------------------------------------------------

/// `LOT_SIZE` filter of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotSizeRule {
    /// Smallest accepted quantity.
    pub min_qty: Decimal,
    /// Quantity grid; every order quantity is a multiple of this.
    pub step_size: Decimal,
    /// Largest accepted quantity, if the exchange reports one.
    pub max_qty: Option<Decimal>,
}

/// Net position on one symbol at the time of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub symbol: String,
    /// Positive = long, negative = short, zero = flat.
    pub signed_qty: Decimal,
}

impl PositionSnapshot {
    pub fn flat(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            signed_qty: Decimal::ZERO,
        }
    }

    /// The side that opened this position, or `None` when flat.
    pub fn side(&self) -> Option<Side> {
        match self.signed_qty.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => Some(Side::Buy),
            std::cmp::Ordering::Less => Some(Side::Sell),
            std::cmp::Ordering::Equal => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// A market order ready to be sent to the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Quantity already aligned to the lot grid, at the grid's precision.
    pub quantity: Decimal,
    /// Only reduce an existing position, never open one.
    pub reduce_only: bool,
    /// Client-assigned order ID (`newClientOrderId`).
    pub client_order_id: Option<String>,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            reduce_only: false,
            client_order_id: None,
        }
    }

    pub fn reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }

    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }
}

/// Interpreted order-placement response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderAck {
    /// Exchange-assigned order ID, when the order was created.
    pub order_id: Option<u64>,
    /// Reported order status.
    pub status: Option<OrderStatus>,
    /// Exchange-provided message (error `msg` on rejection).
    pub message: Option<String>,
}

impl OrderAck {
    /// An acknowledgement that carries only a rejection reason.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            order_id: None,
            status: None,
            message: Some(message.into()),
        }
    }

    /// The order counts as placed only when the exchange reports `NEW`.
    pub fn is_accepted(&self) -> bool {
        self.status == Some(OrderStatus::New)
    }

    /// Best available explanation for a non-accepted order.
    pub fn rejection_reason(&self) -> String {
        match (&self.message, self.status) {
            (Some(msg), _) => msg.clone(),
            (None, Some(status)) => format!("unexpected order status {}", status.as_str()),
            (None, None) => "no response from exchange".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline outcome (pipeline → webhook response)
// ---------------------------------------------------------------------------

/// Result of running one trade signal through the order pipeline.
///
/// The `Display` text is the plain-text webhook response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// The opening order was accepted.
    Placed {
        order_id: Option<u64>,
        symbol: String,
        side: Side,
        quantity: Decimal,
    },
    /// A position in the requested direction is already open.
    AlreadyExists { symbol: String },
    /// The exchange did not accept an order.
    Rejected(String),
    /// Price, symbol, or lot-size metadata could not be found.
    LookupFailed(String),
    /// The webhook payload could not be turned into a trade signal.
    ParseError(String),
    /// Transport or library failure anywhere in the pipeline.
    Failed(String),
}

impl OrderOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }
}

impl std::fmt::Display for OrderOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placed {
                order_id,
                symbol,
                side,
                quantity,
            } => {
                write!(f, "Market Order placed: {symbol} {side}, Quantity: {quantity}")?;
                if let Some(id) = order_id {
                    write!(f, ", Order ID: {id}")?;
                }
                Ok(())
            }
            Self::AlreadyExists { symbol } => write!(f, "Position already exists for {symbol}"),
            Self::Rejected(reason) => write!(f, "Order rejected: {reason}"),
            Self::LookupFailed(reason) => f.write_str(reason),
            Self::ParseError(reason) => write!(f, "Error parsing signal: {reason}"),
            Self::Failed(reason) => write!(f, "An error occurred while placing the order: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn position_side_follows_sign() {
        let mut pos = PositionSnapshot::flat("BTCUSDT");
        assert_eq!(pos.side(), None);
        pos.signed_qty = dec!(0.5);
        assert_eq!(pos.side(), Some(Side::Buy));
        pos.signed_qty = dec!(-0.5);
        assert_eq!(pos.side(), Some(Side::Sell));
    }

    #[test]
    fn only_new_is_accepted() {
        let mut ack = OrderAck {
            order_id: Some(1),
            status: Some(OrderStatus::New),
            message: None,
        };
        assert!(ack.is_accepted());
        ack.status = Some(OrderStatus::Expired);
        assert!(!ack.is_accepted());
        assert_eq!(ack.rejection_reason(), "unexpected order status EXPIRED");
        assert_eq!(OrderAck::default().rejection_reason(), "no response from exchange");
    }

    #[test]
    fn outcome_text() {
        let placed = OrderOutcome::Placed {
            order_id: Some(42),
            symbol: "BTCUSDT".into(),
            side: Side::Buy,
            quantity: dec!(1.000),
        };
        assert_eq!(
            placed.to_string(),
            "Market Order placed: BTCUSDT BUY, Quantity: 1.000, Order ID: 42"
        );
        assert_eq!(
            OrderOutcome::Rejected("Margin is insufficient.".into()).to_string(),
            "Order rejected: Margin is insufficient."
        );
        assert_eq!(
            OrderOutcome::AlreadyExists {
                symbol: "ETHUSDT".into()
            }
            .to_string(),
            "Position already exists for ETHUSDT"
        );
    }
}
