//! Enumerations used throughout the signal bridge.
//!
//! Each enum knows its exchange wire spelling (`as_str`) so REST clients never
//! hand-type `"BUY"` / `"MARKET"` literals.

// ---------------------------------------------------------------------------
// Order side
// ---------------------------------------------------------------------------

/// Buy or sell direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Exchange wire spelling (`"BUY"` / `"SELL"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    /// The side that reduces a position opened with `self`.
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Order type
// ---------------------------------------------------------------------------

/// Order type. The bridge only ever sends market orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderType {
    #[default]
    Market,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Market => "MARKET",
        }
    }
}

// ---------------------------------------------------------------------------
// Order status
// ---------------------------------------------------------------------------

/// Order status as reported in an order-placement response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
}

impl OrderStatus {
    /// Map a Binance status string. Unknown strings yield `None`.
    pub fn from_exchange(status: &str) -> Option<Self> {
        match status {
            "NEW" => Some(Self::New),
            "PARTIALLY_FILLED" => Some(Self::PartiallyFilled),
            "FILLED" => Some(Self::Filled),
            "CANCELED" => Some(Self::Canceled),
            "REJECTED" => Some(Self::Rejected),
            "EXPIRED" | "EXPIRED_IN_MATCH" => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::PartiallyFilled => "PARTIALLY_FILLED",
            Self::Filled => "FILLED",
            Self::Canceled => "CANCELED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }
}
