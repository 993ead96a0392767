//! Maps an order's transaction type and direction to the sign of its stock movement.

use std::fmt;

use crate::domain::{Direction, OrderKind, OrderType};

/// Sign of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockSign {
    /// Stock enters.
    Increase,
    /// Stock leaves.
    Decrease,
    /// No adjustment.
    Zero,
}

impl StockSign {
    pub fn value(self) -> i64 {
        match self {
            StockSign::Increase => 1,
            StockSign::Decrease => -1,
            StockSign::Zero => 0,
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            StockSign::Increase => StockSign::Decrease,
            StockSign::Decrease => StockSign::Increase,
            StockSign::Zero => StockSign::Zero,
        }
    }

    pub fn is_zero(self) -> bool {
        self == StockSign::Zero
    }

    /// Signed stock delta for `quantity` units.
    pub fn delta(self, quantity: u32) -> i64 {
        self.value() * i64::from(quantity)
    }
}

impl fmt::Display for StockSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StockSign::Increase => "+1",
            StockSign::Decrease => "-1",
            StockSign::Zero => "0",
        })
    }
}

/// Sign for a validated order kind. Never zero.
pub fn sign_of(kind: OrderKind) -> StockSign {
    match kind {
        OrderKind::Purchase => StockSign::Increase,
        OrderKind::Sale => StockSign::Decrease,
        OrderKind::Loan(direction) | OrderKind::Return(direction) | OrderKind::Transfer(direction) => {
            match direction {
                Direction::Outbound => StockSign::Decrease,
                Direction::Inbound => StockSign::Increase,
            }
        }
    }
}

/// Sign for raw stored values, as found in legacy rows.
///
/// An unrecognized type yields [`StockSign::Zero`]. For a directional type,
/// any direction other than the outbound one (including none) counts as
/// inbound; such rows are rejected by validation before they can be written.
pub fn resolve(raw_type: &str, raw_direction: Option<&str>) -> StockSign {
    let Some(order_type) = OrderType::parse(raw_type) else {
        return StockSign::Zero;
    };
    match order_type {
        OrderType::Purchase => StockSign::Increase,
        OrderType::Sale => StockSign::Decrease,
        OrderType::Loan | OrderType::Return | OrderType::Transfer => {
            match raw_direction.and_then(|value| Direction::parse_for(order_type, value)) {
                Some(Direction::Outbound) => StockSign::Decrease,
                _ => StockSign::Increase,
            }
        }
    }
}

impl OrderKind {
    pub fn stock_sign(self) -> StockSign {
        sign_of(self)
    }
}
