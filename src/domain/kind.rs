use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The five transaction types without their direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[serde(alias = "venta")]
    Sale,
    #[serde(alias = "compra")]
    Purchase,
    #[serde(alias = "prestamo")]
    Loan,
    #[serde(alias = "devolucion")]
    Return,
    #[serde(alias = "pase")]
    Transfer,
}

impl OrderType {
    /// Parses the English name or the value stored by the legacy back office.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sale" | "venta" => Some(OrderType::Sale),
            "purchase" | "compra" => Some(OrderType::Purchase),
            "loan" | "prestamo" => Some(OrderType::Loan),
            "return" | "devolucion" => Some(OrderType::Return),
            "transfer" | "pase" => Some(OrderType::Transfer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Sale => "sale",
            OrderType::Purchase => "purchase",
            OrderType::Loan => "loan",
            OrderType::Return => "return",
            OrderType::Transfer => "transfer",
        }
    }

    /// Loans, returns and transfers carry a direction; sales and purchases don't.
    pub fn is_directional(self) -> bool {
        matches!(self, OrderType::Loan | OrderType::Return | OrderType::Transfer)
    }

    /// Loans and returns are quantity-only movements; everything else is priced.
    pub fn requires_unit_price(self) -> bool {
        !matches!(self, OrderType::Loan | OrderType::Return)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which party initiated a loan, return or transfer.
///
/// `Outbound` means the goods leave us ("I lend", "I return",
/// "I transferred out"); `Inbound` means they come to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    /// Parses a direction value in the vocabulary of `order_type`.
    ///
    /// Accepts the generic `outbound`/`inbound`, the English per-type values
    /// and the legacy stored values.
    pub fn parse_for(order_type: OrderType, raw: &str) -> Option<Self> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "outbound" => return Some(Direction::Outbound),
            "inbound" => return Some(Direction::Inbound),
            _ => {}
        }
        match (order_type, value.as_str()) {
            (OrderType::Loan, "i_lend" | "yo_presto") => Some(Direction::Outbound),
            (OrderType::Loan, "lent_to_me" | "me_prestan") => Some(Direction::Inbound),
            (OrderType::Return, "i_return" | "yo_devuelvo") => Some(Direction::Outbound),
            (OrderType::Return, "returned_to_me" | "me_devuelven") => Some(Direction::Inbound),
            (OrderType::Transfer, "i_transferred" | "yo_pase") => Some(Direction::Outbound),
            (OrderType::Transfer, "transferred_to_me" | "me_pasen") => Some(Direction::Inbound),
            _ => None,
        }
    }

    /// Canonical per-type value, e.g. `i_lend` for an outbound loan.
    pub fn label_for(self, order_type: OrderType) -> &'static str {
        match (order_type, self) {
            (OrderType::Loan, Direction::Outbound) => "i_lend",
            (OrderType::Loan, Direction::Inbound) => "lent_to_me",
            (OrderType::Return, Direction::Outbound) => "i_return",
            (OrderType::Return, Direction::Inbound) => "returned_to_me",
            (OrderType::Transfer, Direction::Outbound) => "i_transferred",
            (OrderType::Transfer, Direction::Inbound) => "transferred_to_me",
            (_, Direction::Outbound) => "outbound",
            (_, Direction::Inbound) => "inbound",
        }
    }
}

/// Transaction type and, where it applies, its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "direction", rename_all = "lowercase")]
pub enum OrderKind {
    Sale,
    Purchase,
    Loan(Direction),
    Return(Direction),
    Transfer(Direction),
}

impl OrderKind {
    pub fn order_type(self) -> OrderType {
        match self {
            OrderKind::Sale => OrderType::Sale,
            OrderKind::Purchase => OrderType::Purchase,
            OrderKind::Loan(_) => OrderType::Loan,
            OrderKind::Return(_) => OrderType::Return,
            OrderKind::Transfer(_) => OrderType::Transfer,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            OrderKind::Sale | OrderKind::Purchase => None,
            OrderKind::Loan(d) | OrderKind::Return(d) | OrderKind::Transfer(d) => Some(d),
        }
    }

    /// Builds a kind from the raw form fields, enforcing that exactly the
    /// directional types carry a direction.
    pub fn parse(raw_type: &str, raw_direction: Option<&str>) -> Result<Self, ValidationError> {
        let order_type =
            OrderType::parse(raw_type).ok_or_else(|| ValidationError::UnknownOrderType(raw_type.to_string()))?;
        let raw_direction = raw_direction.map(str::trim).filter(|value| !value.is_empty());

        if !order_type.is_directional() {
            if let Some(value) = raw_direction {
                return Err(ValidationError::UnexpectedDirection {
                    order_type,
                    value: value.to_string(),
                });
            }
            return Ok(match order_type {
                OrderType::Sale => OrderKind::Sale,
                _ => OrderKind::Purchase,
            });
        }

        let value = raw_direction.ok_or(ValidationError::MissingDirection(order_type))?;
        let direction =
            Direction::parse_for(order_type, value).ok_or_else(|| ValidationError::InvalidDirection {
                order_type,
                value: value.to_string(),
            })?;

        Ok(match order_type {
            OrderType::Loan => OrderKind::Loan(direction),
            OrderType::Return => OrderKind::Return(direction),
            _ => OrderKind::Transfer(direction),
        })
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order_type = self.order_type();
        match self.direction() {
            Some(direction) => write!(f, "{} ({})", order_type, direction.label_for(order_type)),
            None => write!(f, "{}", order_type),
        }
    }
}
