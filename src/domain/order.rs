use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderId, OrderKind, PartnerId, ProductId, UserId};

/// One product, quantity and price entry of a persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    pub fn stock_line(&self) -> StockLine {
        StockLine {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
        }
    }
}

/// The part of a line item that moves stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl StockLine {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Order fields stored apart from its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub id: OrderId,
    /// External number typed by the user; not generated.
    pub number: String,
    pub kind: OrderKind,
    pub partner_id: Option<PartnerId>,
    pub order_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

/// Payload for creating a new order header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub number: String,
    pub kind: OrderKind,
    pub partner_id: Option<PartnerId>,
    pub order_date: NaiveDate,
    pub created_by: Option<UserId>,
}

/// A recorded business transaction with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub header: OrderHeader,
    pub items: Vec<LineItem>,
}

impl Order {
    pub fn id(&self) -> &OrderId {
        &self.header.id
    }

    pub fn kind(&self) -> OrderKind {
        self.header.kind
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.items.iter().map(LineItem::stock_line).collect()
    }
}
