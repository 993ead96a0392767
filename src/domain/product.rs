use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BrandId, ProductId};

/// A product in the inventory.
///
/// `stock` is a discrete count and may go negative: sales are not blocked by
/// missing stock. `version` is bumped on every stock write so read-then-write
/// callers can detect a concurrent writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand_id: Option<BrandId>,
    pub model: String,
    pub stock: i64,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn snapshot(&self) -> StockSnapshot {
        StockSnapshot {
            stock: self.stock,
            version: self.version,
        }
    }
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub brand_id: Option<BrandId>,
    pub model: String,
    pub initial_stock: i64,
}

impl ProductCreate {
    /// A product entering the catalogue with no stock; orders bring it in.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brand_id: None,
            model: model.into(),
            initial_stock: 0,
        }
    }

    pub fn with_initial_stock(mut self, stock: i64) -> Self {
        self.initial_stock = stock;
        self
    }
}

/// Catalogue fields an admin may edit. Stock is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub brand_id: Option<BrandId>,
    pub model: Option<String>,
}

/// Stock level of a product together with its version stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub stock: i64,
    pub version: u64,
}
