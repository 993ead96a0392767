use crate::domain::StockSnapshot;

/// Stock operations on a Product.
///
/// Each action runs inside the product actor, so it is applied to the latest
/// stock with no other writer in between.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    ReadStock,
    /// Overwrites the stock level.
    ///
    /// # Errors
    /// Fails with a conflict when `expected_version` is set and differs from
    /// the product's current version.
    WriteStock { stock: i64, expected_version: Option<u64> },
    /// Adds a signed delta to the stock level.
    AdjustStock(i64),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductActionResult {
    ReadStock(StockSnapshot),
    WriteStock(StockSnapshot),
    AdjustStock(StockSnapshot),
}
