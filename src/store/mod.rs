//! Data-access boundary of the reconciler.
//!
//! Everything the core reads or writes goes through [`InventoryStore`]. The
//! crate ships [`ActorStore`], an in-process implementation on top of the
//! resource actors; a hosted database would provide its own.

mod actor_store;

pub use actor_store::ActorStore;

use async_trait::async_trait;

use crate::domain::{
    LineItem, NewOrder, NewPartner, OrderHeader, OrderId, PartnerId, Product, ProductId, StockSnapshot,
};
use crate::error::StoreError;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn read_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Current stock and version, `None` when the product does not exist.
    async fn read_product_stock(&self, id: &ProductId) -> Result<Option<StockSnapshot>, StoreError>;

    /// Overwrites the stock. With `expected_version` set, fails with
    /// [`StoreError::Conflict`] if the product changed since it was read.
    /// Returns whether a product matched.
    async fn write_product_stock(
        &self,
        id: &ProductId,
        stock: i64,
        expected_version: Option<u64>,
    ) -> Result<bool, StoreError>;

    /// Adds `delta` to the stock in one step; returns the new stock, `None`
    /// when no product matched.
    async fn adjust_product_stock(&self, id: &ProductId, delta: i64) -> Result<Option<i64>, StoreError>;

    async fn create_order(&self, order: NewOrder) -> Result<OrderHeader, StoreError>;

    async fn read_order(&self, id: &OrderId) -> Result<Option<OrderHeader>, StoreError>;

    async fn update_order_header(&self, header: &OrderHeader) -> Result<(), StoreError>;

    /// Every order carrying `number`; legacy data may hold more than one.
    async fn find_orders_by_number(&self, number: &str) -> Result<Vec<OrderId>, StoreError>;

    async fn replace_order_line_items(&self, id: &OrderId, items: &[LineItem]) -> Result<(), StoreError>;

    async fn read_order_line_items(&self, id: &OrderId) -> Result<Vec<LineItem>, StoreError>;

    async fn delete_order_line_items(&self, id: &OrderId) -> Result<(), StoreError>;

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError>;

    async fn create_partner(&self, partner: NewPartner) -> Result<PartnerId, StoreError>;

    async fn delete_partner(&self, id: &PartnerId) -> Result<(), StoreError>;
}
