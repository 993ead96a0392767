use async_trait::async_trait;
use super::InventoryStore;
use crate::clients::{OrderClient, PartnerClient, ProductClient};
use crate::domain::{
    LineItem, NewOrder, NewPartner, OrderHeader, OrderId, PartnerId, Product, ProductId, StockSnapshot,
};
use crate::error::StoreError;

/// [`InventoryStore`] backed by the in-process resource actors.
#[derive(Clone)]
pub struct ActorStore {
    products: ProductClient,
    orders: OrderClient,
    partners: PartnerClient,
}

impl ActorStore {
    pub fn new(products: ProductClient, orders: OrderClient, partners: PartnerClient) -> Self {
        Self {
            products,
            orders,
            partners,
        }
    }
}

fn order_not_found(id: &OrderId) -> StoreError {
    StoreError::NotFound {
        entity: "Order",
        id: id.clone(),
    }
}

#[async_trait]
impl InventoryStore for ActorStore {
    async fn read_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.products.get_product(id.clone()).await
    }

    async fn read_product_stock(&self, id: &ProductId) -> Result<Option<StockSnapshot>, StoreError> {
        self.products.read_stock(id.clone()).await
    }

    async fn write_product_stock(
        &self,
        id: &ProductId,
        stock: i64,
        expected_version: Option<u64>,
    ) -> Result<bool, StoreError> {
        self.products.write_stock(id.clone(), stock, expected_version).await
    }

    async fn adjust_product_stock(&self, id: &ProductId, delta: i64) -> Result<Option<i64>, StoreError> {
        self.products.adjust_stock(id.clone(), delta).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderHeader, StoreError> {
        self.orders.create_order(order).await
    }

    async fn read_order(&self, id: &OrderId) -> Result<Option<OrderHeader>, StoreError> {
        Ok(self.orders.get_order(id.clone()).await?.map(|order| order.header))
    }

    async fn update_order_header(&self, header: &OrderHeader) -> Result<(), StoreError> {
        self.orders.update_header(header.clone()).await.map(|_| ())
    }

    async fn find_orders_by_number(&self, number: &str) -> Result<Vec<OrderId>, StoreError> {
        self.orders.find_by_number(number).await
    }

    async fn replace_order_line_items(&self, id: &OrderId, items: &[LineItem]) -> Result<(), StoreError> {
        self.orders.replace_items(id.clone(), items.to_vec()).await.map(|_| ())
    }

    async fn read_order_line_items(&self, id: &OrderId) -> Result<Vec<LineItem>, StoreError> {
        match self.orders.get_order(id.clone()).await? {
            Some(order) => Ok(order.items),
            None => Err(order_not_found(id)),
        }
    }

    async fn delete_order_line_items(&self, id: &OrderId) -> Result<(), StoreError> {
        self.orders.clear_items(id.clone()).await
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        self.orders.delete_order(id.clone()).await
    }

    async fn create_partner(&self, partner: NewPartner) -> Result<PartnerId, StoreError> {
        self.partners.create_partner(partner).await
    }

    async fn delete_partner(&self, id: &PartnerId) -> Result<(), StoreError> {
        self.partners.delete_partner(id.clone()).await
    }
}
