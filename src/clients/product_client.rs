use tracing::{debug, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{Product, ProductCreate, ProductId, ProductPatch, StockSnapshot};
use crate::error::StoreError;
use crate::product_actor::{ProductAction, ProductActionResult};

const ENTITY: &str = "Product";

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, "Product", product);

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, StoreError> {
        debug!("Sending request");
        self.inner
            .create(params)
            .await
            .map_err(|e| StoreError::from_framework(ENTITY, e))
    }

    /// Edits catalogue fields; stock is untouched.
    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        debug!("Sending request");
        self.inner
            .update(id, patch)
            .await
            .map_err(|e| StoreError::from_framework(ENTITY, e))
    }

    /// Current stock and version; `None` when the product does not exist.
    #[instrument(skip(self))]
    pub async fn read_stock(&self, id: ProductId) -> Result<Option<StockSnapshot>, StoreError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::ReadStock).await {
            Ok(ProductActionResult::ReadStock(snapshot)) => Ok(Some(snapshot)),
            Ok(other) => Err(unexpected(other)),
            Err(FrameworkError::NotFound(_)) => Ok(None),
            Err(e) => Err(StoreError::from_framework(ENTITY, e)),
        }
    }

    /// Overwrites the stock; returns `false` when the product does not exist.
    #[instrument(skip(self))]
    pub async fn write_stock(
        &self,
        id: ProductId,
        stock: i64,
        expected_version: Option<u64>,
    ) -> Result<bool, StoreError> {
        debug!("Sending request");
        let action = ProductAction::WriteStock { stock, expected_version };
        match self.inner.perform_action(id, action).await {
            Ok(ProductActionResult::WriteStock(_)) => Ok(true),
            Ok(other) => Err(unexpected(other)),
            Err(FrameworkError::NotFound(_)) => Ok(false),
            Err(e) => Err(StoreError::from_framework(ENTITY, e)),
        }
    }

    /// Adds `delta` inside the actor; returns the new stock, `None` when the
    /// product does not exist.
    #[instrument(skip(self))]
    pub async fn adjust_stock(&self, id: ProductId, delta: i64) -> Result<Option<i64>, StoreError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::AdjustStock(delta)).await {
            Ok(ProductActionResult::AdjustStock(snapshot)) => Ok(Some(snapshot.stock)),
            Ok(other) => Err(unexpected(other)),
            Err(FrameworkError::NotFound(_)) => Ok(None),
            Err(e) => Err(StoreError::from_framework(ENTITY, e)),
        }
    }

    /// Every product, ordered by name.
    pub async fn inventory(&self) -> Result<Vec<Product>, StoreError> {
        let mut products = self.list_products().await?;
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }
}

fn unexpected(result: ProductActionResult) -> StoreError {
    StoreError::Rejected(format!("unexpected product action result: {:?}", result))
}
