use chrono::Utc;

use super::actions::{ProductAction, ProductActionResult};
use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{Product, ProductCreate, ProductPatch};

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// # Errors
    /// Rejects an empty name and a negative initial stock.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, FrameworkError> {
        if params.name.trim().is_empty() {
            return Err(FrameworkError::Rejected("product name is required".into()));
        }
        if params.initial_stock < 0 {
            return Err(FrameworkError::Rejected(format!(
                "initial stock cannot be negative, got {}",
                params.initial_stock
            )));
        }
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            brand_id: params.brand_id,
            model: params.model,
            stock: params.initial_stock,
            version: 0,
            created_at: Utc::now(),
        })
    }

    /// Updates catalogue fields. Stock only changes through actions.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), FrameworkError> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(FrameworkError::Rejected("product name is required".into()));
            }
            self.name = name.trim().to_string();
        }
        if let Some(brand_id) = patch.brand_id {
            self.brand_id = Some(brand_id);
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        Ok(())
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, FrameworkError> {
        match action {
            ProductAction::ReadStock => Ok(ProductActionResult::ReadStock(self.snapshot())),
            ProductAction::WriteStock { stock, expected_version } => {
                if let Some(expected) = expected_version {
                    if expected != self.version {
                        return Err(FrameworkError::Conflict {
                            id: self.id.clone(),
                            expected,
                            actual: self.version,
                        });
                    }
                }
                self.stock = stock;
                self.version += 1;
                Ok(ProductActionResult::WriteStock(self.snapshot()))
            }
            ProductAction::AdjustStock(delta) => {
                self.stock = self
                    .stock
                    .checked_add(delta)
                    .ok_or_else(|| FrameworkError::Overflow(self.id.clone()))?;
                self.version += 1;
                Ok(ProductActionResult::AdjustStock(self.snapshot()))
            }
        }
    }
}
