use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{LineItem, NewOrder, Order, OrderHeader, OrderId};
use crate::error::StoreError;
use crate::order_actor::{OrderAction, OrderActionResult};

const ENTITY: &str = "Order";

/// Client for interacting with the Order actor.
///
/// Headers and line items live in the same actor but are written by separate
/// calls, so a caller sees the same two-step persistence a relational store
/// would give it.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_basic_client!(OrderClient, Order, "Order", order);

impl OrderClient {
    /// Creates the header and returns it as stored.
    #[instrument(skip(self), fields(number = %order.number))]
    pub async fn create_order(&self, order: NewOrder) -> Result<OrderHeader, StoreError> {
        debug!("Sending request");
        let id = self
            .inner
            .create(order)
            .await
            .map_err(|e| StoreError::from_framework(ENTITY, e))?;
        match self.get_order(id.clone()).await? {
            Some(order) => Ok(order.header),
            None => Err(StoreError::NotFound { entity: ENTITY, id }),
        }
    }

    #[instrument(skip(self, header), fields(order_id = %header.id))]
    pub async fn update_header(&self, header: OrderHeader) -> Result<OrderHeader, StoreError> {
        debug!("Sending request");
        let updated = self
            .inner
            .update(header.id.clone(), header)
            .await
            .map_err(|e| StoreError::from_framework(ENTITY, e))?;
        Ok(updated.header)
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn replace_items(&self, id: OrderId, items: Vec<LineItem>) -> Result<usize, StoreError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, OrderAction::ReplaceItems(items))
            .await
            .map_err(|e| StoreError::from_framework(ENTITY, e))?
        {
            OrderActionResult::ReplaceItems(count) => Ok(count),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn clear_items(&self, id: OrderId) -> Result<(), StoreError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, OrderAction::ClearItems)
            .await
            .map_err(|e| StoreError::from_framework(ENTITY, e))?
        {
            OrderActionResult::ClearItems(_) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Ids of every order with this number, sorted.
    #[instrument(skip(self))]
    pub async fn find_by_number(&self, number: &str) -> Result<Vec<OrderId>, StoreError> {
        debug!("Sending request");
        let mut ids: Vec<OrderId> = self
            .list_orders()
            .await?
            .into_iter()
            .filter(|order| order.header.number == number)
            .map(|order| order.header.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

fn unexpected(result: OrderActionResult) -> StoreError {
    StoreError::Rejected(format!("unexpected order action result: {:?}", result))
}
