//! Order create, update and delete with the matching stock adjustments.
//!
//! Every mutation reverses what the persisted order contributed to stock
//! before applying what the new state contributes, so product stock always
//! equals the net effect of the orders currently stored. Each persisted write
//! is recorded in an [`UndoLog`]; when a later step fails the log is unwound
//! and the original error is returned.
//!
//! A stock write that goes unanswered while applying the new state leaves the
//! order as written: removing it would orphan stock the write may have moved.

mod undo;
mod validation;

pub use undo::{UndoLog, UndoStep};
pub use validation::{validate, ValidOrder};

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashSet;
use tracing::{debug, error, info, instrument};

use crate::config::{PartnerRequirement, ReconcilerConfig};
use crate::domain::{
    LineItem, NewOrder, NewPartner, Order, OrderDraft, OrderHeader, OrderId, PartnerId, PartnerSelection,
};
use crate::error::{ReconcileError, Step, ValidationError};
use crate::stock::StockAdjuster;
use crate::store::InventoryStore;

/// Evaluates a store call, or compensates and returns the failure of `$step`.
macro_rules! try_step {
    ($self:ident, $undo:ident, $step:expr, $call:expr) => {
        match $call.await {
            Ok(value) => value,
            Err(e) => return Err($self.abort($undo, ReconcileError::store($step, e)).await),
        }
    };
}

/// Applies a stock adjustment, or compensates and returns its failure.
macro_rules! try_adjust {
    ($self:ident, $undo:ident, $step:expr, $order_id:expr, $lines:expr, $sign:expr) => {{
        let sign = $sign;
        let report = $self.adjuster.apply($lines, sign).await;
        $undo.adjusted(report.applied_lines(), sign);
        match ReconcileError::from_report($step, $order_id, &report) {
            None => {}
            Some(err @ ReconcileError::Indeterminate { step: Step::ApplyStock, .. }) => {
                return Err($self.leave_in_place($undo, err));
            }
            Some(err) => return Err($self.abort($undo, err).await),
        }
    }};
}

/// Marks an order as having a mutation in flight until dropped.
struct InFlight {
    orders: Arc<DashSet<OrderId>>,
    id: OrderId,
}

impl InFlight {
    fn acquire(orders: &Arc<DashSet<OrderId>>, id: &OrderId) -> Result<Self, ReconcileError> {
        if !orders.insert(id.clone()) {
            return Err(ReconcileError::Busy(id.clone()));
        }
        Ok(Self {
            orders: Arc::clone(orders),
            id: id.clone(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.orders.remove(&self.id);
    }
}

#[derive(Clone)]
pub struct OrderReconciler {
    store: Arc<dyn InventoryStore>,
    adjuster: StockAdjuster,
    partner_requirement: PartnerRequirement,
    enforce_unique_number: bool,
    in_flight: Arc<DashSet<OrderId>>,
}

impl OrderReconciler {
    pub fn new(store: Arc<dyn InventoryStore>, config: &ReconcilerConfig) -> Self {
        let adjuster = StockAdjuster::new(Arc::clone(&store), config.stock_write_mode, config.missing_product);
        Self {
            store,
            adjuster,
            partner_requirement: config.partner_requirement,
            enforce_unique_number: config.enforce_unique_order_number,
            in_flight: Arc::new(DashSet::new()),
        }
    }

    /// Checks a draft against every rule that needs no store access.
    pub fn validate(&self, draft: &OrderDraft) -> Result<(), ValidationError> {
        validate(draft, self.partner_requirement).map(|_| ())
    }

    pub fn is_in_flight(&self, id: &OrderId) -> bool {
        self.in_flight.contains(id)
    }

    /// Persists a new order and applies its stock adjustment.
    #[instrument(skip(self, draft), fields(number = %draft.number, kind = %draft.kind, lines = draft.lines.len()))]
    pub async fn create(&self, draft: OrderDraft) -> Result<Order, ReconcileError> {
        let order = validate(&draft, self.partner_requirement)?;
        self.check_number(&order.number, None).await?;
        self.check_references(&order.items).await?;

        let mut undo = UndoLog::new();
        let partner_id = self.resolve_partner(&order.partner, &mut undo).await?;

        let new_order = NewOrder {
            number: order.number.clone(),
            kind: order.kind,
            partner_id,
            order_date: order.order_date.unwrap_or_else(|| Utc::now().date_naive()),
            created_by: order.created_by.clone(),
        };
        let header = try_step!(self, undo, Step::CreateOrder, self.store.create_order(new_order));
        undo.push(UndoStep::DeleteOrder(header.id.clone()));

        try_step!(
            self,
            undo,
            Step::ReplaceLineItems,
            self.store.replace_order_line_items(&header.id, &order.items)
        );
        undo.push(UndoStep::ClearLineItems(header.id.clone()));

        try_adjust!(
            self,
            undo,
            Step::ApplyStock,
            &header.id,
            &order.stock_lines(),
            order.kind.stock_sign()
        );

        info!(order_id = %header.id, "Order created");
        Ok(Order {
            header,
            items: order.items,
        })
    }

    /// Replaces an order, reversing the stock its persisted line items moved
    /// before applying the new ones.
    #[instrument(skip(self, draft), fields(order_id = %id, kind = %draft.kind, lines = draft.lines.len()))]
    pub async fn update(&self, id: &OrderId, draft: OrderDraft) -> Result<Order, ReconcileError> {
        let _guard = InFlight::acquire(&self.in_flight, id)?;

        let order = validate(&draft, self.partner_requirement)?;
        self.check_number(&order.number, Some(id)).await?;
        self.check_references(&order.items).await?;

        let (old_header, old_items) = self.read_persisted(id).await?;
        let old_lines: Vec<_> = old_items.iter().map(LineItem::stock_line).collect();

        let mut undo = UndoLog::new();
        let partner_id = self.resolve_partner(&order.partner, &mut undo).await?;

        try_adjust!(
            self,
            undo,
            Step::ReverseStock,
            id,
            &old_lines,
            old_header.kind.stock_sign().inverse()
        );

        let header = OrderHeader {
            id: old_header.id.clone(),
            number: order.number.clone(),
            kind: order.kind,
            partner_id,
            order_date: order.order_date.unwrap_or(old_header.order_date),
            created_at: old_header.created_at,
            created_by: old_header.created_by.clone(),
        };
        try_step!(self, undo, Step::UpdateHeader, self.store.update_order_header(&header));
        undo.push(UndoStep::RestoreHeader(old_header));

        try_step!(
            self,
            undo,
            Step::ReplaceLineItems,
            self.store.replace_order_line_items(id, &order.items)
        );
        undo.push(UndoStep::RestoreLineItems {
            order_id: id.clone(),
            items: old_items,
        });

        try_adjust!(
            self,
            undo,
            Step::ApplyStock,
            id,
            &order.stock_lines(),
            order.kind.stock_sign()
        );

        info!("Order updated");
        Ok(Order {
            header,
            items: order.items,
        })
    }

    /// Reverses an order's stock adjustment, then removes it.
    ///
    /// If any line cannot be reversed the order is left in place.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete(&self, id: &OrderId) -> Result<(), ReconcileError> {
        let _guard = InFlight::acquire(&self.in_flight, id)?;

        let (header, items) = self.read_persisted(id).await?;
        let lines: Vec<_> = items.iter().map(LineItem::stock_line).collect();

        let mut undo = UndoLog::new();
        try_adjust!(
            self,
            undo,
            Step::ReverseStock,
            id,
            &lines,
            header.kind.stock_sign().inverse()
        );

        try_step!(self, undo, Step::DeleteLineItems, self.store.delete_order_line_items(id));
        undo.push(UndoStep::RestoreLineItems {
            order_id: id.clone(),
            items,
        });

        try_step!(self, undo, Step::DeleteOrder, self.store.delete_order(id));

        info!("Order deleted");
        Ok(())
    }

    async fn abort(&self, undo: UndoLog, err: ReconcileError) -> ReconcileError {
        error!(error = %err, "Order mutation failed");
        undo.unwind(self.store.as_ref(), &self.adjuster).await;
        err
    }

    /// Keeps everything written so far; stock of the reported products needs
    /// manual reconciliation.
    fn leave_in_place(&self, undo: UndoLog, err: ReconcileError) -> ReconcileError {
        error!(
            error = %err,
            skipped_compensations = undo.steps().len(),
            "Order mutation left in place with unconfirmed stock writes"
        );
        err
    }

    async fn read_persisted(&self, id: &OrderId) -> Result<(OrderHeader, Vec<LineItem>), ReconcileError> {
        let header = self
            .store
            .read_order(id)
            .await
            .map_err(|e| ReconcileError::store(Step::ReadOrder, e))?
            .ok_or_else(|| ReconcileError::NotFound(id.clone()))?;
        let items = self
            .store
            .read_order_line_items(id)
            .await
            .map_err(|e| ReconcileError::store(Step::ReadLineItems, e))?;
        Ok((header, items))
    }

    async fn check_number(&self, number: &str, current: Option<&OrderId>) -> Result<(), ReconcileError> {
        if !self.enforce_unique_number {
            return Ok(());
        }
        let existing = self
            .store
            .find_orders_by_number(number)
            .await
            .map_err(|e| ReconcileError::store(Step::CheckOrderNumber, e))?;
        if existing.iter().any(|other| Some(other) != current) {
            return Err(ValidationError::DuplicateOrderNumber(number.to_string()).into());
        }
        Ok(())
    }

    async fn check_references(&self, items: &[LineItem]) -> Result<(), ReconcileError> {
        for (index, item) in items.iter().enumerate() {
            let product = self
                .store
                .read_product(&item.product_id)
                .await
                .map_err(|e| ReconcileError::store(Step::CheckReferences, e))?;
            if product.is_none() {
                return Err(ReconcileError::Reference {
                    line: index + 1,
                    product_id: item.product_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns the partner id to store, creating a typed-in partner first.
    async fn resolve_partner(
        &self,
        selection: &PartnerSelection,
        undo: &mut UndoLog,
    ) -> Result<Option<PartnerId>, ReconcileError> {
        match selection {
            PartnerSelection::None => Ok(None),
            PartnerSelection::Existing(id) => Ok(Some(id.clone())),
            PartnerSelection::New { name, contact } => {
                let id = self
                    .store
                    .create_partner(NewPartner::quick(name.as_str(), contact.as_str()))
                    .await
                    .map_err(|e| ReconcileError::store(Step::CreatePartner, e))?;
                debug!(partner_id = %id, "Created partner for order");
                undo.push(UndoStep::DeletePartner(id.clone()));
                Ok(Some(id))
            }
        }
    }
}
