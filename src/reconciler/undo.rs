use tracing::{error, warn};

use crate::domain::{LineItem, OrderHeader, OrderId, PartnerId, StockLine};
use crate::sign::StockSign;
use crate::stock::StockAdjuster;
use crate::store::InventoryStore;

/// A compensating write for something a mutation already persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoStep {
    DeletePartner(PartnerId),
    DeleteOrder(OrderId),
    ClearLineItems(OrderId),
    RestoreLineItems { order_id: OrderId, items: Vec<LineItem> },
    RestoreHeader(OrderHeader),
    /// Applies `sign` to `lines`, cancelling an earlier adjustment.
    Readjust { lines: Vec<StockLine>, sign: StockSign },
}

/// Writes made so far by one mutation, newest last.
#[derive(Debug, Default)]
pub struct UndoLog {
    steps: Vec<UndoStep>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: UndoStep) {
        self.steps.push(step);
    }

    /// Records the cancellation of a stock adjustment made with `applied`.
    pub fn adjusted(&mut self, lines: Vec<StockLine>, applied: StockSign) {
        if !lines.is_empty() && !applied.is_zero() {
            self.steps.push(UndoStep::Readjust {
                lines,
                sign: applied.inverse(),
            });
        }
    }

    pub fn steps(&self) -> &[UndoStep] {
        &self.steps
    }

    /// Runs every step newest first. Failures are logged and skipped so the
    /// remaining steps still run.
    pub async fn unwind(self, store: &dyn InventoryStore, adjuster: &StockAdjuster) {
        if self.steps.is_empty() {
            return;
        }
        warn!(steps = self.steps.len(), "Compensating partially applied mutation");

        for step in self.steps.into_iter().rev() {
            let result = match &step {
                UndoStep::DeletePartner(id) => store.delete_partner(id).await,
                UndoStep::DeleteOrder(id) => store.delete_order(id).await,
                UndoStep::ClearLineItems(id) => store.delete_order_line_items(id).await,
                UndoStep::RestoreLineItems { order_id, items } => {
                    store.replace_order_line_items(order_id, items).await
                }
                UndoStep::RestoreHeader(header) => store.update_order_header(header).await,
                UndoStep::Readjust { lines, sign } => {
                    let report = adjuster.apply(lines, *sign).await;
                    if !report.is_complete() {
                        error!(
                            failed = report.failed_count(),
                            unconfirmed = ?report.unconfirmed_products(),
                            total = lines.len(),
                            "Stock could not be restored, product stock needs manual correction"
                        );
                    }
                    Ok(())
                }
            };
            if let Err(e) = result {
                error!(step = ?step, error = %e, "Compensation step failed");
            }
        }
    }
}
