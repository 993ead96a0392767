//! Applies `sign * quantity` to the stock of every product an order references.

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::config::{MissingProductPolicy, StockWriteMode};
use crate::domain::{ProductId, StockLine};
use crate::error::{StockError, StoreError};
use crate::sign::StockSign;
use crate::store::InventoryStore;

/// What happened to one line of an adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Adjusted { before: i64, after: i64 },
    /// The product no longer exists and the write matched nothing.
    Unmatched,
    Failed(StockError),
    /// The write went unanswered; stock may or may not have moved.
    Indeterminate(StockError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAdjustment {
    pub product_id: ProductId,
    pub quantity: u32,
    pub sign: StockSign,
    pub outcome: LineOutcome,
}

impl LineAdjustment {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, LineOutcome::Failed(_))
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self.outcome, LineOutcome::Indeterminate(_))
    }
}

/// Per-line result of [`StockAdjuster::apply`], in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjustmentReport {
    pub lines: Vec<LineAdjustment>,
}

impl AdjustmentReport {
    pub fn is_complete(&self) -> bool {
        self.lines
            .iter()
            .all(|line| !line.is_failed() && !line.is_indeterminate())
    }

    pub fn failed_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_failed()).count()
    }

    /// Products whose adjustment may or may not have been applied.
    pub fn unconfirmed_products(&self) -> Vec<ProductId> {
        self.lines
            .iter()
            .filter(|line| line.is_indeterminate())
            .map(|line| line.product_id.clone())
            .collect()
    }

    /// Lines whose stock actually moved, for compensation.
    pub fn applied_lines(&self) -> Vec<StockLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line.outcome, LineOutcome::Adjusted { .. }))
            .map(|line| StockLine::new(line.product_id.clone(), line.quantity))
            .collect()
    }
}

#[derive(Clone)]
pub struct StockAdjuster {
    store: Arc<dyn InventoryStore>,
    mode: StockWriteMode,
    missing: MissingProductPolicy,
}

impl StockAdjuster {
    pub fn new(store: Arc<dyn InventoryStore>, mode: StockWriteMode, missing: MissingProductPolicy) -> Self {
        Self { store, mode, missing }
    }

    /// Adjusts each line in order. A failing line does not stop the rest;
    /// the report says which lines went through.
    #[instrument(skip(self, lines), fields(line_count = lines.len(), sign = %sign, mode = ?self.mode))]
    pub async fn apply(&self, lines: &[StockLine], sign: StockSign) -> AdjustmentReport {
        if sign.is_zero() {
            debug!("Zero sign, nothing to adjust");
            return AdjustmentReport::default();
        }

        let mut report = AdjustmentReport {
            lines: Vec::with_capacity(lines.len()),
        };
        for line in lines {
            let outcome = self.adjust_line(line, sign).await;
            match &outcome {
                LineOutcome::Adjusted { before, after } => {
                    debug!(product_id = %line.product_id, before, after, "Stock adjusted");
                }
                LineOutcome::Unmatched => {
                    warn!(product_id = %line.product_id, "Product not found, stock write matched nothing");
                }
                LineOutcome::Failed(err) => {
                    error!(product_id = %line.product_id, error = %err, "Stock adjustment failed");
                }
                LineOutcome::Indeterminate(err) => {
                    error!(product_id = %line.product_id, error = %err, "Stock adjustment outcome unknown");
                }
            }
            report.lines.push(LineAdjustment {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                sign,
                outcome,
            });
        }
        report
    }

    async fn adjust_line(&self, line: &StockLine, sign: StockSign) -> LineOutcome {
        let delta = sign.delta(line.quantity);
        let result = match self.mode {
            StockWriteMode::Atomic => self.adjust_atomic(&line.product_id, delta).await,
            StockWriteMode::ReadModifyWrite => self.read_modify_write(&line.product_id, delta).await,
        };
        match result {
            Ok(Some((before, after))) => LineOutcome::Adjusted { before, after },
            Ok(None) => match self.missing {
                MissingProductPolicy::AssumeZero => LineOutcome::Unmatched,
                MissingProductPolicy::Reject => LineOutcome::Failed(StockError::MissingProduct(line.product_id.clone())),
            },
            Err(err @ StockError::Unconfirmed { .. }) => LineOutcome::Indeterminate(err),
            Err(err) => LineOutcome::Failed(err),
        }
    }

    async fn adjust_atomic(&self, id: &ProductId, delta: i64) -> Result<Option<(i64, i64)>, StockError> {
        let after = self
            .store
            .adjust_product_stock(id, delta)
            .await
            .map_err(|e| write_error(id, e))?;
        Ok(after.map(|after| (after - delta, after)))
    }

    async fn read_modify_write(&self, id: &ProductId, delta: i64) -> Result<Option<(i64, i64)>, StockError> {
        let snapshot = self.store.read_product_stock(id).await?;
        let (before, expected_version) = match snapshot {
            Some(snapshot) => (snapshot.stock, Some(snapshot.version)),
            None if self.missing == MissingProductPolicy::Reject => return Ok(None),
            None => (0, None),
        };
        let after = before
            .checked_add(delta)
            .ok_or_else(|| StockError::Overflow(id.clone()))?;

        let matched = self
            .store
            .write_product_stock(id, after, expected_version)
            .await
            .map_err(|e| write_error(id, e))?;
        Ok(matched.then_some((before, after)))
    }
}

/// A timed-out write may still land, so it is not reported as a plain failure.
fn write_error(id: &ProductId, err: StoreError) -> StockError {
    match err {
        StoreError::Timeout(_) => StockError::Unconfirmed {
            product_id: id.clone(),
            source: err,
        },
        StoreError::Overflow(_) => StockError::Overflow(id.clone()),
        err => StockError::Store(err),
    }
}
