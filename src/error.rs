use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{OrderId, OrderType, ProductId};
use crate::stock::{AdjustmentReport, LineOutcome};

/// A precondition of an order submission that did not hold.
///
/// Line numbers are 1-based, matching what the user sees in the form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Order must contain at least one line item")]
    NoLineItems,
    #[error("Product not resolved for line item {line} ({name:?})")]
    UnresolvedProduct { line: usize, name: String },
    #[error("Quantity must be positive for line item {line}, got {quantity}")]
    NonPositiveQuantity { line: usize, quantity: i64 },
    #[error("Quantity {quantity} is too large for line item {line}")]
    QuantityOutOfRange { line: usize, quantity: i64 },
    #[error("Unit price must be positive for line item {line} of a {order_type} order, got {unit_price}")]
    NonPositiveUnitPrice {
        line: usize,
        order_type: OrderType,
        unit_price: Decimal,
    },
    #[error("Unit price cannot be negative for line item {line}, got {unit_price}")]
    NegativeUnitPrice { line: usize, unit_price: Decimal },
    #[error("Order number is required")]
    MissingOrderNumber,
    #[error("Order number {0:?} is already in use")]
    DuplicateOrderNumber(String),
    #[error("Unknown order type {0:?}")]
    UnknownOrderType(String),
    #[error("Missing direction for {0}")]
    MissingDirection(OrderType),
    #[error("Invalid direction {value:?} for {order_type}")]
    InvalidDirection { order_type: OrderType, value: String },
    #[error("A {order_type} order does not take a direction, got {value:?}")]
    UnexpectedDirection { order_type: OrderType, value: String },
    #[error("A partner is required for a {0} order")]
    MissingPartner(OrderType),
}

/// Failure reported by an [`InventoryStore`](crate::store::InventoryStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Version conflict on {id}: expected {expected}, found {actual}")]
    Conflict { id: String, expected: u64, actual: u64 },
    #[error("Store request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store rejected request: {0}")]
    Rejected(String),
    #[error("Stock of product {0} would overflow")]
    Overflow(ProductId),
}

impl StoreError {
    pub fn from_framework(entity: &'static str, err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => StoreError::NotFound { entity, id },
            FrameworkError::Rejected(msg) => StoreError::Rejected(msg),
            FrameworkError::Conflict { id, expected, actual } => StoreError::Conflict { id, expected, actual },
            FrameworkError::Overflow(id) => StoreError::Overflow(id),
            FrameworkError::Timeout(after) => StoreError::Timeout(after),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                StoreError::Unavailable(format!("{} store: {}", entity, err))
            }
        }
    }

    /// Whether repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout(_) | StoreError::Unavailable(_) | StoreError::Conflict { .. })
    }
}

/// Failure adjusting the stock of a single line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockError {
    #[error("Product not found: {0}")]
    MissingProduct(ProductId),
    #[error("Stock of product {0} would overflow")]
    Overflow(ProductId),
    /// The write was sent but never acknowledged; it may or may not have landed.
    #[error("Stock write for product {product_id} unconfirmed: {source}")]
    Unconfirmed { product_id: ProductId, source: StoreError },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The reconciler step during which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CheckReferences,
    CheckOrderNumber,
    CreatePartner,
    CreateOrder,
    ReadOrder,
    ReadLineItems,
    ReverseStock,
    UpdateHeader,
    ReplaceLineItems,
    ApplyStock,
    DeleteLineItems,
    DeleteOrder,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Step::CheckReferences => "checking product references",
            Step::CheckOrderNumber => "checking the order number",
            Step::CreatePartner => "creating the partner",
            Step::CreateOrder => "creating the order header",
            Step::ReadOrder => "reading the order",
            Step::ReadLineItems => "reading the line items",
            Step::ReverseStock => "reversing the previous stock adjustment",
            Step::UpdateHeader => "updating the order header",
            Step::ReplaceLineItems => "replacing the line items",
            Step::ApplyStock => "applying the stock adjustment",
            Step::DeleteLineItems => "deleting the line items",
            Step::DeleteOrder => "deleting the order header",
        };
        f.write_str(text)
    }
}

/// Typed failure of an order create, update or delete.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Order validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Line item {line} references unknown product {product_id}")]
    Reference { line: usize, product_id: ProductId },
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Order {0} already has a mutation in flight")]
    Busy(OrderId),
    #[error("Conflict while {step}: {source}")]
    Conflict { step: Step, source: StoreError },
    #[error("Store failure while {step}: {source}")]
    Persistence { step: Step, source: StoreError },
    #[error("Stock adjustment failed for {failed} of {total} line items while {step}: {first}")]
    PartialAdjustment {
        step: Step,
        failed: usize,
        total: usize,
        first: StockError,
    },
    /// Some stock writes went unanswered. The order is left as stored and the
    /// listed products need checking before anything is resubmitted.
    #[error("Stock outcome unknown for {products:?} of order {order_id} while {step}")]
    Indeterminate {
        step: Step,
        order_id: OrderId,
        products: Vec<ProductId>,
    },
}

impl ReconcileError {
    pub fn store(step: Step, source: StoreError) -> Self {
        match source {
            StoreError::Conflict { .. } => ReconcileError::Conflict { step, source },
            source => ReconcileError::Persistence { step, source },
        }
    }

    /// Turns an adjustment report with failed lines into the error a caller
    /// should see. Returns `None` when every line went through.
    pub fn from_report(step: Step, order_id: &OrderId, report: &AdjustmentReport) -> Option<Self> {
        let products = report.unconfirmed_products();
        if !products.is_empty() {
            return Some(ReconcileError::Indeterminate {
                step,
                order_id: order_id.clone(),
                products,
            });
        }

        let failures: Vec<(usize, &StockError)> = report
            .lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| match &line.outcome {
                LineOutcome::Failed(err) => Some((index + 1, err)),
                _ => None,
            })
            .collect();

        let (first_line, first) = *failures.first()?;

        let conflict = failures.iter().find_map(|(_, err)| match err {
            StockError::Store(source @ StoreError::Conflict { .. }) => Some(source.clone()),
            _ => None,
        });
        if let Some(source) = conflict {
            return Some(ReconcileError::Conflict { step, source });
        }

        if let StockError::MissingProduct(product_id) = first {
            return Some(ReconcileError::Reference {
                line: first_line,
                product_id: product_id.clone(),
            });
        }

        Some(ReconcileError::PartialAdjustment {
            step,
            failed: failures.len(),
            total: report.lines.len(),
            first: first.clone(),
        })
    }

    /// Whether the caller may resubmit the same mutation.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcileError::Busy(_) | ReconcileError::Conflict { .. } => true,
            ReconcileError::Persistence { source, .. } => source.is_retryable(),
            ReconcileError::PartialAdjustment {
                first: StockError::Store(source),
                ..
            } => source.is_retryable(),
            _ => false,
        }
    }
}
