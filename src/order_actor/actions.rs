use crate::domain::LineItem;

/// Line-item operations on an Order.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Replaces the whole set of line items.
    ReplaceItems(Vec<LineItem>),
    /// Removes every line item, keeping the header.
    ClearItems,
}

/// Results from OrderActions - the number of line items now held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderActionResult {
    ReplaceItems(usize),
    ClearItems(usize),
}
