use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{OrderKind, PartnerId, ProductId, UserId};
use crate::error::ValidationError;

/// How the submitter picked the order's partner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartnerSelection {
    #[default]
    None,
    Existing(PartnerId),
    /// A name typed instead of selecting a partner; created just before the order.
    New { name: String, contact: String },
}

impl PartnerSelection {
    pub fn new_named(name: impl Into<String>) -> Self {
        PartnerSelection::New {
            name: name.into(),
            contact: String::new(),
        }
    }

    /// Whether a usable partner was given, ignoring blank ids and names.
    pub fn is_present(&self) -> bool {
        match self {
            PartnerSelection::None => false,
            PartnerSelection::Existing(id) => !id.trim().is_empty(),
            PartnerSelection::New { name, .. } => !name.trim().is_empty(),
        }
    }
}

/// A line as submitted: the product may still be an unmatched free-text name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl DraftLine {
    pub fn new(product_id: impl Into<ProductId>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            product_id: Some(product_id.into()),
            product_name: String::new(),
            quantity,
            unit_price,
        }
    }

    /// A line whose product was typed but never matched to a catalogue entry.
    pub fn unresolved(product_name: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            product_id: None,
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }
}

/// A typed order submission, input to create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub number: String,
    pub kind: OrderKind,
    pub partner: PartnerSelection,
    /// Defaults to today on create and to the stored date on update.
    pub order_date: Option<NaiveDate>,
    pub created_by: Option<UserId>,
    pub lines: Vec<DraftLine>,
}

impl OrderDraft {
    pub fn new(number: impl Into<String>, kind: OrderKind) -> Self {
        Self {
            number: number.into(),
            kind,
            partner: PartnerSelection::None,
            order_date: None,
            created_by: None,
            lines: Vec::new(),
        }
    }

    pub fn partner(mut self, partner: PartnerSelection) -> Self {
        self.partner = partner;
        self
    }

    pub fn line(mut self, line: DraftLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn dated(mut self, order_date: NaiveDate) -> Self {
        self.order_date = Some(order_date);
        self
    }

    pub fn created_by(mut self, user_id: impl Into<UserId>) -> Self {
        self.created_by = Some(user_id.into());
        self
    }
}

/// The order form as raw strings, before the type and direction are checked.
#[derive(Debug, Clone, Default)]
pub struct OrderForm {
    pub order_type: String,
    pub direction: Option<String>,
    pub number: String,
    pub partner: PartnerSelection,
    pub order_date: Option<NaiveDate>,
    pub created_by: Option<UserId>,
    pub lines: Vec<DraftLine>,
}

impl OrderForm {
    pub fn into_draft(self) -> Result<OrderDraft, ValidationError> {
        let kind = OrderKind::parse(&self.order_type, self.direction.as_deref())?;
        Ok(OrderDraft {
            number: self.number,
            kind,
            partner: self.partner,
            order_date: self.order_date,
            created_by: self.created_by,
            lines: self.lines,
        })
    }
}
