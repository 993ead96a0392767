use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::PartnerRequirement;
use crate::domain::{LineItem, OrderDraft, OrderKind, OrderType, PartnerSelection, StockLine, UserId};
use crate::error::ValidationError;

/// An order draft that passed every validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOrder {
    pub number: String,
    pub kind: OrderKind,
    /// `PartnerSelection::None` when no usable partner was given.
    pub partner: PartnerSelection,
    pub order_date: Option<NaiveDate>,
    pub created_by: Option<UserId>,
    pub items: Vec<LineItem>,
}

impl ValidOrder {
    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.items.iter().map(LineItem::stock_line).collect()
    }
}

fn partner_required(kind: OrderKind, requirement: PartnerRequirement) -> bool {
    match requirement {
        PartnerRequirement::AllKinds => true,
        PartnerRequirement::SaleAndPurchase => matches!(kind.order_type(), OrderType::Sale | OrderType::Purchase),
    }
}

/// Checks a draft without touching any store.
///
/// Rules are checked in a fixed order and the first one broken is reported:
/// line items present, then per line the product reference, quantity and
/// unit price, then the order number, then the partner.
pub fn validate(draft: &OrderDraft, requirement: PartnerRequirement) -> Result<ValidOrder, ValidationError> {
    if draft.lines.is_empty() {
        return Err(ValidationError::NoLineItems);
    }

    let order_type = draft.kind.order_type();
    let mut items = Vec::with_capacity(draft.lines.len());
    for (index, line) in draft.lines.iter().enumerate() {
        let number = index + 1;

        let product_id = match line.product_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(ValidationError::UnresolvedProduct {
                    line: number,
                    name: line.product_name.clone(),
                })
            }
        };

        if line.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity {
                line: number,
                quantity: line.quantity,
            });
        }
        let quantity = u32::try_from(line.quantity).map_err(|_| ValidationError::QuantityOutOfRange {
            line: number,
            quantity: line.quantity,
        })?;

        if order_type.requires_unit_price() {
            if line.unit_price <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveUnitPrice {
                    line: number,
                    order_type,
                    unit_price: line.unit_price,
                });
            }
        } else if line.unit_price < Decimal::ZERO {
            return Err(ValidationError::NegativeUnitPrice {
                line: number,
                unit_price: line.unit_price,
            });
        }

        items.push(LineItem::new(product_id, quantity, line.unit_price));
    }

    let number = draft.number.trim();
    if number.is_empty() {
        return Err(ValidationError::MissingOrderNumber);
    }

    let partner = match &draft.partner {
        selection if !selection.is_present() => PartnerSelection::None,
        PartnerSelection::Existing(id) => PartnerSelection::Existing(id.trim().to_string()),
        PartnerSelection::New { name, contact } => PartnerSelection::New {
            name: name.trim().to_string(),
            contact: contact.trim().to_string(),
        },
        PartnerSelection::None => PartnerSelection::None,
    };
    if !partner.is_present() && partner_required(draft.kind, requirement) {
        return Err(ValidationError::MissingPartner(order_type));
    }

    Ok(ValidOrder {
        number: number.to_string(),
        kind: draft.kind,
        partner,
        order_date: draft.order_date,
        created_by: draft.created_by.clone(),
        items,
    })
}
