use chrono::Utc;

use super::actions::{OrderAction, OrderActionResult};
use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{NewOrder, Order, OrderHeader};

impl Entity for Order {
    type Id = String;
    type CreateParams = NewOrder;
    type Patch = OrderHeader;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;

    fn id(&self) -> &String {
        &self.header.id
    }

    /// Creates the order header. Line items are attached by a later action.
    fn from_create_params(id: String, params: NewOrder) -> Result<Self, FrameworkError> {
        let number = params.number.trim().to_string();
        if number.is_empty() {
            return Err(FrameworkError::Rejected("order number is required".into()));
        }
        Ok(Self {
            header: OrderHeader {
                id,
                number,
                kind: params.kind,
                partner_id: params.partner_id,
                order_date: params.order_date,
                created_at: Utc::now(),
                created_by: params.created_by,
            },
            items: Vec::new(),
        })
    }

    /// Replaces the header fields. Identity and creation stamp are kept.
    fn on_update(&mut self, header: OrderHeader) -> Result<(), FrameworkError> {
        if header.id != self.header.id {
            return Err(FrameworkError::Rejected(format!(
                "header for {} sent to order {}",
                header.id, self.header.id
            )));
        }
        let created_at = self.header.created_at;
        self.header = header;
        self.header.created_at = created_at;
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, FrameworkError> {
        match action {
            OrderAction::ReplaceItems(items) => {
                if let Some(line) = items.iter().position(|item| item.quantity == 0) {
                    return Err(FrameworkError::Rejected(format!(
                        "line item {} has zero quantity",
                        line + 1
                    )));
                }
                self.items = items;
                Ok(OrderActionResult::ReplaceItems(self.items.len()))
            }
            OrderAction::ClearItems => {
                self.items.clear();
                Ok(OrderActionResult::ClearItems(0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItem, OrderKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn new_order(number: &str) -> NewOrder {
        NewOrder {
            number: number.into(),
            kind: OrderKind::Purchase,
            partner_id: Some("partner_1".into()),
            order_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            created_by: None,
        }
    }

    #[test]
    fn test_number_is_trimmed_and_required() {
        let order = Order::from_create_params("order_1".into(), new_order("  P-100 ")).unwrap();
        assert_eq!(order.header.number, "P-100");
        assert!(order.items.is_empty());

        let err = Order::from_create_params("order_2".into(), new_order("   ")).unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(_)));
    }

    #[test]
    fn test_header_update_keeps_identity() {
        let mut order = Order::from_create_params("order_1".into(), new_order("P-100")).unwrap();
        let created_at = order.header.created_at;

        let mut header = order.header.clone();
        header.kind = OrderKind::Sale;
        header.created_at = created_at + chrono::Duration::days(1);
        order.on_update(header).unwrap();
        assert_eq!(order.header.kind, OrderKind::Sale);
        assert_eq!(order.header.created_at, created_at);

        let mut foreign = order.header.clone();
        foreign.id = "order_9".into();
        assert!(order.on_update(foreign).is_err());
    }

    #[test]
    fn test_items_are_replaced_wholesale() {
        let mut order = Order::from_create_params("order_1".into(), new_order("P-100")).unwrap();
        order
            .handle_action(OrderAction::ReplaceItems(vec![
                LineItem::new("product_1", 2, dec!(3)),
                LineItem::new("product_2", 1, dec!(4)),
            ]))
            .unwrap();
        let result = order
            .handle_action(OrderAction::ReplaceItems(vec![LineItem::new("product_3", 5, dec!(1))]))
            .unwrap();
        assert_eq!(result, OrderActionResult::ReplaceItems(1));
        assert_eq!(order.items[0].product_id, "product_3");

        assert!(order
            .handle_action(OrderAction::ReplaceItems(vec![LineItem::new("product_3", 0, dec!(1))]))
            .is_err());
    }
}
