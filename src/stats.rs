use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Order, OrderType};

/// Order counters shown on the back-office dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total_orders: usize,
    pub sales: usize,
    pub purchases: usize,
    pub loans: usize,
    pub returns: usize,
    pub transfers: usize,
    /// Sum of order totals per type. Loans and returns are usually unpriced.
    pub value_by_type: BTreeMap<String, Decimal>,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut stats = OrderStats {
            total_orders: orders.len(),
            ..Default::default()
        };
        for order in orders {
            let order_type = order.kind().order_type();
            match order_type {
                OrderType::Sale => stats.sales += 1,
                OrderType::Purchase => stats.purchases += 1,
                OrderType::Loan => stats.loans += 1,
                OrderType::Return => stats.returns += 1,
                OrderType::Transfer => stats.transfers += 1,
            }
            *stats
                .value_by_type
                .entry(order_type.as_str().to_string())
                .or_insert(Decimal::ZERO) += order.total();
        }
        stats
    }

    pub fn count(&self, order_type: OrderType) -> usize {
        match order_type {
            OrderType::Sale => self.sales,
            OrderType::Purchase => self.purchases,
            OrderType::Loan => self.loans,
            OrderType::Return => self.returns,
            OrderType::Transfer => self.transfers,
        }
    }
}
