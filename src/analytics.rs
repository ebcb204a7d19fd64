//! Dashboard figures derived from the order list.

use std::collections::BTreeMap;

use crate::domain::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_orders: usize,
    pub revenue: f64,
    /// Count per status, in status declaration order. Statuses with no
    /// orders are absent.
    pub by_status: BTreeMap<OrderStatus, usize>,
}

impl Summary {
    /// `None` when there are no orders to summarise.
    pub fn from_orders(orders: &[Order]) -> Option<Self> {
        if orders.is_empty() {
            return None;
        }

        let mut by_status = BTreeMap::new();
        for order in orders {
            *by_status.entry(order.status).or_insert(0) += 1;
        }

        Some(Self {
            total_orders: orders.len(),
            revenue: orders.iter().map(|o| o.total).sum(),
            by_status,
        })
    }
}
