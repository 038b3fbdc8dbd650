use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem};

/// An order together with its line items, as returned by every order endpoint. Serializes flat, so the wire shape is
/// the order record with an `items` array spliced in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self { order, items }
    }
}
