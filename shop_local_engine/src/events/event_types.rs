use serde::Serialize;

use crate::db_types::{Order, OrderItem, OrderStatus, Product, Review, Shop};

//--------------------------------------   CustomerSummary   ---------------------------------------------------------
/// The minimal customer descriptor attached to a new-order notification. Vendors see who ordered without the full
/// account record going over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: i64,
    pub name: String,
}

//--------------------------------------    NewOrderEvent    ---------------------------------------------------------
/// Fired after an order and its items have been committed. Addressed to the private channel of the vendor who owns
/// the shop the order was placed against.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderEvent {
    #[serde(skip)]
    pub vendor_id: i64,
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub customer: CustomerSummary,
}

//--------------------------------------  OrderStatusEvent   ---------------------------------------------------------
/// Fired after a status transition has been persisted. Addressed to the private channel of the customer who owns the
/// order; `customer_id` is always taken from the stored order row, never from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusEvent {
    #[serde(skip)]
    pub customer_id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
}

//--------------------------------------      ShopEvent      ---------------------------------------------------------
/// Shop catalogue changes, broadcast to every connected customer.
#[derive(Debug, Clone, Serialize)]
pub enum ShopEvent {
    Added(Shop),
    Updated(Shop),
    Deleted(i64),
    Toggled(Shop),
}

impl ShopEvent {
    /// The wire name of the event, as clients know it.
    pub fn name(&self) -> &'static str {
        match self {
            ShopEvent::Added(_) => "shop-added",
            ShopEvent::Updated(_) => "shop-updated",
            ShopEvent::Deleted(_) => "shop-deleted",
            ShopEvent::Toggled(_) => "shop-toggled",
        }
    }
}

//--------------------------------------    ProductEvent     ---------------------------------------------------------
/// Product changes, addressed to the channel of the shop the product belongs to, so only clients currently viewing
/// that shop receive them.
#[derive(Debug, Clone, Serialize)]
pub struct ProductEvent {
    pub shop_id: i64,
    pub change: ProductChange,
}

#[derive(Debug, Clone, Serialize)]
pub enum ProductChange {
    Added(Product),
    Updated(Product),
    Deleted(i64),
}

impl ProductChange {
    pub fn name(&self) -> &'static str {
        match self {
            ProductChange::Added(_) => "product-added",
            ProductChange::Updated(_) => "product-updated",
            ProductChange::Deleted(_) => "product-deleted",
        }
    }
}

//--------------------------------------    NewReviewEvent   ---------------------------------------------------------
/// Fired when a customer reviews a shop. Addressed to the shop owner's private channel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReviewEvent {
    #[serde(skip)]
    pub vendor_id: i64,
    #[serde(flatten)]
    pub review: Review,
}
