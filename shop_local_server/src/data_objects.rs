use serde::{Deserialize, Serialize};
use shop_local_engine::db_types::{NewOrder, NewOrderItem, OrderStatus, PaymentMethod, Role, User};
use sl_common::Paise;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: String,
    pub role: Role,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// The order-creation body. Per-item prices and any client-side status are deliberately absent: prices are
/// snapshotted on the server and new orders always start pending. Unknown fields in the payload are ignored, so
/// older clients that still send them keep working.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shop_id: i64,
    pub total_amount: Paise,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: bool,
    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub items: Vec<NewOrderItem>,
}

impl CreateOrderRequest {
    /// Builds the engine-level order. The customer id is filled in by the order flow API from the authenticated
    /// actor; the zero here is a placeholder.
    pub fn into_new_order(self) -> NewOrder {
        NewOrder {
            customer_id: 0,
            shop_id: self.shop_id,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            delivery_address: self.delivery_address,
            delivery_latitude: self.delivery_latitude,
            delivery_longitude: self.delivery_longitude,
            items: self.items,
        }
    }
}

/// The status-transition body. A legacy `customerId` field is tolerated (and ignored); the notification recipient is
/// always derived from the stored order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleShopRequest {
    pub is_open: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopListQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub category_id: Option<i64>,
}
