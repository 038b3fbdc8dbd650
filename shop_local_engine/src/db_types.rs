use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sl_common::Paise;
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value for {0}: {1}")]
pub struct ConversionError(pub &'static str, pub String);

//--------------------------------------        Role        ----------------------------------------------------------
/// The three actor roles of the marketplace. Admin is a universal override: every role-gated operation accepts an
/// admin caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Vendor,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Vendor => write!(f, "vendor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError("role", s.to_string())),
        }
    }
}

//--------------------------------------       Actor        ----------------------------------------------------------
/// The authenticated identity performing an operation. Always derived from the validated session (JWT claims or the
/// websocket handshake), never from fields in a request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.role, self.id)
    }
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------
/// The order lifecycle. Orders progress monotonically along
/// `pending → confirmed → dispatched → delivered`, and `cancelled` is reachable only from `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Newly placed, awaiting vendor confirmation.
    Pending,
    /// The vendor has accepted the order.
    Confirmed,
    /// The order has left the shop.
    Dispatched,
    /// The order reached the customer. Terminal.
    Delivered,
    /// The order was cancelled while still pending. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// The single legal forward step from this status, if any.
    pub fn next_step(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Dispatched),
            OrderStatus::Dispatched => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Whether `new` is one forward step from this status.
    pub fn is_forward_step_to(self, new: OrderStatus) -> bool {
        self.next_step() == Some(new)
    }

    /// Whether (self → new) is a legal lifecycle edge: the forward chain, or pending → cancelled.
    pub fn can_transition_to(self, new: OrderStatus) -> bool {
        self.is_forward_step_to(new) || (self == OrderStatus::Pending && new == OrderStatus::Cancelled)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Dispatched => write!(f, "dispatched"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "dispatched" => Ok(Self::Dispatched),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError("order status", s.to_string())),
        }
    }
}

//--------------------------------------    PaymentMethod    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Cash,
    Card,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Upi => write!(f, "upi"),
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upi" => Ok(Self::Upi),
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            s => Err(ConversionError("payment method", s.to_string())),
        }
    }
}

//--------------------------------------        User        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub language: Option<String>,
}

//--------------------------------------  CustomerProfile  -----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: i64,
    pub user_id: i64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// All-optional payload for creating or updating a customer profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

//--------------------------------------      Category      ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub name_hi: String,
    pub icon: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub name_hi: String,
    pub icon: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub name_hi: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CategoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.name_hi.is_none() && self.icon.is_none() && self.color.is_none()
    }
}

//--------------------------------------        Shop        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: i64,
    pub vendor_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub is_approved: bool,
    pub is_open: bool,
    pub delivery_available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShop {
    /// Set from the authenticated actor, never from the request body.
    #[serde(skip)]
    pub vendor_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    #[serde(default = "default_true")]
    pub delivery_available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn default_true() -> bool {
    true
}

/// Optional-field update payload. `is_approved` is admin-only; the shop API strips it for other callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub is_approved: Option<bool>,
    pub is_open: Option<bool>,
    pub delivery_available: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ShopUpdate {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.is_approved.is_none()
            && self.is_open.is_none()
            && self.delivery_available.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub shop_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub mrp: Paise,
    pub selling_price: Paise,
    pub stock: i64,
    pub unit: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub mrp: Paise,
    pub selling_price: Paise,
    #[serde(default)]
    pub stock: i64,
    pub unit: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub mrp: Option<Paise>,
    pub selling_price: Option<Paise>,
    pub stock: Option<i64>,
    pub unit: Option<String>,
    pub is_available: Option<bool>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.mrp.is_none()
            && self.selling_price.is_none()
            && self.stock.is_none()
            && self.unit.is_none()
            && self.is_available.is_none()
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// Immutable once created.
    pub customer_id: i64,
    /// Immutable once created.
    pub shop_id: i64,
    pub status: OrderStatus,
    /// Fixed at creation: Σ item.price × item.quantity, computed server-side.
    pub total_amount: Paise,
    pub payment_method: PaymentMethod,
    pub payment_status: bool,
    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
/// An order submission. `total_amount` is the client's claim and is verified against the server-side price snapshot
/// before anything is persisted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub shop_id: i64,
    pub total_amount: Paise,
    pub payment_method: PaymentMethod,
    pub payment_status: bool,
    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
}

/// A line item with its unit price snapshotted from the product store at order time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: Paise,
}

impl PricedItem {
    pub fn line_total(&self) -> Paise {
        self.price * self.quantity
    }
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Price snapshot taken at order time. Never recomputed from the product store.
    pub price: Paise,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Review        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub customer_id: i64,
    pub shop_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub rating: i64,
    pub comment: Option<String>,
    pub order_id: Option<i64>,
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL_STATUSES: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Dispatched,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn forward_chain() {
        assert_eq!(OrderStatus::Pending.next_step(), Some(OrderStatus::Confirmed));
        assert_eq!(OrderStatus::Confirmed.next_step(), Some(OrderStatus::Dispatched));
        assert_eq!(OrderStatus::Dispatched.next_step(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next_step(), None);
        assert_eq!(OrderStatus::Cancelled.next_step(), None);
    }

    #[test]
    fn legal_edges_are_exactly_the_lifecycle_table() {
        use OrderStatus::*;
        let legal = [(Pending, Confirmed), (Confirmed, Dispatched), (Dispatched, Delivered), (Pending, Cancelled)];
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                let expected = legal.contains(&(from, to));
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn no_backward_or_skipping_edges() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(Dispatched));
        assert!(!Confirmed.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in ALL_STATUSES {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn roles_round_trip() {
        for role in [Role::Customer, Role::Vendor, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("superadmin".parse::<Role>().is_err());
    }

    #[test]
    fn priced_item_line_total() {
        let item = PricedItem { product_id: 1, quantity: 3, price: Paise::from(2500) };
        assert_eq!(item.line_total(), Paise::from(7500));
    }
}
