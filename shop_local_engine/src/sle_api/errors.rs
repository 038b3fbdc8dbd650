use sl_common::Paise;
use thiserror::Error;

use crate::{
    db_types::{OrderStatus, Role},
    traits::StorageError,
};

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] StorageError),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Shop #{0} does not exist")]
    ShopNotFound(i64),
    #[error("Product #{0} does not exist")]
    ProductNotFound(i64),
    #[error("Product #{product_id} does not belong to shop #{shop_id}")]
    ProductNotInShop { product_id: i64, shop_id: i64 },
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("Item quantities must be at least 1")]
    InvalidQuantity,
    #[error("Claimed order total {claimed} does not match the current prices, which total {computed}")]
    TotalMismatch { claimed: Paise, computed: Paise },
    #[error("A {0} may not perform this operation on the order")]
    RoleNotAllowed(Role),
    #[error("Only the order's owner may do this")]
    NotOrderOwner,
    #[error("Only the owner of the shop may do this")]
    NotShopOwner,
    #[error("Customers can only cancel orders that are still pending")]
    CancelNotPending,
    #[error("Order status cannot change from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order #{0} was modified concurrently; re-fetch and try again")]
    ConcurrentUpdate(i64),
}

#[derive(Debug, Error)]
pub enum ShopApiError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] StorageError),
    #[error("Shop #{0} does not exist")]
    ShopNotFound(i64),
    #[error("Category #{0} does not exist")]
    CategoryNotFound(i64),
    #[error("Shop #{0} is not available")]
    ShopNotVisible(i64),
    #[error("Only the owner of the shop may do this")]
    NotShopOwner,
}

#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] StorageError),
    #[error("Shop #{0} does not exist")]
    ShopNotFound(i64),
    #[error("Product #{0} does not exist")]
    ProductNotFound(i64),
    #[error("Only the owner of the shop may do this")]
    NotShopOwner,
}

#[derive(Debug, Error)]
pub enum ReviewApiError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] StorageError),
    #[error("Shop #{0} does not exist")]
    ShopNotFound(i64),
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),
    #[error("The linked order does not belong to this customer and shop")]
    OrderMismatch,
    #[error("Orders can only be reviewed once they are delivered")]
    OrderNotDelivered,
}

#[derive(Debug, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] StorageError),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("An account with that email or phone already exists")]
    DuplicateAccount,
}
