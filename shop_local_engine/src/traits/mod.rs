//! Storage traits for ShopLocal backends.
//!
//! A backend (e.g. [`crate::SqliteDatabase`]) implements one trait per concern. The public APIs in
//! [`crate::sle_api`] are generic over these traits, so tests can swap in mocks and alternative backends can be
//! added without touching the API layer.

mod catalog_management;
mod order_management;
mod review_management;
mod shop_management;
mod user_management;

pub use catalog_management::CatalogManagement;
pub use order_management::OrderManagement;
pub use review_management::ReviewManagement;
pub use shop_management::ShopManagement;
use thiserror::Error;
pub use user_management::UserManagement;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database driver error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Unique constraint violated: {0}")]
    DuplicateRecord(String),
    #[error("Database query error: {0}")]
    QueryError(String),
}
