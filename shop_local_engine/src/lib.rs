//! ShopLocal Engine
//!
//! The ShopLocal Engine is the core of a multi-tenant local-commerce marketplace: customers place orders at vendor
//! shops, vendors walk those orders through a fixed lifecycle, and every lifecycle change is announced to the
//! affected parties in real time. This library is transport-agnostic; the HTTP/WebSocket front end lives in the
//! `shop_local_server` crate.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@traits`] and the SQLite backend behind the `sqlite` feature). You should never need to touch
//!    the database directly; use the public APIs instead. The exception is the record types themselves, which are
//!    defined in [`mod@db_types`] and are public.
//! 2. The public API ([`mod@sle_api`]): order flow, shops, product catalogues, reviews and accounts. Each API is
//!    generic over the storage traits it needs, so backends and mocks slot in freely.
//! 3. The event system ([`mod@events`]). The APIs emit lifecycle events (a new order, a status change, a shop or
//!    product update, a review) through injected producers; subscribers hook in to fan them out to live clients.

pub mod cart;
pub mod db_types;
pub mod events;
pub mod helpers;
mod sle_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use sle_api::{
    account_api::AccountApi,
    catalog_api::CatalogApi,
    errors::{AccountApiError, CatalogApiError, OrderFlowError, ReviewApiError, ShopApiError},
    order_flow_api::OrderFlowApi,
    order_objects,
    review_api::ReviewApi,
    shop_api::ShopApi,
};
