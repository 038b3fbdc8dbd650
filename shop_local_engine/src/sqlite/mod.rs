pub mod db;

pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod shops;
pub mod users;

use std::{env, str::FromStr};

pub use db::SqliteDatabase;
use log::info;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::traits::StorageError;

pub static MIGRATOR: Migrator = sqlx::migrate!();

const SQLITE_DB_URL: &str = "sqlite://data/shop_local.db";

pub fn db_url() -> String {
    let result = env::var("SL_DATABASE_URL").unwrap_or_else(|_| {
        info!("SL_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(sqlx::Error::from)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Maps a driver error to [`StorageError::DuplicateRecord`] when it is a unique-constraint violation.
pub(crate) fn map_insert_error(e: sqlx::Error, what: &str) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::DuplicateRecord(what.to_string()),
        _ => StorageError::DriverError(e),
    }
}
