use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewShop, Shop, ShopUpdate},
    traits::StorageError,
};

pub async fn insert_shop(shop: NewShop, conn: &mut SqliteConnection) -> Result<Shop, StorageError> {
    let shop = sqlx::query_as::<_, Shop>(
        r#"
            INSERT INTO shops (
                vendor_id,
                category_id,
                name,
                description,
                address,
                city,
                state,
                postal_code,
                delivery_available,
                latitude,
                longitude
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *;
        "#,
    )
    .bind(shop.vendor_id)
    .bind(shop.category_id)
    .bind(shop.name)
    .bind(shop.description)
    .bind(shop.address)
    .bind(shop.city)
    .bind(shop.state)
    .bind(shop.postal_code)
    .bind(shop.delivery_available)
    .bind(shop.latitude)
    .bind(shop.longitude)
    .fetch_one(conn)
    .await?;
    Ok(shop)
}

pub async fn fetch_shop(id: i64, conn: &mut SqliteConnection) -> Result<Option<Shop>, StorageError> {
    let shop = sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(shop)
}

pub async fn fetch_all_shops(conn: &mut SqliteConnection) -> Result<Vec<Shop>, StorageError> {
    let shops = sqlx::query_as::<_, Shop>("SELECT * FROM shops ORDER BY id ASC").fetch_all(conn).await?;
    Ok(shops)
}

pub async fn fetch_approved_shops(conn: &mut SqliteConnection) -> Result<Vec<Shop>, StorageError> {
    let shops = sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE is_approved = 1 ORDER BY id ASC")
        .fetch_all(conn)
        .await?;
    Ok(shops)
}

pub async fn fetch_shops_by_vendor(vendor_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Shop>, StorageError> {
    let shops = sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE vendor_id = $1 ORDER BY id ASC")
        .bind(vendor_id)
        .fetch_all(conn)
        .await?;
    Ok(shops)
}

pub async fn fetch_shops_by_category(
    category_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Shop>, StorageError> {
    let shops =
        sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE category_id = $1 AND is_approved = 1 ORDER BY id ASC")
            .bind(category_id)
            .fetch_all(conn)
            .await?;
    Ok(shops)
}

pub async fn update_shop(
    id: i64,
    update: ShopUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Shop>, StorageError> {
    if update.is_empty() {
        return fetch_shop(id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE shops SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(category_id) = update.category_id {
        set_clause.push("category_id = ");
        set_clause.push_bind_unseparated(category_id);
    }
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(address) = update.address {
        set_clause.push("address = ");
        set_clause.push_bind_unseparated(address);
    }
    if let Some(city) = update.city {
        set_clause.push("city = ");
        set_clause.push_bind_unseparated(city);
    }
    if let Some(state) = update.state {
        set_clause.push("state = ");
        set_clause.push_bind_unseparated(state);
    }
    if let Some(postal_code) = update.postal_code {
        set_clause.push("postal_code = ");
        set_clause.push_bind_unseparated(postal_code);
    }
    if let Some(is_approved) = update.is_approved {
        set_clause.push("is_approved = ");
        set_clause.push_bind_unseparated(is_approved);
    }
    if let Some(is_open) = update.is_open {
        set_clause.push("is_open = ");
        set_clause.push_bind_unseparated(is_open);
    }
    if let Some(delivery_available) = update.delivery_available {
        set_clause.push("delivery_available = ");
        set_clause.push_bind_unseparated(delivery_available);
    }
    if let Some(latitude) = update.latitude {
        set_clause.push("latitude = ");
        set_clause.push_bind_unseparated(latitude);
    }
    if let Some(longitude) = update.longitude {
        set_clause.push("longitude = ");
        set_clause.push_bind_unseparated(longitude);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let shop = builder.build_query_as::<Shop>().fetch_optional(conn).await?;
    Ok(shop)
}

pub async fn delete_shop(id: i64, conn: &mut SqliteConnection) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM shops WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
