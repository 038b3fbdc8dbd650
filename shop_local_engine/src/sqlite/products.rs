use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    traits::StorageError,
};

pub async fn insert_product(
    shop_id: i64,
    product: NewProduct,
    conn: &mut SqliteConnection,
) -> Result<Product, StorageError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
            INSERT INTO products (shop_id, name, description, mrp, selling_price, stock, unit, is_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(shop_id)
    .bind(product.name)
    .bind(product.description)
    .bind(product.mrp)
    .bind(product.selling_price)
    .bind(product.stock)
    .bind(product.unit)
    .bind(product.is_available)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, StorageError> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_products_by_shop(shop_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Product>, StorageError> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE shop_id = $1 ORDER BY id ASC")
        .bind(shop_id)
        .fetch_all(conn)
        .await?;
    Ok(products)
}

pub async fn update_product(
    id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, StorageError> {
    if update.is_empty() {
        return fetch_product(id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE products SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(mrp) = update.mrp {
        set_clause.push("mrp = ");
        set_clause.push_bind_unseparated(mrp);
    }
    if let Some(selling_price) = update.selling_price {
        set_clause.push("selling_price = ");
        set_clause.push_bind_unseparated(selling_price);
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
    }
    if let Some(unit) = update.unit {
        set_clause.push("unit = ");
        set_clause.push_bind_unseparated(unit);
    }
    if let Some(is_available) = update.is_available {
        set_clause.push("is_available = ");
        set_clause.push_bind_unseparated(is_available);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    Ok(product)
}

pub async fn delete_product(id: i64, conn: &mut SqliteConnection) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
