use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderItem, OrderStatus, PricedItem},
    traits::StorageError,
};

/// Inserts the order row. Not atomic on its own; the caller wraps this and the item inserts in one transaction.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, StorageError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (
                customer_id,
                shop_id,
                total_amount,
                payment_method,
                payment_status,
                delivery_address,
                delivery_latitude,
                delivery_longitude
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(order.customer_id)
    .bind(order.shop_id)
    .bind(order.total_amount)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(order.delivery_address.as_deref())
    .bind(order.delivery_latitude)
    .bind(order.delivery_longitude)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn insert_order_item(
    order_id: i64,
    item: &PricedItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, StorageError> {
    let item = sqlx::query_as::<_, OrderItem>(
        r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, StorageError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, StorageError> {
    let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_orders_by_customer(
    customer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, StorageError> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(customer_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

pub async fn fetch_orders_by_shops(shop_ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<Order>, StorageError> {
    if shop_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM orders WHERE shop_id IN (");
    let mut in_clause = builder.separated(", ");
    for shop_id in shop_ids {
        in_clause.push_bind(*shop_id);
    }
    builder.push(") ORDER BY created_at DESC, id DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

/// Compare-and-swap status update. The guard on the current status means two racing transitions cannot both win:
/// the loser matches zero rows and gets `None` back.
pub async fn update_order_status(
    id: i64,
    expected: OrderStatus,
    new: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StorageError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(new)
    .bind(id)
    .bind(expected)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
