use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Category, CategoryUpdate, NewCategory},
    traits::StorageError,
};

pub async fn insert_category(category: NewCategory, conn: &mut SqliteConnection) -> Result<Category, StorageError> {
    let color = category.color.unwrap_or_else(|| "#FF5722".to_string());
    let category = sqlx::query_as::<_, Category>(
        r#"
            INSERT INTO categories (name, name_hi, icon, color)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(category.name)
    .bind(category.name_hi)
    .bind(category.icon)
    .bind(color)
    .fetch_one(conn)
    .await?;
    Ok(category)
}

pub async fn fetch_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, StorageError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id ASC").fetch_all(conn).await?;
    Ok(categories)
}

pub async fn fetch_category(id: i64, conn: &mut SqliteConnection) -> Result<Option<Category>, StorageError> {
    let category =
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(category)
}

pub async fn update_category(
    id: i64,
    update: CategoryUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Category>, StorageError> {
    if update.is_empty() {
        return fetch_category(id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE categories SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(name_hi) = update.name_hi {
        set_clause.push("name_hi = ");
        set_clause.push_bind_unseparated(name_hi);
    }
    if let Some(icon) = update.icon {
        set_clause.push("icon = ");
        set_clause.push_bind_unseparated(icon);
    }
    if let Some(color) = update.color {
        set_clause.push("color = ");
        set_clause.push_bind_unseparated(color);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    let category = builder.build_query_as::<Category>().fetch_optional(conn).await?;
    Ok(category)
}

pub async fn delete_category(id: i64, conn: &mut SqliteConnection) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
