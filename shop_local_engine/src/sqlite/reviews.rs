use sqlx::SqliteConnection;

use crate::{
    db_types::{NewReview, Review},
    traits::StorageError,
};

pub async fn insert_review(
    customer_id: i64,
    shop_id: i64,
    review: NewReview,
    conn: &mut SqliteConnection,
) -> Result<Review, StorageError> {
    let review = sqlx::query_as::<_, Review>(
        r#"
            INSERT INTO reviews (customer_id, shop_id, rating, comment, order_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(customer_id)
    .bind(shop_id)
    .bind(review.rating)
    .bind(review.comment)
    .bind(review.order_id)
    .fetch_one(conn)
    .await?;
    Ok(review)
}

pub async fn fetch_reviews_by_shop(shop_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Review>, StorageError> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE shop_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(shop_id)
    .fetch_all(conn)
    .await?;
    Ok(reviews)
}
