use crate::{
    db_types::{NewReview, Review},
    traits::StorageError,
};

#[allow(async_fn_in_trait)]
pub trait ReviewManagement {
    async fn create_review(&self, customer_id: i64, shop_id: i64, review: NewReview) -> Result<Review, StorageError>;

    async fn fetch_reviews_by_shop(&self, shop_id: i64) -> Result<Vec<Review>, StorageError>;
}
