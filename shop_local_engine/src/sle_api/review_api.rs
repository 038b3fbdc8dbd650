use log::*;

use crate::{
    db_types::{Actor, NewReview, OrderStatus, Review},
    events::{EventProducers, NewReviewEvent},
    sle_api::errors::ReviewApiError,
    traits::{OrderManagement, ReviewManagement, ShopManagement},
};

/// API for customer reviews of shops. A review may optionally reference the order it is based on; such a reference
/// is only accepted when the order belongs to the reviewer and the shop and has been delivered.
pub struct ReviewApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> ReviewApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ReviewApi<B>
where B: ReviewManagement + ShopManagement + OrderManagement
{
    pub async fn reviews_for_shop(&self, shop_id: i64) -> Result<Vec<Review>, ReviewApiError> {
        self.db.fetch_shop(shop_id).await?.ok_or(ReviewApiError::ShopNotFound(shop_id))?;
        Ok(self.db.fetch_reviews_by_shop(shop_id).await?)
    }

    pub async fn submit_review(
        &self,
        actor: &Actor,
        shop_id: i64,
        review: NewReview,
    ) -> Result<Review, ReviewApiError> {
        let shop = self.db.fetch_shop(shop_id).await?.ok_or(ReviewApiError::ShopNotFound(shop_id))?;
        if !(1..=5).contains(&review.rating) {
            return Err(ReviewApiError::InvalidRating(review.rating));
        }
        if let Some(order_id) = review.order_id {
            let order = self.db.fetch_order(order_id).await?.ok_or(ReviewApiError::OrderMismatch)?;
            if order.customer_id != actor.id || order.shop_id != shop_id {
                return Err(ReviewApiError::OrderMismatch);
            }
            if order.status != OrderStatus::Delivered {
                return Err(ReviewApiError::OrderNotDelivered);
            }
        }
        let review = self.db.create_review(actor.id, shop_id, review).await?;
        info!("⭐️ Review #{} ({}⭐) left on shop #{shop_id} by {actor}", review.id, review.rating);
        let event = NewReviewEvent { vendor_id: shop.vendor_id, review: review.clone() };
        self.call_new_review_hook(event).await;
        Ok(review)
    }

    async fn call_new_review_hook(&self, event: NewReviewEvent) {
        for emitter in &self.producers.new_review_producer {
            trace!("⭐️ Notifying new-review hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
