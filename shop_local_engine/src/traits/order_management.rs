use crate::{
    db_types::{NewOrder, Order, OrderItem, OrderStatus, PricedItem},
    traits::StorageError,
};

#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Persists the order row and one row per line item in a single atomic transaction. Either the order and all of
    /// its items exist afterwards, or none of them do.
    ///
    /// `items` carry the price snapshots taken by the caller; they are written as-is and never recomputed.
    async fn create_order_with_items(
        &self,
        order: &NewOrder,
        items: &[PricedItem],
    ) -> Result<(Order, Vec<OrderItem>), StorageError>;

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StorageError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StorageError>;

    async fn fetch_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>, StorageError>;

    /// Orders across a set of shops, newest first. Used for the vendor dashboard, which spans every shop the vendor
    /// owns.
    async fn fetch_orders_by_shops(&self, shop_ids: &[i64]) -> Result<Vec<Order>, StorageError>;

    /// Compare-and-swap status update: the row is only written if its status still equals `expected`. Returns the
    /// updated order, or `None` if the guard missed because a concurrent transition got there first.
    async fn update_order_status(
        &self,
        id: i64,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<Option<Order>, StorageError>;
}
