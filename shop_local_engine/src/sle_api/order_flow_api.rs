use std::fmt::Debug;

use log::*;
use sl_common::Paise;

use crate::{
    db_types::{Actor, NewOrder, Order, OrderStatus, PricedItem, Role},
    events::{CustomerSummary, EventProducers, NewOrderEvent, OrderStatusEvent},
    sle_api::{errors::OrderFlowError, order_objects::OrderWithItems},
    traits::{CatalogManagement, OrderManagement, ShopManagement, UserManagement},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: placing orders, walking them through the status state
/// machine, and notifying the affected parties.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement + CatalogManagement + ShopManagement + UserManagement
{
    /// Places a new order on behalf of `actor`.
    ///
    /// The unit price of every line item is snapshotted from the product store here, on the server. The submitted
    /// `total_amount` is only a claim: if it does not equal the sum of the snapshot prices, the order is rejected and
    /// nothing is persisted. The order row and its items are committed in a single transaction.
    ///
    /// On success the shop's vendor is notified on their private channel with a `new-order` event.
    pub async fn place_order(&self, actor: &Actor, mut order: NewOrder) -> Result<OrderWithItems, OrderFlowError> {
        // The owner of a new order is always the caller, regardless of what the payload said.
        order.customer_id = actor.id;
        if order.items.is_empty() {
            return Err(OrderFlowError::EmptyOrder);
        }
        if order.items.iter().any(|i| i.quantity < 1) {
            return Err(OrderFlowError::InvalidQuantity);
        }
        let shop = self
            .db
            .fetch_shop(order.shop_id)
            .await?
            .ok_or(OrderFlowError::ShopNotFound(order.shop_id))?;
        let mut priced = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let product = self
                .db
                .fetch_product(item.product_id)
                .await?
                .ok_or(OrderFlowError::ProductNotFound(item.product_id))?;
            if product.shop_id != shop.id {
                return Err(OrderFlowError::ProductNotInShop { product_id: product.id, shop_id: shop.id });
            }
            priced.push(PricedItem {
                product_id: product.id,
                quantity: item.quantity,
                price: product.selling_price,
            });
        }
        let computed = priced.iter().map(PricedItem::line_total).sum::<Paise>();
        if computed != order.total_amount {
            debug!(
                "🔄️📦️ Rejecting order from {actor}: claimed total {} but current prices sum to {computed}",
                order.total_amount
            );
            return Err(OrderFlowError::TotalMismatch { claimed: order.total_amount, computed });
        }
        let (order, items) = self.db.create_order_with_items(&order, &priced).await?;
        info!("🔄️📦️ Order #{} placed by {actor} at shop #{} for {}", order.id, shop.id, order.total_amount);
        let customer = match self.db.fetch_user(order.customer_id).await? {
            Some(user) => CustomerSummary { id: user.id, name: user.name },
            None => CustomerSummary { id: order.customer_id, name: String::new() },
        };
        let event = NewOrderEvent { vendor_id: shop.vendor_id, order: order.clone(), items: items.clone(), customer };
        self.call_new_order_hook(event).await;
        Ok(OrderWithItems::new(order, items))
    }

    /// Moves an order to `new_status`, enforcing the lifecycle state machine and the per-role authority table:
    ///
    /// | actor    | allowed transition                                           |
    /// |----------|--------------------------------------------------------------|
    /// | customer | `pending → cancelled`, only on their own order               |
    /// | vendor   | exactly one forward step, only on their own shop's orders    |
    /// | admin    | any transition                                               |
    ///
    /// The write is a compare-and-swap against the status that was read during validation, so two racing transitions
    /// cannot both succeed; the loser gets [`OrderFlowError::ConcurrentUpdate`].
    ///
    /// On success the order's customer is notified on their private channel with an `order-status-update` event. The
    /// channel is addressed from the stored order row, never from caller-supplied data.
    pub async fn update_status(
        &self,
        actor: &Actor,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<OrderWithItems, OrderFlowError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        let shop =
            self.db.fetch_shop(order.shop_id).await?.ok_or(OrderFlowError::ShopNotFound(order.shop_id))?;
        check_transition(actor, &order, shop.vendor_id, new_status)?;
        let updated = self
            .db
            .update_order_status(order_id, order.status, new_status)
            .await?
            .ok_or(OrderFlowError::ConcurrentUpdate(order_id))?;
        info!("🔄️📦️ Order #{order_id} moved from {} to {} by {actor}", order.status, updated.status);
        let event = OrderStatusEvent {
            customer_id: updated.customer_id,
            order_id: updated.id,
            status: updated.status,
        };
        self.call_order_status_hook(event).await;
        let items = self.db.fetch_order_items(order_id).await?;
        Ok(OrderWithItems::new(updated, items))
    }

    /// All orders placed by a customer, newest first, each with its items.
    pub async fn orders_for_customer(&self, customer_id: i64) -> Result<Vec<OrderWithItems>, OrderFlowError> {
        let orders = self.db.fetch_orders_by_customer(customer_id).await?;
        self.attach_items(orders).await
    }

    /// All orders across every shop the vendor owns, newest first, each with its items.
    pub async fn orders_for_vendor(&self, vendor_id: i64) -> Result<Vec<OrderWithItems>, OrderFlowError> {
        let shops = self.db.fetch_shops_by_vendor(vendor_id).await?;
        let shop_ids = shops.iter().map(|s| s.id).collect::<Vec<i64>>();
        let orders = self.db.fetch_orders_by_shops(&shop_ids).await?;
        self.attach_items(orders).await
    }

    async fn attach_items(&self, orders: Vec<Order>) -> Result<Vec<OrderWithItems>, OrderFlowError> {
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.fetch_order_items(order.id).await?;
            result.push(OrderWithItems::new(order, items));
        }
        Ok(result)
    }

    async fn call_new_order_hook(&self, event: NewOrderEvent) {
        for emitter in &self.producers.new_order_producer {
            trace!("🔄️📦️ Notifying new-order hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    async fn call_order_status_hook(&self, event: OrderStatusEvent) {
        for emitter in &self.producers.order_status_producer {
            trace!("🔄️📦️ Notifying order-status hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

/// The authority table for status transitions. Admins may set any status from any status; vendors advance their own
/// shop's orders one step at a time; customers may only cancel their own still-pending orders.
fn check_transition(
    actor: &Actor,
    order: &Order,
    shop_vendor_id: i64,
    new_status: OrderStatus,
) -> Result<(), OrderFlowError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Customer => {
            if order.customer_id != actor.id {
                return Err(OrderFlowError::NotOrderOwner);
            }
            if new_status != OrderStatus::Cancelled {
                return Err(OrderFlowError::RoleNotAllowed(Role::Customer));
            }
            if order.status != OrderStatus::Pending {
                return Err(OrderFlowError::CancelNotPending);
            }
            Ok(())
        },
        Role::Vendor => {
            if shop_vendor_id != actor.id {
                return Err(OrderFlowError::NotShopOwner);
            }
            if !order.status.is_forward_step_to(new_status) {
                return Err(OrderFlowError::InvalidTransition { from: order.status, to: new_status });
            }
            Ok(())
        },
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use sl_common::Paise;

    use super::*;
    use crate::db_types::PaymentMethod;

    fn order_with_status(status: OrderStatus) -> Order {
        Order {
            id: 1,
            customer_id: 9,
            shop_id: 3,
            status,
            total_amount: Paise::from(5000),
            payment_method: PaymentMethod::Upi,
            payment_status: false,
            delivery_address: None,
            delivery_latitude: None,
            delivery_longitude: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    const VENDOR: Actor = Actor { id: 7, role: Role::Vendor };
    const CUSTOMER: Actor = Actor { id: 9, role: Role::Customer };
    const ADMIN: Actor = Actor { id: 1, role: Role::Admin };

    #[test]
    fn vendor_advances_one_step_only() {
        let order = order_with_status(OrderStatus::Pending);
        assert!(check_transition(&VENDOR, &order, 7, OrderStatus::Confirmed).is_ok());
        assert!(matches!(
            check_transition(&VENDOR, &order, 7, OrderStatus::Delivered),
            Err(OrderFlowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            check_transition(&VENDOR, &order, 7, OrderStatus::Cancelled),
            Err(OrderFlowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn vendor_must_own_the_shop() {
        let order = order_with_status(OrderStatus::Pending);
        assert!(matches!(
            check_transition(&VENDOR, &order, 8, OrderStatus::Confirmed),
            Err(OrderFlowError::NotShopOwner)
        ));
    }

    #[test]
    fn customer_cancels_own_pending_order() {
        let order = order_with_status(OrderStatus::Pending);
        assert!(check_transition(&CUSTOMER, &order, 7, OrderStatus::Cancelled).is_ok());
    }

    #[test]
    fn customer_cannot_cancel_confirmed_order() {
        let order = order_with_status(OrderStatus::Confirmed);
        assert!(matches!(
            check_transition(&CUSTOMER, &order, 7, OrderStatus::Cancelled),
            Err(OrderFlowError::CancelNotPending)
        ));
    }

    #[test]
    fn customer_cannot_advance_status() {
        let order = order_with_status(OrderStatus::Pending);
        assert!(matches!(
            check_transition(&CUSTOMER, &order, 7, OrderStatus::Confirmed),
            Err(OrderFlowError::RoleNotAllowed(Role::Customer))
        ));
    }

    #[test]
    fn customer_cannot_touch_someone_elses_order() {
        let order = order_with_status(OrderStatus::Pending);
        let stranger = Actor { id: 10, role: Role::Customer };
        assert!(matches!(
            check_transition(&stranger, &order, 7, OrderStatus::Cancelled),
            Err(OrderFlowError::NotOrderOwner)
        ));
    }

    #[test]
    fn admin_may_jump_states() {
        let order = order_with_status(OrderStatus::Pending);
        assert!(check_transition(&ADMIN, &order, 7, OrderStatus::Delivered).is_ok());
        let order = order_with_status(OrderStatus::Delivered);
        assert!(check_transition(&ADMIN, &order, 7, OrderStatus::Pending).is_ok());
    }
}
