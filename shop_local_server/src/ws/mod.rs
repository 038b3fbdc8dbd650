pub mod broker;
pub mod session;

use std::{future::Future, pin::Pin};

pub use broker::{NotificationBroker, Room};
use log::trace;
pub use session::websocket_entry;
use shop_local_engine::events::{EventHooks, ProductChange, ShopEvent};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Wires the engine's event hooks to the notification broker, implementing the event → channel map:
///
/// | event                                                   | channel                |
/// |---------------------------------------------------------|------------------------|
/// | shop-added / shop-updated / shop-deleted / shop-toggled | `customer`             |
/// | product-added / product-updated / product-deleted       | `shop-{shopId}`        |
/// | new-order                                               | `vendor-{vendorId}`    |
/// | order-status-update                                     | `customer-{customerId}`|
/// | new-review                                              | `vendor-{vendorId}`    |
pub fn event_hooks(broker: NotificationBroker) -> EventHooks {
    let mut hooks = EventHooks::default();
    let b = broker.clone();
    hooks.on_new_order(move |ev| {
        let b = b.clone();
        Box::pin(async move {
            trace!("📬️ Relaying new-order for order #{}", ev.order.id);
            b.emit(&Room::Vendor(ev.vendor_id), "new-order", &ev);
        }) as HookFuture
    });
    let b = broker.clone();
    hooks.on_order_status(move |ev| {
        let b = b.clone();
        Box::pin(async move {
            trace!("📬️ Relaying order-status-update for order #{}", ev.order_id);
            b.emit(&Room::Customer(ev.customer_id), "order-status-update", &ev);
        }) as HookFuture
    });
    let b = broker.clone();
    hooks.on_shop_event(move |ev| {
        let b = b.clone();
        Box::pin(async move {
            match &ev {
                ShopEvent::Added(shop) | ShopEvent::Updated(shop) | ShopEvent::Toggled(shop) => {
                    b.emit(&Room::Customers, ev.name(), shop)
                },
                ShopEvent::Deleted(id) => b.emit(&Room::Customers, ev.name(), &serde_json::json!({ "shopId": id })),
            }
        }) as HookFuture
    });
    let b = broker.clone();
    hooks.on_product_event(move |ev| {
        let b = b.clone();
        Box::pin(async move {
            let room = Room::Shop(ev.shop_id);
            match &ev.change {
                ProductChange::Added(product) | ProductChange::Updated(product) => {
                    b.emit(&room, ev.change.name(), product)
                },
                ProductChange::Deleted(id) => {
                    b.emit(&room, ev.change.name(), &serde_json::json!({ "productId": id }))
                },
            }
        }) as HookFuture
    });
    let b = broker;
    hooks.on_new_review(move |ev| {
        let b = b.clone();
        Box::pin(async move {
            trace!("📬️ Relaying new-review #{}", ev.review.id);
            b.emit(&Room::Vendor(ev.vendor_id), "new-review", &ev.review);
        }) as HookFuture
    });
    hooks
}

#[cfg(test)]
mod test {
    use shop_local_engine::events::{EventHandlers, OrderStatusEvent};
    use shop_local_engine::db_types::OrderStatus;

    use super::*;

    /// After a vendor confirms an order, exactly one order-status-update lands on the customer's private channel,
    /// and nobody else's.
    #[tokio::test]
    async fn order_status_update_reaches_the_right_customer_channel() {
        let broker = NotificationBroker::new();
        let (customer_conn, mut customer_rx) = broker.connect();
        broker.subscribe(customer_conn, &Room::Customer(9));
        let (other_conn, mut other_rx) = broker.connect();
        broker.subscribe(other_conn, &Room::Customer(10));

        let handlers = EventHandlers::new(8, event_hooks(broker.clone()));
        let producers = handlers.producers();
        handlers.start_handlers().await;

        let event = OrderStatusEvent { customer_id: 9, order_id: 41, status: OrderStatus::Confirmed };
        for producer in &producers.order_status_producer {
            producer.publish_event(event.clone()).await;
        }

        let msg = tokio::time::timeout(std::time::Duration::from_secs(2), customer_rx.recv())
            .await
            .expect("timed out waiting for the notification")
            .unwrap();
        assert_eq!(msg, r#"{"event":"order-status-update","data":{"orderId":41,"status":"confirmed"}}"#);
        assert!(customer_rx.try_recv().is_err(), "exactly one event expected");
        assert!(other_rx.try_recv().is_err(), "the event must not leak to other customers");
    }
}
