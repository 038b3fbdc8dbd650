//! End-to-end order lifecycle tests against an in-memory SQLite database, with event capture through the hook
//! system. These exercise the full flow: account and shop setup, order placement with server-side price snapshots,
//! the status state machine with its per-role authority rules, and the notifications both sides receive.
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

use shop_local_engine::{
    db_types::{
        Actor,
        NewCategory,
        NewOrder,
        NewOrderItem,
        NewProduct,
        NewReview,
        NewShop,
        NewUser,
        OrderStatus,
        PaymentMethod,
        Role,
        ShopUpdate,
    },
    events::{EventHandlers, EventHooks, NewOrderEvent, OrderStatusEvent},
    traits::OrderManagement,
    AccountApi,
    CatalogApi,
    OrderFlowApi,
    OrderFlowError,
    ReviewApi,
    ReviewApiError,
    ShopApi,
    SqliteDatabase,
};
use sl_common::Paise;

struct Harness {
    db: SqliteDatabase,
    orders: OrderFlowApi<SqliteDatabase>,
    shops: ShopApi<SqliteDatabase>,
    catalog: CatalogApi<SqliteDatabase>,
    reviews: ReviewApi<SqliteDatabase>,
    accounts: AccountApi<SqliteDatabase>,
    new_orders: Arc<Mutex<Vec<NewOrderEvent>>>,
    status_updates: Arc<Mutex<Vec<OrderStatusEvent>>>,
}

async fn harness() -> Harness {
    let _ = env_logger::try_init();
    let db = SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("in-memory db");
    let new_orders = Arc::new(Mutex::new(Vec::new()));
    let status_updates = Arc::new(Mutex::new(Vec::new()));
    let mut hooks = EventHooks::default();
    let captured = new_orders.clone();
    hooks.on_new_order(move |ev| {
        let captured = captured.clone();
        Box::pin(async move {
            captured.lock().unwrap().push(ev);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let captured = status_updates.clone();
    hooks.on_order_status(move |ev| {
        let captured = captured.clone();
        Box::pin(async move {
            captured.lock().unwrap().push(ev);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(16, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    Harness {
        orders: OrderFlowApi::new(db.clone(), producers.clone()),
        shops: ShopApi::new(db.clone(), producers.clone()),
        catalog: CatalogApi::new(db.clone(), producers.clone()),
        reviews: ReviewApi::new(db.clone(), producers),
        accounts: AccountApi::new(db.clone()),
        db,
        new_orders,
        status_updates,
    }
}

async fn wait_for_events<T>(events: &Arc<Mutex<Vec<T>>>, n: usize) {
    for _ in 0..100 {
        if events.lock().unwrap().len() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {n} events");
}

fn new_user(name: &str, email: &str, role: Role) -> NewUser {
    NewUser {
        name: name.to_string(),
        phone: None,
        email: Some(email.to_string()),
        password_hash: "not-a-real-hash".to_string(),
        role,
        language: None,
    }
}

/// Creates a vendor with one approved shop selling one product at ₹25.00, and a customer. Returns
/// (vendor, customer, shop_id, product_id).
async fn seed_marketplace(h: &Harness) -> (Actor, Actor, i64, i64) {
    let vendor = h.accounts.register(new_user("Asha", "asha@shoplocal.test", Role::Vendor)).await.unwrap();
    let customer = h.accounts.register(new_user("Ravi", "ravi@shoplocal.test", Role::Customer)).await.unwrap();
    let vendor = Actor::new(vendor.id, Role::Vendor);
    let customer = Actor::new(customer.id, Role::Customer);
    let category = h
        .shops
        .create_category(NewCategory {
            name: "Grocery".to_string(),
            name_hi: "किराना".to_string(),
            icon: "shopping-basket".to_string(),
            color: None,
        })
        .await
        .unwrap();
    let shop = h
        .shops
        .create_shop(&vendor, NewShop {
            vendor_id: 0,
            category_id: category.id,
            name: "Asha General Store".to_string(),
            description: None,
            address: "14 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: None,
            delivery_available: true,
            latitude: Some(18.52),
            longitude: Some(73.85),
        })
        .await
        .unwrap();
    h.shops.approve_shop(shop.id).await.unwrap();
    let product = h
        .catalog
        .add_product(&vendor, shop.id, NewProduct {
            name: "Toor Dal 1kg".to_string(),
            description: None,
            mrp: Paise::from(3000),
            selling_price: Paise::from(2500),
            stock: 50,
            unit: Some("kg".to_string()),
            is_available: true,
        })
        .await
        .unwrap();
    (vendor, customer, shop.id, product.id)
}

fn order_of(shop_id: i64, product_id: i64, quantity: i64, total: Paise) -> NewOrder {
    NewOrder {
        customer_id: 0,
        shop_id,
        total_amount: total,
        payment_method: PaymentMethod::Upi,
        payment_status: false,
        delivery_address: Some("5 FC Road".to_string()),
        delivery_latitude: None,
        delivery_longitude: None,
        items: vec![NewOrderItem { product_id, quantity }],
    }
}

#[tokio::test]
async fn place_order_then_vendor_confirms_and_both_sides_are_notified() {
    let h = harness().await;
    let (vendor, customer, shop_id, product_id) = seed_marketplace(&h).await;

    let placed = h
        .orders
        .place_order(&customer, order_of(shop_id, product_id, 2, Paise::from(5000)))
        .await
        .expect("order should be accepted");
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.total_amount, Paise::from(5000));
    assert_eq!(placed.order.customer_id, customer.id);
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].price, Paise::from(2500));

    wait_for_events(&h.new_orders, 1).await;
    {
        let events = h.new_orders.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].vendor_id, vendor.id);
        assert_eq!(events[0].order.id, placed.order.id);
        assert_eq!(events[0].customer.name, "Ravi");
    }

    let confirmed =
        h.orders.update_status(&vendor, placed.order.id, OrderStatus::Confirmed).await.expect("vendor confirm");
    assert_eq!(confirmed.order.status, OrderStatus::Confirmed);

    wait_for_events(&h.status_updates, 1).await;
    {
        let events = h.status_updates.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].customer_id, customer.id);
        assert_eq!(events[0].order_id, placed.order.id);
        assert_eq!(events[0].status, OrderStatus::Confirmed);
    }
}

#[tokio::test]
async fn orders_round_trip_with_snapshot_prices() {
    let h = harness().await;
    let (_, customer, shop_id, product_id) = seed_marketplace(&h).await;
    let placed =
        h.orders.place_order(&customer, order_of(shop_id, product_id, 2, Paise::from(5000))).await.unwrap();

    let listed = h.orders.orders_for_customer(customer.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].order.id, placed.order.id);
    assert_eq!(listed[0].items.len(), 1);
    assert_eq!(listed[0].items[0].product_id, product_id);
    assert_eq!(listed[0].items[0].quantity, 2);
    assert_eq!(listed[0].items[0].price, Paise::from(2500));
}

#[tokio::test]
async fn empty_order_is_rejected_and_nothing_is_persisted() {
    let h = harness().await;
    let (_, customer, shop_id, _) = seed_marketplace(&h).await;
    let mut order = order_of(shop_id, 1, 1, Paise::from(0));
    order.items.clear();
    let err = h.orders.place_order(&customer, order).await.expect_err("empty order must fail");
    assert!(matches!(err, OrderFlowError::EmptyOrder));
    assert!(h.orders.orders_for_customer(customer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn tampered_total_is_rejected() {
    let h = harness().await;
    let (_, customer, shop_id, product_id) = seed_marketplace(&h).await;
    // 2 × ₹25.00 claimed as ₹1.00
    let err = h
        .orders
        .place_order(&customer, order_of(shop_id, product_id, 2, Paise::from(100)))
        .await
        .expect_err("tampered total must fail");
    assert!(matches!(err, OrderFlowError::TotalMismatch { .. }));
    assert!(h.orders.orders_for_customer(customer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn products_from_another_shop_are_rejected() {
    let h = harness().await;
    let (vendor, customer, shop_id, _) = seed_marketplace(&h).await;
    // A second shop with its own product
    let other_shop = h
        .shops
        .create_shop(&vendor, NewShop {
            vendor_id: 0,
            category_id: 1,
            name: "Asha Annex".to_string(),
            description: None,
            address: "15 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: None,
            delivery_available: true,
            latitude: None,
            longitude: None,
        })
        .await
        .unwrap();
    let foreign_product = h
        .catalog
        .add_product(&vendor, other_shop.id, NewProduct {
            name: "Rice 5kg".to_string(),
            description: None,
            mrp: Paise::from(40000),
            selling_price: Paise::from(35000),
            stock: 10,
            unit: None,
            is_available: true,
        })
        .await
        .unwrap();
    let err = h
        .orders
        .place_order(&customer, order_of(shop_id, foreign_product.id, 1, Paise::from(35000)))
        .await
        .expect_err("foreign product must fail");
    assert!(matches!(err, OrderFlowError::ProductNotInShop { .. }));
}

#[tokio::test]
async fn customer_can_cancel_pending_but_not_confirmed() {
    let h = harness().await;
    let (vendor, customer, shop_id, product_id) = seed_marketplace(&h).await;
    let placed =
        h.orders.place_order(&customer, order_of(shop_id, product_id, 1, Paise::from(2500))).await.unwrap();

    // Cancel while pending: fine
    let cancelled = h.orders.update_status(&customer, placed.order.id, OrderStatus::Cancelled).await.unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

    // A second order, confirmed by the vendor, can no longer be cancelled by the customer
    let placed =
        h.orders.place_order(&customer, order_of(shop_id, product_id, 1, Paise::from(2500))).await.unwrap();
    h.orders.update_status(&vendor, placed.order.id, OrderStatus::Confirmed).await.unwrap();
    let err = h
        .orders
        .update_status(&customer, placed.order.id, OrderStatus::Cancelled)
        .await
        .expect_err("cancel after confirm must fail");
    assert!(matches!(err, OrderFlowError::CancelNotPending));
    let order = h.db.fetch_order(placed.order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed, "status must be unchanged after the rejected cancel");
}

#[tokio::test]
async fn vendor_cannot_skip_lifecycle_steps() {
    let h = harness().await;
    let (vendor, customer, shop_id, product_id) = seed_marketplace(&h).await;
    let placed =
        h.orders.place_order(&customer, order_of(shop_id, product_id, 1, Paise::from(2500))).await.unwrap();
    let err = h
        .orders
        .update_status(&vendor, placed.order.id, OrderStatus::Delivered)
        .await
        .expect_err("pending → delivered must fail for a vendor");
    assert!(matches!(err, OrderFlowError::InvalidTransition { .. }));
    let order = h.db.fetch_order(placed.order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    // The legal path works step by step
    h.orders.update_status(&vendor, placed.order.id, OrderStatus::Confirmed).await.unwrap();
    h.orders.update_status(&vendor, placed.order.id, OrderStatus::Dispatched).await.unwrap();
    let done = h.orders.update_status(&vendor, placed.order.id, OrderStatus::Delivered).await.unwrap();
    assert_eq!(done.order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn admin_override_jumps_straight_to_delivered() {
    let h = harness().await;
    let (_, customer, shop_id, product_id) = seed_marketplace(&h).await;
    let admin = Actor::new(
        h.accounts.register(new_user("Ops", "ops@shoplocal.test", Role::Admin)).await.unwrap().id,
        Role::Admin,
    );
    let placed =
        h.orders.place_order(&customer, order_of(shop_id, product_id, 1, Paise::from(2500))).await.unwrap();
    let delivered = h.orders.update_status(&admin, placed.order.id, OrderStatus::Delivered).await.unwrap();
    assert_eq!(delivered.order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn concurrent_status_updates_cannot_both_win() {
    let h = harness().await;
    let (_, customer, shop_id, product_id) = seed_marketplace(&h).await;
    let placed =
        h.orders.place_order(&customer, order_of(shop_id, product_id, 1, Paise::from(2500))).await.unwrap();

    // Both writers read status = pending. The first compare-and-swap wins, the second one's guard misses.
    let first = h.db.update_order_status(placed.order.id, OrderStatus::Pending, OrderStatus::Confirmed).await.unwrap();
    assert!(first.is_some());
    let second =
        h.db.update_order_status(placed.order.id, OrderStatus::Pending, OrderStatus::Cancelled).await.unwrap();
    assert!(second.is_none(), "the stale writer must not overwrite the first transition");
    let order = h.db.fetch_order(placed.order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn reviews_require_a_delivered_order_when_linked() {
    let h = harness().await;
    let (vendor, customer, shop_id, product_id) = seed_marketplace(&h).await;
    let placed =
        h.orders.place_order(&customer, order_of(shop_id, product_id, 1, Paise::from(2500))).await.unwrap();

    let review = NewReview { rating: 5, comment: Some("Great dal".to_string()), order_id: Some(placed.order.id) };
    let err = h.reviews.submit_review(&customer, shop_id, review.clone()).await.expect_err("not delivered yet");
    assert!(matches!(err, ReviewApiError::OrderNotDelivered));

    h.orders.update_status(&vendor, placed.order.id, OrderStatus::Confirmed).await.unwrap();
    h.orders.update_status(&vendor, placed.order.id, OrderStatus::Dispatched).await.unwrap();
    h.orders.update_status(&vendor, placed.order.id, OrderStatus::Delivered).await.unwrap();
    let saved = h.reviews.submit_review(&customer, shop_id, review).await.expect("review after delivery");
    assert_eq!(saved.rating, 5);
    assert_eq!(saved.order_id, Some(placed.order.id));
}

#[tokio::test]
async fn unapproved_shops_are_hidden_from_customers() {
    let h = harness().await;
    let (vendor, _, _, _) = seed_marketplace(&h).await;
    let hidden = h
        .shops
        .create_shop(&vendor, NewShop {
            vendor_id: 0,
            category_id: 1,
            name: "Not Yet Approved".to_string(),
            description: None,
            address: "1 Side Lane".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: None,
            delivery_available: true,
            latitude: None,
            longitude: None,
        })
        .await
        .unwrap();
    let listed = h.shops.approved_shops().await.unwrap();
    assert!(listed.iter().all(|s| s.id != hidden.id));
    // The owner still sees it
    assert!(h.shops.fetch_shop(Some(&vendor), hidden.id).await.is_ok());
    assert!(h.shops.fetch_shop(None, hidden.id).await.is_err());
}

#[tokio::test]
async fn nearby_query_filters_by_radius() {
    let h = harness().await;
    let (vendor, _, shop_id, _) = seed_marketplace(&h).await;
    // Move the seeded shop to a known spot and add a far-away one
    h.shops
        .update_shop(&vendor, shop_id, ShopUpdate { latitude: Some(18.52), longitude: Some(73.85), ..Default::default() })
        .await
        .unwrap();
    let far = h
        .shops
        .create_shop(&vendor, NewShop {
            vendor_id: 0,
            category_id: 1,
            name: "Mumbai Branch".to_string(),
            description: None,
            address: "9 Marine Drive".to_string(),
            city: "Mumbai".to_string(),
            state: "MH".to_string(),
            postal_code: None,
            delivery_available: true,
            latitude: Some(19.076),
            longitude: Some(72.8777),
        })
        .await
        .unwrap();
    h.shops.approve_shop(far.id).await.unwrap();

    let near = h.shops.nearby_shops(18.52, 73.85, 5.0).await.unwrap();
    assert!(near.iter().any(|s| s.id == shop_id));
    assert!(near.iter().all(|s| s.id != far.id));

    let wide = h.shops.nearby_shops(18.52, 73.85, 500.0).await.unwrap();
    assert!(wide.iter().any(|s| s.id == far.id));
}
