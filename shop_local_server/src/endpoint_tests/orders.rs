use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::json;
use shop_local_engine::{
    db_types::{Order, OrderItem, OrderStatus, PaymentMethod, Product, Role, Shop, User},
    events::EventProducers,
    OrderFlowApi,
};
use sl_common::Paise;

use super::{
    helpers::{get_request, issue_token, post_request},
    mocks::MockCommerceDb,
};
use crate::routes::{CreateOrderRoute, CustomerOrdersRoute};

fn shop_record() -> Shop {
    Shop {
        id: 3,
        vendor_id: 7,
        category_id: 1,
        name: "Asha General Store".to_string(),
        description: None,
        address: "14 MG Road".to_string(),
        city: "Pune".to_string(),
        state: "MH".to_string(),
        postal_code: None,
        is_approved: true,
        is_open: true,
        delivery_available: true,
        latitude: None,
        longitude: None,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
    }
}

fn product_record() -> Product {
    Product {
        id: 1,
        shop_id: 3,
        name: "Toor Dal 1kg".to_string(),
        description: None,
        mrp: Paise::from(3000),
        selling_price: Paise::from(2500),
        stock: 50,
        unit: None,
        is_available: true,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
    }
}

fn order_record() -> Order {
    Order {
        id: 41,
        customer_id: 9,
        shop_id: 3,
        status: OrderStatus::Pending,
        total_amount: Paise::from(5000),
        payment_method: PaymentMethod::Upi,
        payment_status: false,
        delivery_address: None,
        delivery_latitude: None,
        delivery_longitude: None,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn item_record() -> OrderItem {
    OrderItem {
        id: 61,
        order_id: 41,
        product_id: 1,
        quantity: 2,
        price: Paise::from(2500),
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn customer_record() -> User {
    User {
        id: 9,
        name: "Ravi".to_string(),
        phone: None,
        email: Some("ravi@shoplocal.test".to_string()),
        password_hash: "irrelevant".to_string(),
        role: Role::Customer,
        language: "en".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    }
}

fn order_body() -> serde_json::Value {
    json!({
        "shopId": 3,
        "totalAmount": 5000,
        "paymentMethod": "upi",
        "paymentStatus": false,
        "items": [{"productId": 1, "quantity": 2}]
    })
}

fn register_api(cfg: &mut ServiceConfig, db: MockCommerceDb) {
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(CreateOrderRoute::<MockCommerceDb>::new())
        .service(CustomerOrdersRoute::<MockCommerceDb>::new())
        .app_data(web::Data::new(api));
}

fn configure_full_flow(cfg: &mut ServiceConfig) {
    let mut db = MockCommerceDb::new();
    db.expect_fetch_shop().returning(|_| Ok(Some(shop_record())));
    db.expect_fetch_product().returning(|_| Ok(Some(product_record())));
    db.expect_create_order_with_items().returning(|_, _| Ok((order_record(), vec![item_record()])));
    db.expect_fetch_user().returning(|_| Ok(Some(customer_record())));
    register_api(cfg, db);
}

/// No prices are read and nothing is written when the item list is empty; the bare mock has no expectations, so any
/// database call would panic the test.
fn configure_no_db_calls(cfg: &mut ServiceConfig) {
    register_api(cfg, MockCommerceDb::new());
}

fn configure_price_check_only(cfg: &mut ServiceConfig) {
    let mut db = MockCommerceDb::new();
    db.expect_fetch_shop().returning(|_| Ok(Some(shop_record())));
    db.expect_fetch_product().returning(|_| Ok(Some(product_record())));
    register_api(cfg, db);
}

fn configure_listing(cfg: &mut ServiceConfig) {
    let mut db = MockCommerceDb::new();
    db.expect_fetch_orders_by_customer().returning(|_| Ok(vec![order_record()]));
    db.expect_fetch_order_items().returning(|_| Ok(vec![item_record()]));
    register_api(cfg, db);
}

#[actix_web::test]
async fn create_order_without_token_is_unauthorized() {
    let _ = env_logger::try_init();
    let (status, body) = post_request("", "/orders", order_body(), configure_no_db_calls).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No access token was provided"), "unexpected body: {body}");
}

#[actix_web::test]
async fn create_order_as_vendor_is_forbidden() {
    let _ = env_logger::try_init();
    let token = issue_token(7, "Asha", Role::Vendor);
    let (status, body) = post_request(&token, "/orders", order_body(), configure_no_db_calls).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Access denied"), "unexpected body: {body}");
}

#[actix_web::test]
async fn create_order_succeeds_for_a_customer() {
    let _ = env_logger::try_init();
    let token = issue_token(9, "Ravi", Role::Customer);
    let (status, body) = post_request(&token, "/orders", order_body(), configure_full_flow).await;
    assert_eq!(status, StatusCode::CREATED);
    let response: serde_json::Value = serde_json::from_str(&body).expect("response must be JSON");
    assert_eq!(response["id"], 41);
    assert_eq!(response["status"], "pending");
    assert_eq!(response["totalAmount"], 5000);
    assert_eq!(response["items"][0]["productId"], 1);
    assert_eq!(response["items"][0]["quantity"], 2);
    assert_eq!(response["items"][0]["price"], 2500);
}

#[actix_web::test]
async fn create_order_with_no_items_is_rejected() {
    let _ = env_logger::try_init();
    let token = issue_token(9, "Ravi", Role::Customer);
    let mut body = order_body();
    body["items"] = json!([]);
    body["totalAmount"] = json!(0);
    let (status, body) = post_request(&token, "/orders", body, configure_no_db_calls).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("at least one item"), "unexpected body: {body}");
}

#[actix_web::test]
async fn create_order_with_tampered_total_is_rejected() {
    let _ = env_logger::try_init();
    let token = issue_token(9, "Ravi", Role::Customer);
    let mut body = order_body();
    body["totalAmount"] = json!(100);
    let (status, body) = post_request(&token, "/orders", body, configure_price_check_only).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("does not match the current prices"), "unexpected body: {body}");
}

#[actix_web::test]
async fn customer_orders_round_trip() {
    let _ = env_logger::try_init();
    let token = issue_token(9, "Ravi", Role::Customer);
    let (status, body) = get_request(&token, "/customer/orders", configure_listing).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn customer_orders_requires_the_customer_role() {
    let _ = env_logger::try_init();
    let token = issue_token(7, "Asha", Role::Vendor);
    let (status, _) = get_request(&token, "/customer/orders", configure_no_db_calls).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

const ORDERS_JSON: &str = r#"[{"id":41,"customerId":9,"shopId":3,"status":"pending","totalAmount":5000,"paymentMethod":"upi","paymentStatus":false,"deliveryAddress":null,"deliveryLatitude":null,"deliveryLongitude":null,"createdAt":"2024-02-29T13:30:00Z","updatedAt":"2024-02-29T13:30:00Z","items":[{"id":61,"orderId":41,"productId":1,"quantity":2,"price":2500,"createdAt":"2024-02-29T13:30:00Z"}]}]"#;
