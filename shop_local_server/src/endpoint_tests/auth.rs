use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::json;
use shop_local_engine::{
    db_types::{Role, User},
    events::EventProducers,
    traits::StorageError,
    AccountApi,
    ShopApi,
};

use super::{
    helpers::{get_request, issue_token, post_request},
    mocks::MockCommerceDb,
};
use crate::{
    auth::hash_password,
    routes::{AuthMeRoute, LoginRoute, RegisterRoute, VendorShopsRoute},
};

fn user_with_password(password: &str) -> User {
    User {
        id: 9,
        name: "Ravi".to_string(),
        phone: None,
        email: Some("ravi@shoplocal.test".to_string()),
        password_hash: hash_password(password).unwrap(),
        role: Role::Customer,
        language: "en".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    }
}

fn register_accounts(cfg: &mut ServiceConfig, db: MockCommerceDb) {
    let api = AccountApi::new(db);
    cfg.service(RegisterRoute::<MockCommerceDb>::new())
        .service(LoginRoute::<MockCommerceDb>::new())
        .service(AuthMeRoute::new())
        .app_data(web::Data::new(api));
}

fn configure_login(cfg: &mut ServiceConfig) {
    let mut db = MockCommerceDb::new();
    db.expect_fetch_user_by_email().returning(|_| Ok(Some(user_with_password("hunter2"))));
    register_accounts(cfg, db);
}

fn configure_bare(cfg: &mut ServiceConfig) {
    register_accounts(cfg, MockCommerceDb::new());
}

fn configure_duplicate_register(cfg: &mut ServiceConfig) {
    let mut db = MockCommerceDb::new();
    db.expect_create_user()
        .returning(|_| Err(StorageError::DuplicateRecord("a user with that email already exists".to_string())));
    register_accounts(cfg, db);
}

fn configure_vendor_shops(cfg: &mut ServiceConfig) {
    let mut db = MockCommerceDb::new();
    db.expect_fetch_shops_by_vendor().returning(|_| Ok(vec![]));
    let api = ShopApi::new(db, EventProducers::default());
    cfg.service(VendorShopsRoute::<MockCommerceDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn login_with_the_right_password_issues_a_token() {
    let _ = env_logger::try_init();
    let body = json!({"email": "ravi@shoplocal.test", "password": "hunter2"});
    let (status, body) = post_request("", "/auth/login", body, configure_login).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(response["token"].as_str().map(|t| !t.is_empty()).unwrap_or(false));
    assert_eq!(response["user"]["id"], 9);
    assert!(response["user"].get("passwordHash").is_none(), "the password hash must never be serialized");
}

#[actix_web::test]
async fn login_with_the_wrong_password_is_rejected() {
    let _ = env_logger::try_init();
    let body = json!({"email": "ravi@shoplocal.test", "password": "hunter3"});
    let (status, body) = post_request("", "/auth/login", body, configure_login).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Invalid email or password"), "unexpected body: {body}");
}

#[actix_web::test]
async fn register_requires_email_or_phone() {
    let _ = env_logger::try_init();
    let body = json!({"name": "Ravi", "password": "hunter2", "role": "customer"});
    let (status, body) = post_request("", "/auth/register", body, configure_bare).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("email or a phone number"), "unexpected body: {body}");
}

#[actix_web::test]
async fn register_with_a_taken_email_conflicts() {
    let _ = env_logger::try_init();
    let body = json!({"name": "Ravi", "email": "ravi@shoplocal.test", "password": "hunter2", "role": "customer"});
    let (status, body) = post_request("", "/auth/register", body, configure_duplicate_register).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already exists"), "unexpected body: {body}");
}

#[actix_web::test]
async fn me_without_a_token_is_unauthorized() {
    let _ = env_logger::try_init();
    let (status, _) = get_request("", "/auth/me", configure_bare).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn me_returns_the_claims() {
    let _ = env_logger::try_init();
    let token = issue_token(9, "Ravi", Role::Customer);
    let (status, body) = get_request(&token, "/auth/me", configure_bare).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["sub"], 9);
    assert_eq!(response["role"], "customer");
}

#[actix_web::test]
async fn me_with_a_tampered_token_is_unauthorized() {
    let _ = env_logger::try_init();
    let mut token = issue_token(9, "Ravi", Role::Customer);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let (status, _) = get_request(&token, "/auth/me", configure_bare).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_passes_vendor_gates() {
    let _ = env_logger::try_init();
    let token = issue_token(1, "Ops", Role::Admin);
    let (status, body) = get_request(&token, "/vendor/shops", configure_vendor_shops).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn customers_do_not_pass_vendor_gates() {
    let _ = env_logger::try_init();
    let token = issue_token(9, "Ravi", Role::Customer);
    let (status, _) = get_request(&token, "/vendor/shops", configure_vendor_shops).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
