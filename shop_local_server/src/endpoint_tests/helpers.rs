use actix_web::{body::to_bytes, dev::ServiceResponse, http::StatusCode, test, web, web::ServiceConfig, App, Error};
use chrono::Duration;
use shop_local_engine::db_types::Role;
use sl_common::Secret;

use crate::{auth::TokenIssuer, config::AuthConfig};

const TEST_SECRET: &str = "an-entirely-unremarkable-test-secret";

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(&AuthConfig {
        jwt_secret: Secret::new(TEST_SECRET.to_string()),
        token_lifetime: Duration::hours(1),
    })
}

pub fn issue_token(user_id: i64, name: &str, role: Role) -> String {
    let user = shop_local_engine::db_types::User {
        id: user_id,
        name: name.to_string(),
        phone: None,
        email: None,
        password_hash: String::new(),
        role,
        language: "en".to_string(),
        created_at: chrono::Utc::now(),
    };
    test_issuer().issue_token(&user).expect("could not issue test token")
}

pub async fn get_request(
    token: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let app =
        test::init_service(App::new().app_data(web::Data::new(test_issuer())).configure(configure)).await;
    let mut req = test::TestRequest::get().uri(path);
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    into_status_body(test::try_call_service(&app, req.to_request()).await).await
}

pub async fn post_request(
    token: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let app =
        test::init_service(App::new().app_data(web::Data::new(test_issuer())).configure(configure)).await;
    let mut req = test::TestRequest::post().uri(path).set_json(body);
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    into_status_body(test::try_call_service(&app, req.to_request()).await).await
}

/// Turn the outcome of a test service call into a `(status, body)` pair. A service-level error is converted
/// into its HTTP response exactly as the running server's protocol layer does, so tests observe the same
/// status and body a real client would. `test::call_service` instead panics on such errors.
async fn into_status_body<B>(res: Result<ServiceResponse<B>, Error>) -> (StatusCode, String)
where
    B: actix_web::body::MessageBody + 'static,
{
    let response = match res {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(e) => e.error_response().map_into_boxed_body(),
    };
    let status = response.status();
    let body = to_bytes(response.into_body()).await.unwrap_or_default();
    (status, String::from_utf8_lossy(&body).to_string())
}
