//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate
//! module. Keep this module neat and tidy 🙏
//!
//! Each route is declared with the `route!` macro, which generates an `HttpServiceFactory` for the handler and
//! wraps it in the ACL middleware when a `requires [...]` clause is present. An empty role list means "any
//! authenticated actor"; admin passes every role check.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use shop_local_engine::{
    db_types::{CategoryUpdate, NewCategory, NewProduct, NewReview, NewShop, NewUser, ProductUpdate, Role, ShopUpdate},
    traits::{CatalogManagement, OrderManagement, ReviewManagement, ShopManagement, UserManagement},
    AccountApi,
    CatalogApi,
    OrderFlowApi,
    ReviewApi,
    ShopApi,
};

use crate::{
    auth::{hash_password, verify_password, JwtClaims, TokenIssuer},
    data_objects::{
        AuthResponse,
        CreateOrderRequest,
        LoginRequest,
        RegisterRequest,
        ShopListQuery,
        ToggleShopRequest,
        UpdateStatusRequest,
    },
    errors::{AuthError, ServerError},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:expr),*]) => {
        paste::paste! { pub struct [<$name:camel Route>]; }
        paste::paste! {
            impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),*]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>); }
        paste::paste! {
            impl<A> [<$name:camel Route>]<A> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self(core::marker::PhantomData)
                }
            }
        }
        paste::paste! {
            impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
            where A: $($bounds +)+ 'static
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<A>);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:tt),+ requires [$($roles:expr),*]) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>); }
        paste::paste! {
            impl<A> [<$name:camel Route>]<A> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self(core::marker::PhantomData)
                }
            }
        }
        paste::paste! {
            impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
            where A: $($bounds +)+ 'static
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<A>)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),*]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/auth/register" impl UserManagement);
/// Creates a new account and immediately issues an access token for it. At least one of `email` and `phone` must be
/// supplied; the password is hashed with scrypt before it is stored.
pub async fn register<A: UserManagement>(
    body: web::Json<RegisterRequest>,
    api: web::Data<AccountApi<A>>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    if request.email.is_none() && request.phone.is_none() {
        return Err(ServerError::InvalidRequestBody("Either an email or a phone number is required".to_string()));
    }
    let password_hash = hash_password(&request.password)?;
    let user = api
        .register(NewUser {
            name: request.name,
            phone: request.phone,
            email: request.email,
            password_hash,
            role: request.role,
            language: request.language,
        })
        .await?;
    let token = issuer.issue_token(&user)?;
    Ok(HttpResponse::Created().json(AuthResponse { token, user }))
}

route!(login => Post "/auth/login" impl UserManagement);
/// Email + password login. Returns an access token and the user record. The same generic failure is returned for an
/// unknown email and a wrong password.
pub async fn login<A: UserManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AccountApi<A>>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { email, password } = body.into_inner();
    let user = api.user_by_email(&email).await?.ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(&password, &user.password_hash) {
        debug!("💻️ Failed login attempt for {email}");
        return Err(AuthError::InvalidCredentials.into());
    }
    let token = issuer.issue_token(&user)?;
    debug!("💻️ {} #{} logged in", user.role, user.id);
    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

route!(auth_me => Get "/auth/me" requires []);
/// Echoes the authenticated claims. Useful for clients to restore a session.
pub async fn auth_me(claims: JwtClaims) -> Result<HttpResponse, ServerError> {
    Ok(HttpResponse::Ok().json(claims))
}

//----------------------------------------------   Categories  ----------------------------------------------------
route!(categories => Get "/categories" impl ShopManagement);
pub async fn categories<A: ShopManagement>(api: web::Data<ShopApi<A>>) -> Result<HttpResponse, ServerError> {
    let categories = api.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

route!(create_category => Post "/categories" impl ShopManagement requires [Role::Admin]);
pub async fn create_category<A: ShopManagement>(
    body: web::Json<NewCategory>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let category = api.create_category(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(category))
}

route!(update_category => Put "/categories/{id}" impl ShopManagement requires [Role::Admin]);
pub async fn update_category<A: ShopManagement>(
    path: web::Path<i64>,
    body: web::Json<CategoryUpdate>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let category = api.update_category(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

route!(delete_category => Delete "/categories/{id}" impl ShopManagement requires [Role::Admin]);
pub async fn delete_category<A: ShopManagement>(
    path: web::Path<i64>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_category(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   Shops  ----------------------------------------------------
route!(shops => Get "/shops" impl ShopManagement);
/// The customer-facing shop listing. With `lat`, `lng` and `radius` it returns approved shops within the radius
/// (in km); with `categoryId` it returns the approved shops of that category; otherwise all approved shops.
pub async fn shops<A: ShopManagement>(
    query: web::Query<ShopListQuery>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    let shops = match (query.lat, query.lng, query.category_id) {
        (Some(lat), Some(lng), _) => {
            let radius = query.radius.unwrap_or(5.0);
            debug!("💻️ GET nearby shops at ({lat}, {lng}) within {radius}km");
            api.nearby_shops(lat, lng, radius).await?
        },
        (_, _, Some(category_id)) => {
            debug!("💻️ GET shops for category {category_id}");
            api.shops_by_category(category_id).await?
        },
        _ => {
            debug!("💻️ GET all approved shops");
            api.approved_shops().await?
        },
    };
    Ok(HttpResponse::Ok().json(shops))
}

route!(shop_by_id => Get "/shops/{id}" impl ShopManagement);
/// Fetch one shop. Unapproved shops are only visible to their owner and admins, so the claims are optional here and
/// passed through to the visibility check.
pub async fn shop_by_id<A: ShopManagement>(
    claims: Option<JwtClaims>,
    path: web::Path<i64>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let actor = claims.map(|c| c.actor());
    let shop = api.fetch_shop(actor.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(shop))
}

route!(create_shop => Post "/shops" impl ShopManagement requires [Role::Vendor]);
pub async fn create_shop<A: ShopManagement>(
    claims: JwtClaims,
    body: web::Json<NewShop>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new shop from {} #{}", claims.role, claims.sub);
    let shop = api.create_shop(&claims.actor(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(shop))
}

route!(update_shop => Put "/shops/{id}" impl ShopManagement requires []);
/// Update a shop. Any authenticated actor may call; ownership (or admin) is enforced in the API, and the
/// `isApproved` flag is stripped for non-admin callers there.
pub async fn update_shop<A: ShopManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<ShopUpdate>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let shop = api.update_shop(&claims.actor(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(shop))
}

route!(delete_shop => Delete "/shops/{id}" impl ShopManagement requires []);
pub async fn delete_shop<A: ShopManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_shop(&claims.actor(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

route!(toggle_shop => Post "/shops/{id}/toggle" impl ShopManagement requires [Role::Vendor]);
/// Open or close a shop. Customers see the change immediately via the `shop-toggled` broadcast.
pub async fn toggle_shop<A: ShopManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<ToggleShopRequest>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let shop = api.set_open(&claims.actor(), path.into_inner(), body.is_open).await?;
    Ok(HttpResponse::Ok().json(shop))
}

route!(vendor_shops => Get "/vendor/shops" impl ShopManagement requires [Role::Vendor]);
pub async fn vendor_shops<A: ShopManagement>(
    claims: JwtClaims,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET vendor shops for #{}", claims.sub);
    let shops = api.shops_for_vendor(claims.sub).await?;
    Ok(HttpResponse::Ok().json(shops))
}

route!(admin_shops => Get "/admin/shops" impl ShopManagement requires [Role::Admin]);
/// Every shop, including unapproved ones.
pub async fn admin_shops<A: ShopManagement>(api: web::Data<ShopApi<A>>) -> Result<HttpResponse, ServerError> {
    let shops = api.all_shops().await?;
    Ok(HttpResponse::Ok().json(shops))
}

route!(approve_shop => Post "/admin/shops/{id}/approve" impl ShopManagement requires [Role::Admin]);
pub async fn approve_shop<A: ShopManagement>(
    path: web::Path<i64>,
    api: web::Data<ShopApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let shop = api.approve_shop(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(shop))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(shop_products => Get "/shops/{shop_id}/products" impl CatalogManagement, ShopManagement);
pub async fn shop_products<A: CatalogManagement + ShopManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let products = api.products_for_shop(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(add_product => Post "/shops/{shop_id}/products" impl CatalogManagement, ShopManagement requires []);
pub async fn add_product<A: CatalogManagement + ShopManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let product = api.add_product(&claims.actor(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Put "/products/{id}" impl CatalogManagement, ShopManagement requires []);
pub async fn update_product<A: CatalogManagement + ShopManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let product = api.update_product(&claims.actor(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl CatalogManagement, ShopManagement requires []);
pub async fn delete_product<A: CatalogManagement + ShopManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_product(&claims.actor(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement, CatalogManagement, ShopManagement, UserManagement requires [Role::Customer]);
/// Place an order. Item prices are snapshotted server-side and the claimed total is verified against them; the
/// vendor is notified on their private channel once the order is committed.
pub async fn create_order<A>(
    claims: JwtClaims,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement + ShopManagement + UserManagement,
{
    debug!("💻️ POST new order from customer #{}", claims.sub);
    let order = api.place_order(&claims.actor(), body.into_inner().into_new_order()).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(update_order_status => Put "/orders/{id}/status" impl OrderManagement, CatalogManagement, ShopManagement, UserManagement requires []);
/// Move an order through its lifecycle. Role and ownership rules are enforced in the order flow API; the customer
/// whose order it is gets notified on their private channel. A legacy `customerId` body field is ignored.
pub async fn update_order_status<A>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement + ShopManagement + UserManagement,
{
    let order_id = path.into_inner();
    let new_status = body.into_inner().status;
    debug!("💻️ PUT order #{order_id} status to {new_status} by {} #{}", claims.role, claims.sub);
    let order = api.update_status(&claims.actor(), order_id, new_status).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(customer_orders => Get "/customer/orders" impl OrderManagement, CatalogManagement, ShopManagement, UserManagement requires [Role::Customer]);
pub async fn customer_orders<A>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement + ShopManagement + UserManagement,
{
    debug!("💻️ GET orders for customer #{}", claims.sub);
    let orders = api.orders_for_customer(claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(vendor_orders => Get "/vendor/orders" impl OrderManagement, CatalogManagement, ShopManagement, UserManagement requires [Role::Vendor]);
/// Orders across every shop the calling vendor owns.
pub async fn vendor_orders<A>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement + ShopManagement + UserManagement,
{
    debug!("💻️ GET orders for vendor #{}", claims.sub);
    let orders = api.orders_for_vendor(claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(admin_customers => Get "/admin/customers" impl UserManagement requires [Role::Admin]);
pub async fn admin_customers<A: UserManagement>(
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let customers = api.users_with_role(Role::Customer).await?;
    Ok(HttpResponse::Ok().json(customers))
}

route!(admin_customer_orders => Get "/admin/customers/{id}/orders" impl OrderManagement, CatalogManagement, ShopManagement, UserManagement requires [Role::Admin]);
pub async fn admin_customer_orders<A>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement + ShopManagement + UserManagement,
{
    let orders = api.orders_for_customer(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Reviews  ----------------------------------------------------
route!(shop_reviews => Get "/shops/{shop_id}/reviews" impl ReviewManagement, ShopManagement, OrderManagement);
pub async fn shop_reviews<A>(
    path: web::Path<i64>,
    api: web::Data<ReviewApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: ReviewManagement + ShopManagement + OrderManagement,
{
    let reviews = api.reviews_for_shop(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

route!(create_review => Post "/shops/{shop_id}/reviews" impl ReviewManagement, ShopManagement, OrderManagement requires [Role::Customer]);
/// Leave a review on a shop. When the review links an order, that order must belong to the reviewer and this shop
/// and must have been delivered. The vendor is notified on their private channel.
pub async fn create_review<A>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<NewReview>,
    api: web::Data<ReviewApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: ReviewManagement + ShopManagement + OrderManagement,
{
    let review = api.submit_review(&claims.actor(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(review))
}

//----------------------------------------------   Profile  ----------------------------------------------------
route!(customer_profile => Get "/customer/profile" impl UserManagement requires [Role::Customer]);
pub async fn customer_profile<A: UserManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    match api.profile(claims.sub).await? {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(ServerError::NoRecordFound("Profile not found".to_string())),
    }
}

route!(update_customer_profile => Put "/customer/profile" impl UserManagement requires [Role::Customer]);
/// Creates the profile on first write, updates it afterwards.
pub async fn update_customer_profile<A: UserManagement>(
    claims: JwtClaims,
    body: web::Json<shop_local_engine::db_types::ProfileUpdate>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let profile = api.update_profile(claims.sub, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}
