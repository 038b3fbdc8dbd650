use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use shop_local_engine::{
    events::{EventHandlers, EventProducers},
    AccountApi,
    CatalogApi,
    OrderFlowApi,
    ReviewApi,
    ShopApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        AddProductRoute,
        AdminCustomerOrdersRoute,
        AdminCustomersRoute,
        AdminShopsRoute,
        ApproveShopRoute,
        AuthMeRoute,
        CategoriesRoute,
        CreateCategoryRoute,
        CreateOrderRoute,
        CreateReviewRoute,
        CreateShopRoute,
        CustomerOrdersRoute,
        CustomerProfileRoute,
        DeleteCategoryRoute,
        DeleteProductRoute,
        DeleteShopRoute,
        LoginRoute,
        RegisterRoute,
        ShopByIdRoute,
        ShopProductsRoute,
        ShopReviewsRoute,
        ShopsRoute,
        ToggleShopRoute,
        UpdateCategoryRoute,
        UpdateCustomerProfileRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
        UpdateShopRoute,
        VendorOrdersRoute,
        VendorShopsRoute,
    },
    ws::{event_hooks, websocket_entry, NotificationBroker},
};

const DB_POOL_CONNECTIONS: u32 = 25;
const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, DB_POOL_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let broker = NotificationBroker::new();
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, event_hooks(broker.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers, broker)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    broker: NotificationBroker,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let shops_api = ShopApi::new(db.clone(), producers.clone());
        let catalog_api = CatalogApi::new(db.clone(), producers.clone());
        let reviews_api = ReviewApi::new(db.clone(), producers.clone());
        let accounts_api = AccountApi::new(db.clone());
        let jwt_issuer = TokenIssuer::new(&config.auth);
        let api_scope = web::scope("/api")
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(AuthMeRoute::new())
            .service(CategoriesRoute::<SqliteDatabase>::new())
            .service(CreateCategoryRoute::<SqliteDatabase>::new())
            .service(UpdateCategoryRoute::<SqliteDatabase>::new())
            .service(DeleteCategoryRoute::<SqliteDatabase>::new())
            .service(ShopsRoute::<SqliteDatabase>::new())
            .service(CreateShopRoute::<SqliteDatabase>::new())
            .service(VendorShopsRoute::<SqliteDatabase>::new())
            .service(AdminShopsRoute::<SqliteDatabase>::new())
            .service(AdminCustomersRoute::<SqliteDatabase>::new())
            .service(AdminCustomerOrdersRoute::<SqliteDatabase>::new())
            .service(ApproveShopRoute::<SqliteDatabase>::new())
            .service(ShopProductsRoute::<SqliteDatabase>::new())
            .service(AddProductRoute::<SqliteDatabase>::new())
            .service(ShopReviewsRoute::<SqliteDatabase>::new())
            .service(CreateReviewRoute::<SqliteDatabase>::new())
            .service(ToggleShopRoute::<SqliteDatabase>::new())
            .service(ShopByIdRoute::<SqliteDatabase>::new())
            .service(UpdateShopRoute::<SqliteDatabase>::new())
            .service(DeleteShopRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(CustomerOrdersRoute::<SqliteDatabase>::new())
            .service(VendorOrdersRoute::<SqliteDatabase>::new())
            .service(CustomerProfileRoute::<SqliteDatabase>::new())
            .service(UpdateCustomerProfileRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sls::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(shops_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(reviews_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(jwt_issuer))
            .app_data(web::Data::new(broker.clone()))
            .service(health)
            .route("/ws", web::get().to(websocket_entry))
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
