use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::{categories, db_url, new_pool, orders, products, reviews, shops, users, MIGRATOR};
use crate::{
    db_types::{
        Category,
        CategoryUpdate,
        CustomerProfile,
        NewCategory,
        NewOrder,
        NewProduct,
        NewReview,
        NewShop,
        NewUser,
        Order,
        OrderItem,
        OrderStatus,
        PricedItem,
        Product,
        ProductUpdate,
        ProfileUpdate,
        Review,
        Role,
        Shop,
        ShopUpdate,
        User,
    },
    traits::{
        CatalogManagement,
        OrderManagement,
        ReviewManagement,
        ShopManagement,
        StorageError,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment, or the default.
    pub async fn new(max_connections: u32) -> Result<Self, StorageError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        MIGRATOR.run(&pool).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl UserManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(user, &mut conn).await?;
        debug!("🗃️ New {} account #{} created", user.role, user.id);
        Ok(user)
    }

    async fn fetch_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user(id, &mut conn).await
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_email(email, &mut conn).await
    }

    async fn fetch_user_by_phone(&self, phone: &str) -> Result<Option<User>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_phone(phone, &mut conn).await
    }

    async fn fetch_users_by_role(&self, role: Role) -> Result<Vec<User>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_users_by_role(role, &mut conn).await
    }

    async fn fetch_customer_profile(&self, user_id: i64) -> Result<Option<CustomerProfile>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_profile(user_id, &mut conn).await
    }

    async fn upsert_customer_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<CustomerProfile, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::upsert_profile(user_id, update, &mut conn).await
    }
}

impl ShopManagement for SqliteDatabase {
    async fn create_shop(&self, shop: NewShop) -> Result<Shop, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let shop = shops::insert_shop(shop, &mut conn).await?;
        debug!("🗃️ Shop #{} ({}) registered for vendor #{}", shop.id, shop.name, shop.vendor_id);
        Ok(shop)
    }

    async fn fetch_shop(&self, id: i64) -> Result<Option<Shop>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        shops::fetch_shop(id, &mut conn).await
    }

    async fn fetch_all_shops(&self) -> Result<Vec<Shop>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        shops::fetch_all_shops(&mut conn).await
    }

    async fn fetch_approved_shops(&self) -> Result<Vec<Shop>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        shops::fetch_approved_shops(&mut conn).await
    }

    async fn fetch_shops_by_vendor(&self, vendor_id: i64) -> Result<Vec<Shop>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        shops::fetch_shops_by_vendor(vendor_id, &mut conn).await
    }

    async fn fetch_shops_by_category(&self, category_id: i64) -> Result<Vec<Shop>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        shops::fetch_shops_by_category(category_id, &mut conn).await
    }

    async fn update_shop(&self, id: i64, update: ShopUpdate) -> Result<Option<Shop>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        trace!("🗃️ Shop #{id} updating with new values: {update:?}");
        shops::update_shop(id, update, &mut conn).await
    }

    async fn delete_shop(&self, id: i64) -> Result<bool, StorageError> {
        let mut conn = self.pool.acquire().await?;
        shops::delete_shop(id, &mut conn).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        categories::fetch_categories(&mut conn).await
    }

    async fn fetch_category(&self, id: i64) -> Result<Option<Category>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        categories::fetch_category(id, &mut conn).await
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StorageError> {
        let mut conn = self.pool.acquire().await?;
        categories::insert_category(category, &mut conn).await
    }

    async fn update_category(&self, id: i64, update: CategoryUpdate) -> Result<Option<Category>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        categories::update_category(id, update, &mut conn).await
    }

    async fn delete_category(&self, id: i64) -> Result<bool, StorageError> {
        let mut conn = self.pool.acquire().await?;
        categories::delete_category(id, &mut conn).await
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn create_product(&self, shop_id: i64, product: NewProduct) -> Result<Product, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(shop_id, product, &mut conn).await?;
        debug!("🗃️ Product #{} ({}) added to shop #{shop_id}", product.id, product.name);
        Ok(product)
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product(id, &mut conn).await
    }

    async fn fetch_products_by_shop(&self, shop_id: i64) -> Result<Vec<Product>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_products_by_shop(shop_id, &mut conn).await
    }

    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Option<Product>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        products::update_product(id, update, &mut conn).await
    }

    async fn delete_product(&self, id: i64) -> Result<bool, StorageError> {
        let mut conn = self.pool.acquire().await?;
        products::delete_product(id, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    /// The order row and its item rows are written inside one transaction. A failure at any point rolls the whole
    /// submission back, so an order can never be observed with a partial item list.
    async fn create_order_with_items(
        &self,
        order: &NewOrder,
        items: &[PricedItem],
    ) -> Result<(Order, Vec<OrderItem>), StorageError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        let mut saved_items = Vec::with_capacity(items.len());
        for item in items {
            let item = orders::insert_order_item(order.id, item, &mut tx).await?;
            saved_items.push(item);
        }
        tx.commit().await?;
        debug!("🗃️ Order #{} saved with {} items for customer #{}", order.id, saved_items.len(), order.customer_id);
        Ok((order, saved_items))
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(id, &mut conn).await
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_items(order_id, &mut conn).await
    }

    async fn fetch_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_by_customer(customer_id, &mut conn).await
    }

    async fn fetch_orders_by_shops(&self, shop_ids: &[i64]) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_by_shops(shop_ids, &mut conn).await
    }

    async fn update_order_status(
        &self,
        id: i64,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(id, expected, new, &mut conn).await?;
        match &order {
            Some(o) => debug!("🗃️ Order #{id} is now {}", o.status),
            None => debug!("🗃️ Order #{id} was not {expected} any more; status left unchanged"),
        }
        Ok(order)
    }
}

impl ReviewManagement for SqliteDatabase {
    async fn create_review(&self, customer_id: i64, shop_id: i64, review: NewReview) -> Result<Review, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let review = reviews::insert_review(customer_id, shop_id, review, &mut conn).await?;
        debug!("🗃️ Review #{} ({}⭐) recorded for shop #{shop_id}", review.id, review.rating);
        Ok(review)
    }

    async fn fetch_reviews_by_shop(&self, shop_id: i64) -> Result<Vec<Review>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        reviews::fetch_reviews_by_shop(shop_id, &mut conn).await
    }
}
