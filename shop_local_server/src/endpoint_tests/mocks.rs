use mockall::mock;
use shop_local_engine::{
    db_types::{
        Category,
        CategoryUpdate,
        CustomerProfile,
        NewCategory,
        NewOrder,
        NewProduct,
        NewShop,
        NewUser,
        Order,
        OrderItem,
        OrderStatus,
        PricedItem,
        Product,
        ProductUpdate,
        ProfileUpdate,
        Role,
        Shop,
        ShopUpdate,
        User,
    },
    traits::{CatalogManagement, OrderManagement, ShopManagement, StorageError, UserManagement},
};

mock! {
    pub CommerceDb {}

    impl UserManagement for CommerceDb {
        async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;
        async fn fetch_user(&self, id: i64) -> Result<Option<User>, StorageError>;
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;
        async fn fetch_user_by_phone(&self, phone: &str) -> Result<Option<User>, StorageError>;
        async fn fetch_users_by_role(&self, role: Role) -> Result<Vec<User>, StorageError>;
        async fn fetch_customer_profile(&self, user_id: i64) -> Result<Option<CustomerProfile>, StorageError>;
        async fn upsert_customer_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<CustomerProfile, StorageError>;
    }

    impl ShopManagement for CommerceDb {
        async fn create_shop(&self, shop: NewShop) -> Result<Shop, StorageError>;
        async fn fetch_shop(&self, id: i64) -> Result<Option<Shop>, StorageError>;
        async fn fetch_all_shops(&self) -> Result<Vec<Shop>, StorageError>;
        async fn fetch_approved_shops(&self) -> Result<Vec<Shop>, StorageError>;
        async fn fetch_shops_by_vendor(&self, vendor_id: i64) -> Result<Vec<Shop>, StorageError>;
        async fn fetch_shops_by_category(&self, category_id: i64) -> Result<Vec<Shop>, StorageError>;
        async fn update_shop(&self, id: i64, update: ShopUpdate) -> Result<Option<Shop>, StorageError>;
        async fn delete_shop(&self, id: i64) -> Result<bool, StorageError>;
        async fn fetch_categories(&self) -> Result<Vec<Category>, StorageError>;
        async fn fetch_category(&self, id: i64) -> Result<Option<Category>, StorageError>;
        async fn create_category(&self, category: NewCategory) -> Result<Category, StorageError>;
        async fn update_category(&self, id: i64, update: CategoryUpdate) -> Result<Option<Category>, StorageError>;
        async fn delete_category(&self, id: i64) -> Result<bool, StorageError>;
    }

    impl CatalogManagement for CommerceDb {
        async fn create_product(&self, shop_id: i64, product: NewProduct) -> Result<Product, StorageError>;
        async fn fetch_product(&self, id: i64) -> Result<Option<Product>, StorageError>;
        async fn fetch_products_by_shop(&self, shop_id: i64) -> Result<Vec<Product>, StorageError>;
        async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Option<Product>, StorageError>;
        async fn delete_product(&self, id: i64) -> Result<bool, StorageError>;
    }

    impl OrderManagement for CommerceDb {
        async fn create_order_with_items(&self, order: &NewOrder, items: &[PricedItem]) -> Result<(Order, Vec<OrderItem>), StorageError>;
        async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StorageError>;
        async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StorageError>;
        async fn fetch_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>, StorageError>;
        async fn fetch_orders_by_shops(&self, shop_ids: &[i64]) -> Result<Vec<Order>, StorageError>;
        async fn update_order_status(&self, id: i64, expected: OrderStatus, new: OrderStatus) -> Result<Option<Order>, StorageError>;
    }
}
