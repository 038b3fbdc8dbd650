use crate::{
    db_types::{Category, CategoryUpdate, NewCategory, NewShop, Shop, ShopUpdate},
    traits::StorageError,
};

#[allow(async_fn_in_trait)]
pub trait ShopManagement {
    async fn create_shop(&self, shop: NewShop) -> Result<Shop, StorageError>;

    async fn fetch_shop(&self, id: i64) -> Result<Option<Shop>, StorageError>;

    /// Every shop, approved or not. Admin dashboards only.
    async fn fetch_all_shops(&self) -> Result<Vec<Shop>, StorageError>;

    /// The customer-facing listing: approved shops only.
    async fn fetch_approved_shops(&self) -> Result<Vec<Shop>, StorageError>;

    async fn fetch_shops_by_vendor(&self, vendor_id: i64) -> Result<Vec<Shop>, StorageError>;

    async fn fetch_shops_by_category(&self, category_id: i64) -> Result<Vec<Shop>, StorageError>;

    /// Applies the non-empty fields of `update` and returns the new row, or `None` if the shop does not exist.
    async fn update_shop(&self, id: i64, update: ShopUpdate) -> Result<Option<Shop>, StorageError>;

    /// Returns whether a row was deleted.
    async fn delete_shop(&self, id: i64) -> Result<bool, StorageError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, StorageError>;

    async fn fetch_category(&self, id: i64) -> Result<Option<Category>, StorageError>;

    async fn create_category(&self, category: NewCategory) -> Result<Category, StorageError>;

    async fn update_category(&self, id: i64, update: CategoryUpdate) -> Result<Option<Category>, StorageError>;

    async fn delete_category(&self, id: i64) -> Result<bool, StorageError>;
}
