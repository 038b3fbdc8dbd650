use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    traits::StorageError,
};

#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn create_product(&self, shop_id: i64, product: NewProduct) -> Result<Product, StorageError>;

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, StorageError>;

    async fn fetch_products_by_shop(&self, shop_id: i64) -> Result<Vec<Product>, StorageError>;

    /// Applies the non-empty fields of `update` and returns the new row, or `None` if the product does not exist.
    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Option<Product>, StorageError>;

    /// Returns whether a row was deleted.
    async fn delete_product(&self, id: i64) -> Result<bool, StorageError>;
}
