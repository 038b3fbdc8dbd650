use log::*;

use crate::{
    db_types::{Actor, NewProduct, Product, ProductUpdate, Shop},
    events::{EventProducers, ProductChange, ProductEvent},
    sle_api::errors::CatalogApiError,
    traits::{CatalogManagement, ShopManagement},
};

/// API for vendor product catalogues. Mutations are restricted to the owner of the shop (or an admin), and every
/// change is announced on the shop's channel so customers browsing that shop see it live.
pub struct CatalogApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> CatalogApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement + ShopManagement
{
    pub async fn products_for_shop(&self, shop_id: i64) -> Result<Vec<Product>, CatalogApiError> {
        self.shop(shop_id).await?;
        Ok(self.db.fetch_products_by_shop(shop_id).await?)
    }

    pub async fn add_product(
        &self,
        actor: &Actor,
        shop_id: i64,
        product: NewProduct,
    ) -> Result<Product, CatalogApiError> {
        let shop = self.shop(shop_id).await?;
        self.check_owner(actor, &shop)?;
        let product = self.db.create_product(shop_id, product).await?;
        info!("🏷️ Product #{} ({}) added to shop #{shop_id} by {actor}", product.id, product.name);
        self.call_product_hook(ProductEvent { shop_id, change: ProductChange::Added(product.clone()) }).await;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        actor: &Actor,
        id: i64,
        update: ProductUpdate,
    ) -> Result<Product, CatalogApiError> {
        let product = self.db.fetch_product(id).await?.ok_or(CatalogApiError::ProductNotFound(id))?;
        let shop = self.shop(product.shop_id).await?;
        self.check_owner(actor, &shop)?;
        let product = self.db.update_product(id, update).await?.ok_or(CatalogApiError::ProductNotFound(id))?;
        self.call_product_hook(ProductEvent { shop_id: shop.id, change: ProductChange::Updated(product.clone()) })
            .await;
        Ok(product)
    }

    pub async fn delete_product(&self, actor: &Actor, id: i64) -> Result<(), CatalogApiError> {
        let product = self.db.fetch_product(id).await?.ok_or(CatalogApiError::ProductNotFound(id))?;
        let shop = self.shop(product.shop_id).await?;
        self.check_owner(actor, &shop)?;
        if self.db.delete_product(id).await? {
            info!("🏷️ Product #{id} deleted from shop #{} by {actor}", shop.id);
            self.call_product_hook(ProductEvent { shop_id: shop.id, change: ProductChange::Deleted(id) }).await;
        }
        Ok(())
    }

    async fn shop(&self, shop_id: i64) -> Result<Shop, CatalogApiError> {
        self.db.fetch_shop(shop_id).await?.ok_or(CatalogApiError::ShopNotFound(shop_id))
    }

    fn check_owner(&self, actor: &Actor, shop: &Shop) -> Result<(), CatalogApiError> {
        if actor.is_admin() || shop.vendor_id == actor.id {
            Ok(())
        } else {
            Err(CatalogApiError::NotShopOwner)
        }
    }

    async fn call_product_hook(&self, event: ProductEvent) {
        for emitter in &self.producers.product_event_producer {
            trace!("🏷️ Notifying product hook subscribers of {}", event.change.name());
            emitter.publish_event(event.clone()).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
