use log::*;

use crate::{
    db_types::{Actor, Category, CategoryUpdate, NewCategory, NewShop, Shop, ShopUpdate},
    events::{EventProducers, ShopEvent},
    helpers::geo::within_radius,
    sle_api::errors::ShopApiError,
    traits::ShopManagement,
};

/// API for the shop directory: registration, the approval and open/closed flags that gate customer visibility, the
/// customer-facing listings (all / by category / nearby), and the category table.
pub struct ShopApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> ShopApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ShopApi<B>
where B: ShopManagement
{
    /// Registers a new shop for the calling vendor. New shops start unapproved and are invisible to customers until
    /// an admin approves them.
    pub async fn create_shop(&self, actor: &Actor, mut shop: NewShop) -> Result<Shop, ShopApiError> {
        shop.vendor_id = actor.id;
        self.db
            .fetch_category(shop.category_id)
            .await?
            .ok_or(ShopApiError::CategoryNotFound(shop.category_id))?;
        let shop = self.db.create_shop(shop).await?;
        info!("🏪️ Shop #{} ({}) registered by {actor}", shop.id, shop.name);
        self.call_shop_hook(ShopEvent::Added(shop.clone())).await;
        Ok(shop)
    }

    /// Fetches one shop. Unapproved shops are only visible to their owner and admins.
    pub async fn fetch_shop(&self, viewer: Option<&Actor>, id: i64) -> Result<Shop, ShopApiError> {
        let shop = self.db.fetch_shop(id).await?.ok_or(ShopApiError::ShopNotFound(id))?;
        if !shop.is_approved {
            let allowed = viewer.map(|a| a.is_admin() || a.id == shop.vendor_id).unwrap_or(false);
            if !allowed {
                return Err(ShopApiError::ShopNotVisible(id));
            }
        }
        Ok(shop)
    }

    pub async fn approved_shops(&self) -> Result<Vec<Shop>, ShopApiError> {
        Ok(self.db.fetch_approved_shops().await?)
    }

    /// Approved shops within `radius_km` of the given point. SQLite cannot do the spherical-distance predicate in
    /// SQL, so candidates are filtered here; shops without coordinates never match.
    pub async fn nearby_shops(&self, lat: f64, lng: f64, radius_km: f64) -> Result<Vec<Shop>, ShopApiError> {
        let shops = self.db.fetch_approved_shops().await?;
        let nearby = shops
            .into_iter()
            .filter(|s| match (s.latitude, s.longitude) {
                (Some(s_lat), Some(s_lng)) => within_radius(lat, lng, s_lat, s_lng, radius_km),
                _ => false,
            })
            .collect::<Vec<Shop>>();
        debug!("🏪️ Nearby query at ({lat}, {lng}) r={radius_km}km matched {} shops", nearby.len());
        Ok(nearby)
    }

    pub async fn shops_by_category(&self, category_id: i64) -> Result<Vec<Shop>, ShopApiError> {
        Ok(self.db.fetch_shops_by_category(category_id).await?)
    }

    pub async fn shops_for_vendor(&self, vendor_id: i64) -> Result<Vec<Shop>, ShopApiError> {
        Ok(self.db.fetch_shops_by_vendor(vendor_id).await?)
    }

    /// Every shop, including unapproved ones. Admin dashboards only; the route carries the admin ACL.
    pub async fn all_shops(&self) -> Result<Vec<Shop>, ShopApiError> {
        Ok(self.db.fetch_all_shops().await?)
    }

    /// Updates a shop. Only the owning vendor or an admin may update, and `is_approved` is stripped for non-admin
    /// callers so vendors cannot approve themselves.
    pub async fn update_shop(&self, actor: &Actor, id: i64, mut update: ShopUpdate) -> Result<Shop, ShopApiError> {
        let shop = self.db.fetch_shop(id).await?.ok_or(ShopApiError::ShopNotFound(id))?;
        if !actor.is_admin() {
            if shop.vendor_id != actor.id {
                return Err(ShopApiError::NotShopOwner);
            }
            update.is_approved = None;
        }
        if let Some(category_id) = update.category_id {
            self.db.fetch_category(category_id).await?.ok_or(ShopApiError::CategoryNotFound(category_id))?;
        }
        let shop = self.db.update_shop(id, update).await?.ok_or(ShopApiError::ShopNotFound(id))?;
        self.call_shop_hook(ShopEvent::Updated(shop.clone())).await;
        Ok(shop)
    }

    /// Flips the open/closed flag. Owner or admin only.
    pub async fn set_open(&self, actor: &Actor, id: i64, is_open: bool) -> Result<Shop, ShopApiError> {
        let shop = self.db.fetch_shop(id).await?.ok_or(ShopApiError::ShopNotFound(id))?;
        if !actor.is_admin() && shop.vendor_id != actor.id {
            return Err(ShopApiError::NotShopOwner);
        }
        let update = ShopUpdate { is_open: Some(is_open), ..Default::default() };
        let shop = self.db.update_shop(id, update).await?.ok_or(ShopApiError::ShopNotFound(id))?;
        info!("🏪️ Shop #{id} is now {}", if shop.is_open { "open" } else { "closed" });
        self.call_shop_hook(ShopEvent::Toggled(shop.clone())).await;
        Ok(shop)
    }

    /// Marks a shop approved, making it visible to customers. The route carries the admin ACL.
    pub async fn approve_shop(&self, id: i64) -> Result<Shop, ShopApiError> {
        let update = ShopUpdate { is_approved: Some(true), ..Default::default() };
        let shop = self.db.update_shop(id, update).await?.ok_or(ShopApiError::ShopNotFound(id))?;
        info!("🏪️ Shop #{id} ({}) approved", shop.name);
        self.call_shop_hook(ShopEvent::Updated(shop.clone())).await;
        Ok(shop)
    }

    pub async fn delete_shop(&self, actor: &Actor, id: i64) -> Result<(), ShopApiError> {
        let shop = self.db.fetch_shop(id).await?.ok_or(ShopApiError::ShopNotFound(id))?;
        if !actor.is_admin() && shop.vendor_id != actor.id {
            return Err(ShopApiError::NotShopOwner);
        }
        if self.db.delete_shop(id).await? {
            info!("🏪️ Shop #{id} deleted by {actor}");
            self.call_shop_hook(ShopEvent::Deleted(id)).await;
        }
        Ok(())
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ShopApiError> {
        Ok(self.db.fetch_categories().await?)
    }

    pub async fn create_category(&self, category: NewCategory) -> Result<Category, ShopApiError> {
        Ok(self.db.create_category(category).await?)
    }

    pub async fn update_category(&self, id: i64, update: CategoryUpdate) -> Result<Category, ShopApiError> {
        self.db.update_category(id, update).await?.ok_or(ShopApiError::CategoryNotFound(id))
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ShopApiError> {
        if self.db.delete_category(id).await? {
            Ok(())
        } else {
            Err(ShopApiError::CategoryNotFound(id))
        }
    }

    async fn call_shop_hook(&self, event: ShopEvent) {
        for emitter in &self.producers.shop_event_producer {
            trace!("🏪️ Notifying shop hook subscribers of {}", event.name());
            emitter.publish_event(event.clone()).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
