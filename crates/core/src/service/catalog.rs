//! Catalog management service.
//!
//! Administrative create/update/delete for products and flavors, with audit
//! entries for each mutation. Audit writes here are best-effort advisory: a
//! failed append is logged and does not undo the catalog change.

use std::sync::Arc;

use chrono::Utc;

use crate::error::CatalogError;
use crate::model::{
    CreateFlavor, CreateProduct, Flavor, NewAuditEntry, Product, UpdateFlavor, UpdateProduct,
};
use crate::store::{AuditStore, CatalogStore};
use crate::types::{AdminUserId, AuditAction, FlavorId, ProductId};

/// Administrative catalog operations.
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
    audit: Arc<dyn AuditStore>,
}

impl CatalogService {
    /// Assemble the service from its stores.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, audit: Arc<dyn AuditStore>) -> Self {
        Self { catalog, audit }
    }

    /// List products, optionally restricted to available ones.
    ///
    /// # Errors
    ///
    /// A storage failure.
    pub async fn list_products(&self, only_available: bool) -> Result<Vec<Product>, CatalogError> {
        Ok(self.catalog.list_products(only_available).await?)
    }

    /// Load one product with its flavors.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ProductNotFound`] or a storage failure.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.catalog
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NegativePrice`] or a storage failure.
    pub async fn create_product(
        &self,
        input: CreateProduct,
        admin: AdminUserId,
    ) -> Result<Product, CatalogError> {
        if input.price.is_negative() {
            return Err(CatalogError::NegativePrice);
        }

        let product = self.catalog.insert_product(Product::new(input)).await?;
        self.record(NewAuditEntry {
            action: AuditAction::ProductCreated,
            order_id: None,
            admin_user_id: Some(admin),
            old_values: None,
            new_values: serde_json::to_value(&product).ok(),
            description: Some(format!("Product \"{}\" created", product.name)),
        })
        .await;
        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ProductNotFound`], [`CatalogError::NegativePrice`], or
    /// a storage failure.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: UpdateProduct,
        admin: AdminUserId,
    ) -> Result<Product, CatalogError> {
        if input.price.is_some_and(|p| p.is_negative()) {
            return Err(CatalogError::NegativePrice);
        }

        let before = self.get_product(id).await?;
        let mut product = before.clone();
        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = Some(description);
        }
        if let Some(category) = input.category {
            product.category = Some(category);
        }
        if let Some(price) = input.price {
            product.price = price;
        }
        if let Some(image_url) = input.image_url {
            product.image_url = Some(image_url);
        }
        if let Some(available) = input.available {
            product.available = available;
        }
        product.updated_at = Utc::now();

        self.catalog.update_product(&product).await?;
        self.record(NewAuditEntry {
            action: AuditAction::ProductUpdated,
            order_id: None,
            admin_user_id: Some(admin),
            old_values: serde_json::to_value(&before).ok(),
            new_values: serde_json::to_value(&product).ok(),
            description: Some(format!("Product \"{}\" updated", product.name)),
        })
        .await;
        Ok(product)
    }

    /// Delete a product and its flavors.
    ///
    /// Historical orders keep their snapshots and are not touched.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ProductNotFound`] or a storage failure.
    pub async fn delete_product(
        &self,
        id: ProductId,
        admin: AdminUserId,
    ) -> Result<(), CatalogError> {
        let before = self.get_product(id).await?;
        if !self.catalog.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        self.record(NewAuditEntry {
            action: AuditAction::ProductDeleted,
            order_id: None,
            admin_user_id: Some(admin),
            old_values: serde_json::to_value(&before).ok(),
            new_values: None,
            description: Some(format!("Product \"{}\" deleted", before.name)),
        })
        .await;
        Ok(())
    }

    /// Add a flavor to a product.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ProductNotFound`] or a storage failure.
    pub async fn add_flavor(
        &self,
        product_id: ProductId,
        input: CreateFlavor,
        admin: AdminUserId,
    ) -> Result<Flavor, CatalogError> {
        let product = self.get_product(product_id).await?;
        let flavor = self
            .catalog
            .insert_flavor(Flavor::new(product.id, input))
            .await?;
        self.record(NewAuditEntry {
            action: AuditAction::ProductUpdated,
            order_id: None,
            admin_user_id: Some(admin),
            old_values: None,
            new_values: serde_json::to_value(&flavor).ok(),
            description: Some(format!(
                "Flavor \"{}\" added to product \"{}\"",
                flavor.name, product.name
            )),
        })
        .await;
        Ok(flavor)
    }

    /// Apply a partial update to a flavor.
    ///
    /// # Errors
    ///
    /// [`CatalogError::FlavorNotFound`] or a storage failure.
    pub async fn update_flavor(
        &self,
        id: FlavorId,
        input: UpdateFlavor,
        admin: AdminUserId,
    ) -> Result<Flavor, CatalogError> {
        let before = self
            .catalog
            .find_flavor(id)
            .await?
            .ok_or(CatalogError::FlavorNotFound(id))?;
        let mut flavor = before.clone();
        if let Some(name) = input.name {
            flavor.name = name;
        }
        if let Some(price_modifier) = input.price_modifier {
            flavor.price_modifier = price_modifier;
        }
        flavor.updated_at = Utc::now();

        self.catalog.update_flavor(&flavor).await?;
        self.record(NewAuditEntry {
            action: AuditAction::ProductUpdated,
            order_id: None,
            admin_user_id: Some(admin),
            old_values: serde_json::to_value(&before).ok(),
            new_values: serde_json::to_value(&flavor).ok(),
            description: Some(format!("Flavor \"{}\" updated", flavor.name)),
        })
        .await;
        Ok(flavor)
    }

    /// Delete a flavor.
    ///
    /// # Errors
    ///
    /// [`CatalogError::FlavorNotFound`] or a storage failure.
    pub async fn delete_flavor(&self, id: FlavorId, admin: AdminUserId) -> Result<(), CatalogError> {
        let before = self
            .catalog
            .find_flavor(id)
            .await?
            .ok_or(CatalogError::FlavorNotFound(id))?;
        if !self.catalog.delete_flavor(id).await? {
            return Err(CatalogError::FlavorNotFound(id));
        }
        self.record(NewAuditEntry {
            action: AuditAction::ProductUpdated,
            order_id: None,
            admin_user_id: Some(admin),
            old_values: serde_json::to_value(&before).ok(),
            new_values: None,
            description: Some(format!("Flavor \"{}\" deleted", before.name)),
        })
        .await;
        Ok(())
    }

    async fn record(&self, entry: NewAuditEntry) {
        if let Err(err) = self.audit.append(entry).await {
            tracing::warn!(error = %err, "audit append failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::AuditFilter;
    use crate::store::memory::MemoryStore;
    use crate::types::Money;

    fn service() -> (CatalogService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = CatalogService::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            Arc::clone(&store) as Arc<dyn AuditStore>,
        );
        (service, store)
    }

    fn flanc_input() -> CreateProduct {
        CreateProduct {
            name: "Flanc".to_owned(),
            description: None,
            category: Some("gateaux".to_owned()),
            price: Money::from_centimes(2800),
            image_url: None,
            available: None,
        }
    }

    #[tokio::test]
    async fn test_create_product_writes_audit() {
        let (service, store) = service();
        let admin = AdminUserId::generate();

        let product = service.create_product(flanc_input(), admin).await.unwrap();
        assert_eq!(product.price.centimes(), 2800);
        assert_eq!(store.audit_count(), 1);

        let entries = AuditStore::list(store.as_ref(), &AuditFilter::default())
            .await
            .unwrap();
        assert_eq!(entries[0].action, AuditAction::ProductCreated);
        assert_eq!(entries[0].admin_user_id, Some(admin));
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let (service, store) = service();
        let mut input = flanc_input();
        input.price = Money::from_centimes(-100);

        let err = service
            .create_product(input, AdminUserId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NegativePrice));
        assert_eq!(store.audit_count(), 0);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let (service, _store) = service();
        let admin = AdminUserId::generate();
        let product = service.create_product(flanc_input(), admin).await.unwrap();

        let updated = service
            .update_product(
                product.id,
                UpdateProduct {
                    available: Some(false),
                    ..UpdateProduct::default()
                },
                admin,
            )
            .await
            .unwrap();
        assert!(!updated.available);
        assert_eq!(updated.name, "Flanc");
        assert_eq!(updated.price.centimes(), 2800);
    }

    #[tokio::test]
    async fn test_flavor_lifecycle() {
        let (service, store) = service();
        let admin = AdminUserId::generate();
        let product = service.create_product(flanc_input(), admin).await.unwrap();

        let flavor = service
            .add_flavor(
                product.id,
                CreateFlavor {
                    name: "Pistache".to_owned(),
                    price_modifier: Some(Money::from_centimes(200)),
                },
                admin,
            )
            .await
            .unwrap();

        let renamed = service
            .update_flavor(
                flavor.id,
                UpdateFlavor {
                    name: Some("Pistache de Sicile".to_owned()),
                    price_modifier: None,
                },
                admin,
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Pistache de Sicile");
        assert_eq!(renamed.price_modifier.centimes(), 200);

        service.delete_flavor(flavor.id, admin).await.unwrap();
        let reloaded = service.get_product(product.id).await.unwrap();
        assert!(reloaded.flavors.is_empty());

        // create + add + update + delete
        assert_eq!(store.audit_count(), 4);
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let (service, _store) = service();
        let err = service
            .delete_product(ProductId::generate(), AdminUserId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::ProductNotFound(_)));
    }
}
