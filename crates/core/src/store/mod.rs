//! Storage traits.
//!
//! Three logical stores back the system: the catalog (products and their
//! flavors), the orders, and the append-only audit log. Both binaries talk to
//! them through these traits; production uses the Postgres implementation
//! ([`postgres::PgStore`], `postgres` feature), tests and the CLI seed use
//! the in-memory one ([`memory::MemoryStore`]).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{
    AuditFilter, AuditLogEntry, Flavor, NewAuditEntry, Order, OrderFilter, Product,
};
use crate::types::{FlavorId, OrderId, ProductId};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

/// Catalog persistence: products and their owned flavors.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load a product with its flavors.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// List products with their flavors, optionally restricted to available
    /// ones. Sorted by name.
    async fn list_products(&self, only_available: bool) -> Result<Vec<Product>, StoreError>;

    /// Persist a new product.
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError>;

    /// Persist changes to an existing product (flavors are managed through
    /// the flavor operations, not through this).
    async fn update_product(&self, product: &Product) -> Result<(), StoreError>;

    /// Delete a product and, by ownership, its flavors. Returns whether a
    /// product was deleted.
    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Load a single flavor.
    async fn find_flavor(&self, id: FlavorId) -> Result<Option<Flavor>, StoreError>;

    /// Persist a new flavor under its product.
    async fn insert_flavor(&self, flavor: Flavor) -> Result<Flavor, StoreError>;

    /// Persist changes to an existing flavor.
    async fn update_flavor(&self, flavor: &Flavor) -> Result<(), StoreError>;

    /// Delete a flavor. Returns whether a flavor was deleted.
    async fn delete_flavor(&self, id: FlavorId) -> Result<bool, StoreError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order in a single write.
    ///
    /// Fails with [`StoreError::Conflict`] when the order number is already
    /// taken; the caller retries with a fresh number.
    async fn insert(&self, order: Order) -> Result<Order, StoreError>;

    /// Load an order by ID.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Load an order by its payment-provider reference.
    async fn find_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Order>, StoreError>;

    /// List orders matching a filter, newest created first.
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// List orders whose pickup/delivery date falls in the inclusive range,
    /// earliest pickup first.
    async fn list_by_pickup_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, StoreError>;

    /// Persist an updated order and, when supplied, one audit entry, in a
    /// single transactional scope: either both writes land or neither does.
    async fn update_with_audit(
        &self,
        order: &Order,
        audit: Option<NewAuditEntry>,
    ) -> Result<(), StoreError>;
}

/// Append-only audit log persistence.
///
/// `append` must be durable once it returns; entries are never updated or
/// deleted.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one entry.
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError>;

    /// List entries matching a filter, newest first.
    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, StoreError>;
}
