//! In-memory store used by tests and the CLI seed path.
//!
//! One mutex guards all tables, which makes `update_with_audit` trivially
//! atomic: both writes happen under a single lock acquisition.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{
    AuditFilter, AuditLogEntry, Flavor, NewAuditEntry, Order, OrderFilter, Product,
};
use crate::store::{AuditStore, CatalogStore, OrderStore};
use crate::types::{FlavorId, OrderId, ProductId};

#[derive(Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    audit: Vec<AuditLogEntry>,
}

/// In-memory implementation of all three stores.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means another test thread panicked mid-write;
        // the data is still usable.
        self.tables.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of persisted orders. Test helper.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    /// Number of audit entries. Test helper.
    #[must_use]
    pub fn audit_count(&self) -> usize {
        self.lock().audit.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn list_products(&self, only_available: bool) -> Result<Vec<Product>, StoreError> {
        let tables = self.lock();
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| !only_available || p.available)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        self.lock().products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let existing = tables
            .products
            .get_mut(&product.id)
            .ok_or_else(|| StoreError::Database(format!("product {} not found", product.id)))?;
        // Flavors are owned rows managed by the flavor operations.
        let flavors = std::mem::take(&mut existing.flavors);
        *existing = product.clone();
        existing.flavors = flavors;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.lock().products.remove(&id).is_some())
    }

    async fn find_flavor(&self, id: FlavorId) -> Result<Option<Flavor>, StoreError> {
        let tables = self.lock();
        Ok(tables
            .products
            .values()
            .flat_map(|p| &p.flavors)
            .find(|f| f.id == id)
            .cloned())
    }

    async fn insert_flavor(&self, flavor: Flavor) -> Result<Flavor, StoreError> {
        let mut tables = self.lock();
        let product = tables.products.get_mut(&flavor.product_id).ok_or_else(|| {
            StoreError::Database(format!("product {} not found", flavor.product_id))
        })?;
        product.flavors.push(flavor.clone());
        Ok(flavor)
    }

    async fn update_flavor(&self, flavor: &Flavor) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let product = tables.products.get_mut(&flavor.product_id).ok_or_else(|| {
            StoreError::Database(format!("product {} not found", flavor.product_id))
        })?;
        let slot = product
            .flavors
            .iter_mut()
            .find(|f| f.id == flavor.id)
            .ok_or_else(|| StoreError::Database(format!("flavor {} not found", flavor.id)))?;
        *slot = flavor.clone();
        Ok(())
    }

    async fn delete_flavor(&self, id: FlavorId) -> Result<bool, StoreError> {
        let mut tables = self.lock();
        for product in tables.products.values_mut() {
            let before = product.flavors.len();
            product.flavors.retain(|f| f.id != id);
            if product.flavors.len() != before {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut tables = self.lock();
        if tables
            .orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(StoreError::Conflict(format!(
                "order number {} already exists",
                order.order_number
            )));
        }
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    async fn find_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self
            .lock()
            .orders
            .values()
            .find(|o| o.provider_payment_id.as_deref() == Some(provider_payment_id))
            .cloned())
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let tables = self.lock();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| filter.payment_status.is_none_or(|s| o.payment_status == s))
            .filter(|o| filter.date_from.is_none_or(|d| o.pickup_or_delivery_date >= d))
            .filter(|o| filter.date_to.is_none_or(|d| o.pickup_or_delivery_date <= d))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_by_pickup_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, StoreError> {
        let tables = self.lock();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.pickup_or_delivery_date >= from && o.pickup_or_delivery_date <= to)
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.pickup_or_delivery_date.cmp(&b.pickup_or_delivery_date));
        Ok(orders)
    }

    async fn update_with_audit(
        &self,
        order: &Order,
        audit: Option<NewAuditEntry>,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let slot = tables
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| StoreError::Database(format!("order {} not found", order.id)))?;
        *slot = order.clone();
        if let Some(entry) = audit {
            tables.audit.push(entry.into_entry());
        }
        Ok(())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError> {
        let entry = entry.into_entry();
        self.lock().audit.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, StoreError> {
        let tables = self.lock();
        let mut entries: Vec<AuditLogEntry> = tables
            .audit
            .iter()
            .filter(|e| filter.action.is_none_or(|a| e.action == a))
            .filter(|e| filter.order_id.is_none_or(|id| e.order_id == Some(id)))
            .filter(|e| filter.from.is_none_or(|d| e.created_at >= d))
            .filter(|e| filter.to.is_none_or(|d| e.created_at <= d))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }
}
