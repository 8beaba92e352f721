//! Application state shared across handlers.

use std::sync::Arc;

use fournil_core::service::{CatalogService, OrderService};
use fournil_core::store::AuditStore;
use sqlx::PgPool;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    orders: OrderService,
    catalog: CatalogService,
    audit: Arc<dyn AuditStore>,
}

impl AppState {
    /// Assemble the state from its parts.
    ///
    /// Services and stores are injected so tests can run the router against
    /// in-memory implementations.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        pool: PgPool,
        orders: OrderService,
        catalog: CatalogService,
        audit: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                orders,
                catalog,
                audit,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the order lifecycle service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Get a reference to the catalog management service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the audit log store.
    #[must_use]
    pub fn audit(&self) -> &Arc<dyn AuditStore> {
        &self.inner.audit
    }
}
