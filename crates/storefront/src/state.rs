//! Application state shared across handlers.

use std::sync::Arc;

use fournil_core::payment::PaymentProvider;
use fournil_core::service::OrderService;
use fournil_core::store::CatalogStore;
use sqlx::PgPool;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; carries the configuration, the database pool
/// (readiness checks), and the domain collaborators.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    orders: OrderService,
    catalog: Arc<dyn CatalogStore>,
    payments: Arc<dyn PaymentProvider>,
}

impl AppState {
    /// Assemble the state from its parts.
    ///
    /// The stores and the payment provider are injected so that tests can run
    /// the full router against in-memory implementations.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        pool: PgPool,
        orders: OrderService,
        catalog: Arc<dyn CatalogStore>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                orders,
                catalog,
                payments,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
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

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.inner.catalog
    }

    /// Get a reference to the payment provider.
    #[must_use]
    pub fn payments(&self) -> &Arc<dyn PaymentProvider> {
        &self.inner.payments
    }
}
