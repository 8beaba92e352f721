//! HTTP route handlers for the admin API.
//!
//! Every route below `/api/admin` requires a valid admin bearer token (see
//! [`crate::middleware::auth`]).
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Readiness check (database ping)
//!
//! # Orders
//! GET    /api/admin/orders                - List orders (filterable)
//! GET    /api/admin/orders/{id}           - Order detail
//! PATCH  /api/admin/orders/{id}/status    - Move an order to a new status
//! PATCH  /api/admin/orders/{id}/payment   - Update payment status
//! GET    /api/admin/calendar              - Orders grouped by pickup date
//! GET    /api/admin/stats                 - Counts and revenue
//!
//! # Catalog
//! GET    /api/admin/products              - List products (unavailable included)
//! POST   /api/admin/products              - Create product
//! PATCH  /api/admin/products/{id}         - Update product
//! DELETE /api/admin/products/{id}         - Delete product (cascades flavors)
//! POST   /api/admin/products/{id}/flavors - Add flavor
//! PATCH  /api/admin/flavors/{id}          - Update flavor
//! DELETE /api/admin/flavors/{id}          - Delete flavor
//!
//! # Audit
//! GET    /api/admin/audit                 - Audit log (filterable, paged)
//! ```

pub mod audit;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the order management routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", patch(orders::update_status))
        .route("/orders/{id}/payment", patch(orders::update_payment))
        .route("/calendar", get(orders::calendar))
        .route("/stats", get(orders::stats))
}

/// Create the catalog management routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            patch(products::update).delete(products::destroy),
        )
        .route("/products/{id}/flavors", post(products::add_flavor))
        .route(
            "/flavors/{id}",
            patch(products::update_flavor).delete(products::delete_flavor),
        )
}

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    Router::new().nest(
        "/api/admin",
        Router::new()
            .merge(order_routes())
            .merge(product_routes())
            .route("/audit", get(audit::index)),
    )
}
