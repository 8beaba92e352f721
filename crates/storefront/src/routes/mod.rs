//! HTTP route handlers for the public storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (database ping)
//!
//! # Catalog
//! GET  /api/products                 - Available products with flavors
//! GET  /api/products/{id}            - Single product
//!
//! # Orders
//! POST /api/orders                   - Submit an order (CASH or PAYPAL)
//!
//! # Payments
//! POST /api/payments/paypal/execute  - Execute an approved PayPal payment
//! POST /api/webhooks/paypal          - PayPal event relay
//! ```

pub mod catalog;
pub mod orders;
pub mod payments;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{id}", get(catalog::show))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/paypal/execute", post(payments::execute_paypal))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", catalog_routes())
        .route("/api/orders", post(orders::create))
        .nest("/api/payments", payment_routes())
        .route("/api/webhooks/paypal", post(payments::paypal_webhook))
}
