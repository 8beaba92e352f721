//! Domain error taxonomy.
//!
//! Validation errors are rejected before any write happens; a failed order
//! creation persists nothing. Storage failures surface as [`StoreError`] and
//! map to internal errors at the HTTP boundary.

use crate::types::{FlavorId, OrderId, OrderStatus, PaymentStatus, ProductId};

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored value could not be interpreted as domain data.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A uniqueness constraint rejected the write (e.g. a true order-number
    /// collision).
    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(db_err.to_string());
        }
        Self::Database(err.to_string())
    }
}

/// Errors from the order lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// A requested product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The product exists but is not orderable.
    #[error("product {0} is not available")]
    ProductUnavailable(ProductId),

    /// A flavor was requested but matches none of the product's flavors.
    #[error("requested flavor does not belong to product {product_id}")]
    InvalidFlavor { product_id: ProductId },

    /// A line item carried a zero quantity.
    #[error("item quantity must be at least 1")]
    InvalidQuantity,

    /// The submission carried no items.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// The referenced order does not exist.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// Strict-mode transition validation refused the status change.
    #[error("order status transition {from} -> {to} is not allowed")]
    InvalidStatusTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Strict-mode transition validation refused the payment change.
    #[error("payment status transition {from} -> {to} is not allowed")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Order-number generation kept colliding with persisted orders.
    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    /// The storage layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from catalog management.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The referenced flavor does not exist.
    #[error("flavor {0} not found")]
    FlavorNotFound(FlavorId),

    /// A product base price below zero was rejected.
    #[error("product price cannot be negative")]
    NegativePrice,

    /// The storage layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
