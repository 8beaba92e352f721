//! Unified error handling with Sentry integration.
//!
//! Mirrors the storefront's responder: domain errors map to HTTP statuses,
//! server-side failures are captured to Sentry with their detail hidden from
//! the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fournil_core::{CatalogError, OrderError, StoreError};
use thiserror::Error;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order lifecycle operation failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Catalog management operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Storage operation failed outside the services.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request failed field validation.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Order(err) => match err {
                OrderError::OrderNotFound(_) | OrderError::ProductNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                OrderError::ProductUnavailable(_)
                | OrderError::InvalidFlavor { .. }
                | OrderError::InvalidQuantity
                | OrderError::EmptyOrder
                | OrderError::InvalidStatusTransition { .. }
                | OrderError::InvalidPaymentTransition { .. } => StatusCode::BAD_REQUEST,
                OrderError::OrderNumberExhausted | OrderError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Catalog(err) => match err {
                CatalogError::ProductNotFound(_) | CatalogError::FlavorNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CatalogError::NegativePrice => StatusCode::BAD_REQUEST,
                CatalogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Store(_)
            | Self::Internal(_)
            | Self::Order(OrderError::Store(_) | OrderError::OrderNumberExhausted)
            | Self::Catalog(CatalogError::Store(_)) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(serde_json::json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use fournil_core::types::{FlavorId, OrderId};

    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Order(OrderError::OrderNotFound(OrderId::generate())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Catalog(CatalogError::FlavorNotFound(FlavorId::generate())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Catalog(CatalogError::NegativePrice).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("no token".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("viewer".to_string()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_store_detail_is_hidden() {
        let err = AppError::Store(StoreError::Database("dsn with password".to_string()));
        assert_eq!(err.client_message(), "Internal server error");
    }
}
