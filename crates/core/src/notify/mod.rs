//! Notification collaborator.
//!
//! Every notification is best-effort: the order service dispatches them after
//! the order write has committed, logs failures, and never lets them affect
//! the outcome of the operation that triggered them.

use async_trait::async_trait;

use crate::model::Order;
use crate::types::OrderStatus;

#[cfg(feature = "smtp")]
pub mod smtp;

#[cfg(feature = "smtp")]
pub use smtp::{SmtpNotifier, SmtpSettings};

/// Errors from a notification backend.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The message could not be handed to the transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// The message body could not be rendered.
    #[error("template error: {0}")]
    Template(String),

    /// A recipient address could not be used.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Outbound notifications triggered by the order lifecycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Confirmation to the client after their order was created.
    ///
    /// Silently skipped when the order has no client email.
    async fn order_created(&self, order: &Order) -> Result<(), NotifyError>;

    /// Alert to the shop's admin inbox about a new order.
    async fn admin_new_order(&self, order: &Order) -> Result<(), NotifyError>;

    /// Status update to the client after an administrator moved the order.
    async fn status_changed(&self, order: &Order, new_status: OrderStatus)
    -> Result<(), NotifyError>;
}

/// A notifier that drops everything. Used by the CLI and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn order_created(&self, order: &Order) -> Result<(), NotifyError> {
        tracing::debug!(order_number = %order.order_number, "notifications disabled, skipping confirmation");
        Ok(())
    }

    async fn admin_new_order(&self, order: &Order) -> Result<(), NotifyError> {
        tracing::debug!(order_number = %order.order_number, "notifications disabled, skipping admin alert");
        Ok(())
    }

    async fn status_changed(
        &self,
        order: &Order,
        new_status: OrderStatus,
    ) -> Result<(), NotifyError> {
        tracing::debug!(
            order_number = %order.order_number,
            status = %new_status,
            "notifications disabled, skipping status update"
        );
        Ok(())
    }
}
