//! Payment provider collaborator.
//!
//! The provider is opaque to the order lifecycle: orders are created first,
//! then the HTTP layer asks the provider for a redirect-based approval flow.
//! A provider failure leaves the order persisted with payment status PENDING
//! and is surfaced to the client as a non-fatal condition.

use async_trait::async_trait;

use crate::model::Order;

/// Errors from the payment provider.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// No provider credentials were configured.
    #[error("payment provider is not configured")]
    NotConfigured,

    /// The HTTP exchange with the provider failed.
    #[error("payment provider unreachable: {0}")]
    Http(String),

    /// The provider rejected the request.
    #[error("payment provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider's response carried no approval redirect.
    #[error("payment provider returned no approval URL")]
    MissingApprovalUrl,
}

/// A created approval flow the client must be redirected to.
#[derive(Debug, Clone)]
pub struct ApprovalFlow {
    /// Provider-side payment identifier.
    pub payment_id: String,
    /// URL the client approves the payment at.
    pub approval_url: String,
}

/// Outcome of executing an approved payment.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    /// Whether the provider reports the payment as approved.
    pub success: bool,
    /// Provider-side transaction reference, when approved.
    pub transaction_id: Option<String>,
}

/// Redirect-based payment provider (PayPal in production).
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create an approval flow for an order.
    async fn create_approval(
        &self,
        order: &Order,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<ApprovalFlow, PaymentError>;

    /// Execute a payment the client has approved.
    async fn confirm(
        &self,
        payment_id: &str,
        payer_reference: &str,
    ) -> Result<PaymentConfirmation, PaymentError>;
}

/// A provider that refuses everything, for deployments without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredProvider;

#[async_trait]
impl PaymentProvider for UnconfiguredProvider {
    async fn create_approval(
        &self,
        _order: &Order,
        _return_url: &str,
        _cancel_url: &str,
    ) -> Result<ApprovalFlow, PaymentError> {
        Err(PaymentError::NotConfigured)
    }

    async fn confirm(
        &self,
        _payment_id: &str,
        _payer_reference: &str,
    ) -> Result<PaymentConfirmation, PaymentError> {
        Err(PaymentError::NotConfigured)
    }
}
