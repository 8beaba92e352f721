//! PayPal execute endpoint and webhook relay.
//!
//! Both paths end in a system-actor payment update: provider-originated
//! changes record no admin identity and write no audit entry.

use axum::Json;
use axum::extract::State;
use fournil_core::model::{Actor, Order};
use fournil_core::types::{OrderId, PaymentStatus};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecutePaymentRequest {
    pub payment_id: String,
    pub payer_id: String,
    pub order_id: OrderId,
}

#[derive(Serialize)]
pub struct ExecutePaymentResponse {
    pub success: bool,
    pub order: Order,
}

/// `POST /api/payments/paypal/execute` - execute an approved payment.
///
/// Called by the frontend after PayPal redirects back with a payer reference.
pub async fn execute_paypal(
    State(state): State<AppState>,
    Json(request): Json<ExecutePaymentRequest>,
) -> Result<Json<ExecutePaymentResponse>> {
    let confirmation = state
        .payments()
        .confirm(&request.payment_id, &request.payer_id)
        .await
        .map_err(|e| AppError::BadRequest(format!("payment execution failed: {e}")))?;

    if !confirmation.success {
        return Err(AppError::BadRequest(
            "payment was not approved".to_string(),
        ));
    }

    let reference = confirmation
        .transaction_id
        .unwrap_or_else(|| request.payment_id.clone());
    let order = state
        .orders()
        .update_payment_status(
            request.order_id,
            PaymentStatus::Paid,
            Actor::System,
            Some(reference),
        )
        .await?;

    Ok(Json(ExecutePaymentResponse {
        success: true,
        order,
    }))
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: &'static str,
}

/// `POST /api/webhooks/paypal` - provider event relay.
///
/// Completed-sale events mark the matching order PAID; everything else is
/// acknowledged and ignored.
pub async fn paypal_webhook(
    State(state): State<AppState>,
    Json(event): Json<serde_json::Value>,
) -> Result<Json<WebhookResponse>> {
    let event_type = event["event_type"].as_str().unwrap_or_default();
    if !matches!(
        event_type,
        "PAYMENT.SALE.COMPLETED" | "PAYMENT.CAPTURE.COMPLETED"
    ) {
        return Ok(Json(WebhookResponse {
            success: true,
            message: "Webhook received",
        }));
    }

    let payment_id = event["resource"]["parent_payment"]
        .as_str()
        .or_else(|| event["resource"]["id"].as_str())
        .ok_or_else(|| AppError::BadRequest("payment ID missing".to_string()))?;

    let Some(order) = state
        .orders()
        .find_by_provider_payment_id(payment_id)
        .await?
    else {
        tracing::warn!(payment_id = %payment_id, "order not found for PayPal payment");
        return Err(AppError::NotFound(format!(
            "order for payment {payment_id}"
        )));
    };

    state
        .orders()
        .update_payment_status(
            order.id,
            PaymentStatus::Paid,
            Actor::System,
            Some(payment_id.to_owned()),
        )
        .await?;

    Ok(Json(WebhookResponse {
        success: true,
        message: "Payment status updated",
    }))
}
