//! Public order submission.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use fournil_core::model::{CreateOrder, ItemOptions, Order, OrderItemRequest};
use fournil_core::types::{
    Email, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// One line of an order submission.
///
/// `name` and `price` are accepted for compatibility with the ordering UI and
/// deliberately never read: resolution snapshots both from the catalog.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct OrderItemPayload {
    pub product_id: ProductId,
    pub name: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub qty: u32,
    pub options: Option<ItemOptions>,
    pub price: Option<i64>,
}

/// Order submission payload.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 255, message = "client name is required"))]
    pub client_name: String,
    #[validate(length(min = 6, max = 50, message = "client phone is required"))]
    pub client_phone: String,
    pub client_email: Option<String>,
    #[validate(
        length(min = 1, message = "order must contain at least one item"),
        nested
    )]
    pub items: Vec<OrderItemPayload>,
    pub pickup_or_delivery_date: String,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    /// Validate shapes and convert into the domain input.
    fn into_create_order(self) -> Result<CreateOrder> {
        let client_email = match self.client_email.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                Email::parse(raw)
                    .map_err(|e| AppError::BadRequest(format!("invalid client_email: {e}")))?,
            ),
            None => None,
        };

        let pickup_or_delivery_date = DateTime::parse_from_rfc3339(&self.pickup_or_delivery_date)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| {
                AppError::BadRequest(format!("invalid pickup_or_delivery_date: {e}"))
            })?;

        Ok(CreateOrder {
            client_name: self.client_name,
            client_phone: self.client_phone,
            client_email,
            items: self
                .items
                .into_iter()
                .map(|item| OrderItemRequest {
                    product_id: item.product_id,
                    qty: item.qty,
                    options: item.options,
                })
                .collect(),
            pickup_or_delivery_date,
            payment_method: self.payment_method,
            notes: self.notes,
        })
    }
}

/// Order fields echoed back to the client.
#[derive(Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub total_price: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            total_price: order.total_price,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            status: order.status,
        }
    }
}

/// Approval flow data for PAYPAL orders.
#[derive(Serialize)]
pub struct PaymentData {
    pub payment_id: String,
    pub approval_url: String,
}

/// Response to an order submission.
#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: OrderSummary,
    pub payment: Option<PaymentData>,
    /// Set when the order was created but the payment provider failed; the
    /// order stays PENDING and staff can retry or switch it to CASH.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_error: Option<String>,
}

/// `POST /api/orders` - create an order.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>)> {
    request.validate()?;
    let input = request.into_create_order()?;

    let order = state.orders().create_order(input).await?;

    let mut payment = None;
    let mut payment_error = None;

    if order.payment_method == PaymentMethod::Paypal {
        let frontend = &state.config().frontend_url;
        let return_url = format!("{frontend}/payment/success");
        let cancel_url = format!("{frontend}/payment/cancel");

        match state
            .payments()
            .create_approval(&order, &return_url, &cancel_url)
            .await
        {
            Ok(flow) => {
                // Remember the provider reference so webhook callbacks can
                // find the order again.
                state
                    .orders()
                    .attach_provider_payment_id(order.id, &flow.payment_id)
                    .await?;
                payment = Some(PaymentData {
                    payment_id: flow.payment_id,
                    approval_url: flow.approval_url,
                });
            }
            Err(err) => {
                // The order exists either way; the failure is non-fatal.
                tracing::warn!(
                    order_number = %order.order_number,
                    error = %err,
                    "PayPal payment creation failed"
                );
                payment_error = Some(err.to_string());
            }
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            success: true,
            order: OrderSummary::from(&order),
            payment,
            payment_error,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request_json(date: &str) -> CreateOrderRequest {
        serde_json::from_value(serde_json::json!({
            "client_name": "Marie Dupont",
            "client_phone": "+33612345678",
            "client_email": "marie@example.com",
            "items": [{
                "product_id": ProductId::generate(),
                "name": "whatever the client claims",
                "qty": 2,
                "price": 1,
            }],
            "pickup_or_delivery_date": date,
            "payment_method": "CASH",
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_request_converts() {
        let request = request_json("2026-12-24T10:00:00+01:00");
        request.validate().unwrap();
        let input = request.into_create_order().unwrap();
        assert_eq!(input.items.len(), 1);
        assert_eq!(input.items[0].qty, 2);
        assert_eq!(input.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let request = request_json("demain matin");
        assert!(matches!(
            request.into_create_order(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_zero_quantity_fails_validation() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "client_name": "Marie",
            "client_phone": "+33612345678",
            "items": [{ "product_id": ProductId::generate(), "qty": 0 }],
            "pickup_or_delivery_date": "2026-12-24T10:00:00Z",
            "payment_method": "CASH",
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_items_fail_validation() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "client_name": "Marie",
            "client_phone": "+33612345678",
            "items": [],
            "pickup_or_delivery_date": "2026-12-24T10:00:00Z",
            "payment_method": "CASH",
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
