//! PayPal REST API client.
//!
//! Implements the redirect-based approval flow against the v1 payments API:
//! an OAuth client-credentials token, a payment create call returning an
//! `approval_url`, and a payment execute call once the client has approved.

use async_trait::async_trait;
use base64::Engine;
use fournil_core::model::Order;
use fournil_core::payment::{ApprovalFlow, PaymentConfirmation, PaymentError, PaymentProvider};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::PayPalConfig;

/// PayPal REST API client.
#[derive(Clone)]
pub struct PayPalClient {
    http: reqwest::Client,
    config: PayPalConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Link {
    rel: String,
    href: String,
}

#[derive(Deserialize)]
struct PaymentResponse {
    id: String,
    #[serde(default)]
    links: Vec<Link>,
}

impl PayPalClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Obtain an OAuth access token via the client-credentials grant.
    async fn access_token(&self) -> Result<String, PaymentError> {
        let basic = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.config.client_id,
            self.config.secret.expose_secret()
        ));

        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.config.base_url))
            .header("Authorization", format!("Basic {basic}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PaymentError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Http(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Build the create-payment request body for an order.
    fn payment_body(order: &Order, return_url: &str, cancel_url: &str) -> serde_json::Value {
        let items: Vec<serde_json::Value> = order
            .items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "name": item.name,
                    "sku": item.product_id,
                    "price": item.unit_price.to_amount_string(),
                    "currency": "EUR",
                    "quantity": item.qty,
                })
            })
            .collect();

        serde_json::json!({
            "intent": "sale",
            "payer": { "payment_method": "paypal" },
            "redirect_urls": {
                "return_url": return_url,
                "cancel_url": cancel_url,
            },
            "transactions": [{
                "item_list": { "items": items },
                "amount": {
                    "currency": "EUR",
                    "total": order.total_price.to_amount_string(),
                },
                "description": format!("Commande {}", order.order_number),
            }],
        })
    }
}

#[async_trait]
impl PaymentProvider for PayPalClient {
    async fn create_approval(
        &self,
        order: &Order,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<ApprovalFlow, PaymentError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!("{}/v1/payments/payment", self.config.base_url))
            .bearer_auth(token)
            .json(&Self::payment_body(order, return_url, cancel_url))
            .send()
            .await
            .map_err(|e| PaymentError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Http(e.to_string()))?;

        let approval_url = payment
            .links
            .into_iter()
            .find(|link| link.rel == "approval_url")
            .map(|link| link.href)
            .ok_or(PaymentError::MissingApprovalUrl)?;

        Ok(ApprovalFlow {
            payment_id: payment.id,
            approval_url,
        })
    }

    async fn confirm(
        &self,
        payment_id: &str,
        payer_reference: &str,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/v1/payments/payment/{payment_id}/execute",
                self.config.base_url
            ))
            .bearer_auth(token)
            .json(&serde_json::json!({ "payer_id": payer_reference }))
            .send()
            .await
            .map_err(|e| PaymentError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let executed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PaymentError::Http(e.to_string()))?;

        if executed["state"] == "approved" {
            let transaction_id = executed["transactions"][0]["related_resources"][0]["sale"]["id"]
                .as_str()
                .map(str::to_owned);
            Ok(PaymentConfirmation {
                success: true,
                transaction_id,
            })
        } else {
            Ok(PaymentConfirmation {
                success: false,
                transaction_id: None,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use fournil_core::model::{CreateOrder, OrderItem, ResolvedItems};
    use fournil_core::types::{Money, PaymentMethod, ProductId};

    use super::*;

    fn order() -> Order {
        let input = CreateOrder {
            client_name: "Marie Dupont".to_owned(),
            client_phone: "+33612345678".to_owned(),
            client_email: None,
            items: Vec::new(),
            pickup_or_delivery_date: Utc::now(),
            payment_method: PaymentMethod::Paypal,
            notes: None,
        };
        let resolved = ResolvedItems {
            items: vec![OrderItem {
                product_id: ProductId::generate(),
                name: "Flanc".to_owned(),
                qty: 2,
                unit_price: Money::from_centimes(3000),
                flavor: None,
                parts: None,
            }],
            total: Money::from_centimes(6000),
        };
        Order::new("PAT-20260807-0001".to_owned(), &input, resolved)
    }

    #[test]
    fn test_payment_body_amounts_are_decimal_strings() {
        let body = PayPalClient::payment_body(&order(), "https://shop/success", "https://shop/cancel");

        assert_eq!(body["intent"], "sale");
        assert_eq!(body["transactions"][0]["amount"]["total"], "60.00");
        assert_eq!(body["transactions"][0]["amount"]["currency"], "EUR");
        let item = &body["transactions"][0]["item_list"]["items"][0];
        assert_eq!(item["price"], "30.00");
        assert_eq!(item["quantity"], 2);
        assert_eq!(
            body["redirect_urls"]["return_url"],
            "https://shop/success"
        );
    }

    #[test]
    fn test_payment_body_describes_order_number() {
        let body = PayPalClient::payment_body(&order(), "a", "b");
        assert_eq!(
            body["transactions"][0]["description"],
            "Commande PAT-20260807-0001"
        );
    }
}
