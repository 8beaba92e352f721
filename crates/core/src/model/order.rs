//! Order entity and its request/snapshot types.
//!
//! An order's line items are immutable snapshots of the catalog at creation
//! time. The catalog can change freely afterwards; historical orders keep the
//! names and prices the client actually saw.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    AdminUserId, Email, FlavorId, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus,
    ProductId,
};

/// A persisted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique storage ID.
    pub id: OrderId,
    /// Human-readable order number (`PAT-YYYYMMDD-NNNN`).
    pub order_number: String,
    /// Client name as submitted.
    pub client_name: String,
    /// Client phone number as submitted.
    pub client_phone: String,
    /// Optional client email for confirmations and status updates.
    pub client_email: Option<Email>,
    /// Line item snapshots.
    pub items: Vec<OrderItem>,
    /// Total price in centimes. Always recomputed server-side; equals the sum
    /// of `unit_price × qty` across items.
    pub total_price: Money,
    /// How the client pays.
    pub payment_method: PaymentMethod,
    /// Payment state; starts PENDING regardless of method.
    pub payment_status: PaymentStatus,
    /// Preparation state; starts PENDING.
    pub status: OrderStatus,
    /// Requested pickup or delivery moment.
    pub pickup_or_delivery_date: DateTime<Utc>,
    /// Free-text notes from the client.
    pub notes: Option<String>,
    /// Internal notes, visible to staff only.
    pub notes_admin: Option<String>,
    /// Payment-provider reference (PayPal payment ID), set once an approval
    /// flow has been created or a provider callback confirmed the payment.
    pub provider_payment_id: Option<String>,
    /// Admin who last touched the order. Absent for untouched orders and for
    /// provider-originated payment updates.
    pub last_modified_by: Option<AdminUserId>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Assemble a fresh order from validated input and resolved items.
    #[must_use]
    pub fn new(order_number: String, input: &CreateOrder, resolved: ResolvedItems) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::generate(),
            order_number,
            client_name: input.client_name.clone(),
            client_phone: input.client_phone.clone(),
            client_email: input.client_email.clone(),
            items: resolved.items,
            total_price: resolved.total,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            pickup_or_delivery_date: input.pickup_or_delivery_date,
            notes: input.notes.clone(),
            notes_admin: None,
            provider_payment_id: None,
            last_modified_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One line of an order: a snapshot, never a live catalog reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product the line was resolved from.
    pub product_id: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Quantity, at least 1.
    pub qty: u32,
    /// Resolved unit price at order time: base price plus the selected
    /// flavor's modifier (zero when no flavor was selected).
    pub unit_price: Money,
    /// Selected flavor snapshot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<FlavorSelection>,
    /// Number of parts for sliceable cakes, carried through from the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<u32>,
}

impl OrderItem {
    /// `unit_price × qty` for this line.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.qty)
    }
}

/// Snapshot of the flavor selected on a line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorSelection {
    /// Flavor ID at order time, when the flavor was matched by ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<FlavorId>,
    /// Flavor name at order time.
    pub name: String,
    /// Price modifier applied on top of the base price.
    pub price_modifier: Money,
}

/// Optional selection metadata on a requested line item.
///
/// Modeled as explicit fields rather than an open map; anything the resolver
/// does not recognize is rejected at the API boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemOptions {
    /// Requested flavor by ID. Takes precedence over `flavor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<FlavorId>,
    /// Requested flavor by name, matched case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Requested number of parts for sliceable cakes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<u32>,
}

impl ItemOptions {
    /// Whether the options reference a flavor at all.
    #[must_use]
    pub fn requests_flavor(&self) -> bool {
        self.flavor_id.is_some() || self.flavor.is_some()
    }
}

/// One requested line in an order submission.
///
/// Any client-submitted price is discarded: it is accepted in the payload for
/// compatibility with the ordering UI but never read by price resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    /// Product to order.
    pub product_id: ProductId,
    /// Quantity, must be at least 1.
    pub qty: u32,
    /// Optional selection metadata (flavor, parts).
    #[serde(default)]
    pub options: Option<ItemOptions>,
}

/// A validated order submission.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<Email>,
    pub items: Vec<OrderItemRequest>,
    pub pickup_or_delivery_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Output of price resolution: sanitized line items plus their sum.
#[derive(Debug, Clone)]
pub struct ResolvedItems {
    /// Snapshot line items.
    pub items: Vec<OrderItem>,
    /// Sum of `unit_price × qty` across items.
    pub total: Money,
}

/// Filter for the admin order listing.
///
/// Date bounds apply to the pickup/delivery date, both inclusive.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Aggregate order statistics for the admin dashboard.
///
/// Revenue counts PAID orders only; "today" is the current UTC day of the
/// order's creation.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStats {
    pub total_orders: u64,
    pub today_orders: u64,
    pub total_revenue: Money,
    pub today_revenue: Money,
    pub orders_by_status: BTreeMap<OrderStatus, u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            product_id: ProductId::generate(),
            name: "Flanc".to_owned(),
            qty: 2,
            unit_price: Money::from_centimes(3000),
            flavor: None,
            parts: None,
        };
        assert_eq!(item.line_total().centimes(), 6000);
    }

    #[test]
    fn test_item_snapshot_json_omits_empty_options() {
        let item = OrderItem {
            product_id: ProductId::generate(),
            name: "Tarte".to_owned(),
            qty: 1,
            unit_price: Money::from_centimes(2200),
            flavor: None,
            parts: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("flavor").is_none());
        assert!(json.get("parts").is_none());
    }

    #[test]
    fn test_item_request_accepts_missing_options() {
        let json = format!(
            r#"{{"product_id":"{}","qty":3}}"#,
            ProductId::generate()
        );
        let req: OrderItemRequest = serde_json::from_str(&json).unwrap();
        assert!(req.options.is_none());
        assert_eq!(req.qty, 3);
    }
}
