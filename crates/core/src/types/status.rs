//! Status enums for orders and payments.
//!
//! Wire format and storage format are both SCREAMING_SNAKE_CASE text; the
//! preparation statuses keep their French names from the shop floor.

use serde::{Deserialize, Serialize};

/// How the client pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Paid at the counter on pickup.
    #[default]
    Cash,
    /// Paid online through the PayPal approval flow.
    Paypal,
}

impl PaymentMethod {
    /// Storage/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Paypal => "PAYPAL",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASH" => Ok(Self::Cash),
            "PAYPAL" => Ok(Self::Paypal),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Payment state of an order.
///
/// Every order starts PENDING regardless of payment method; PAID is set by an
/// administrator or by a provider callback, REFUNDED by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Storage/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Whether `next` is a legal successor under strict-mode validation.
    ///
    /// Strict mode only allows the forward chain PENDING → PAID → REFUNDED
    /// (setting the current value again is a no-op and always allowed). The
    /// default, permissive mode never calls this.
    #[must_use]
    pub const fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Pending | Self::Paid)
                | (Self::Paid, Self::Paid | Self::Refunded)
                | (Self::Refunded, Self::Refunded)
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "REFUNDED" => Ok(Self::Refunded),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Preparation state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    EnPreparation,
    EnCuisson,
    Prete,
    Livree,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in workflow order. Used for stats buckets.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::EnPreparation,
        Self::EnCuisson,
        Self::Prete,
        Self::Livree,
        Self::Cancelled,
    ];

    /// Storage/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::EnPreparation => "EN_PREPARATION",
            Self::EnCuisson => "EN_CUISSON",
            Self::Prete => "PRETE",
            Self::Livree => "LIVREE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Client-facing French label, used in notification emails.
    #[must_use]
    pub const fn label_fr(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Confirmed => "Confirmée",
            Self::EnPreparation => "En préparation",
            Self::EnCuisson => "En cuisson",
            Self::Prete => "Prête",
            Self::Livree => "Livrée",
            Self::Cancelled => "Annulée",
        }
    }

    /// Conventionally terminal states. Nothing locks them at the data level;
    /// strict-mode validation refuses to leave them.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Livree | Self::Cancelled)
    }

    /// The next step in the preparation workflow, if any.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::EnPreparation),
            Self::EnPreparation => Some(Self::EnCuisson),
            Self::EnCuisson => Some(Self::Prete),
            Self::Prete => Some(Self::Livree),
            Self::Livree | Self::Cancelled => None,
        }
    }

    /// Whether `next` is a legal successor under strict-mode validation.
    ///
    /// Strict mode allows: staying put, the immediate workflow successor, and
    /// CANCELLED from any non-terminal state. The default, permissive mode
    /// accepts any transition (matching the behavior staff rely on for manual
    /// corrections).
    #[must_use]
    pub fn allows(self, next: Self) -> bool {
        if self == next {
            return true;
        }
        if next == Self::Cancelled {
            return !self.is_terminal();
        }
        self.successor() == Some(next)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "EN_PREPARATION" => Ok(Self::EnPreparation),
            "EN_CUISSON" => Ok(Self::EnCuisson),
            "PRETE" => Ok(Self::Prete),
            "LIVREE" => Ok(Self::Livree),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Kind of administrative mutation recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    OrderStatusChanged,
    OrderPaymentUpdated,
    OrderUpdated,
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
}

impl AuditAction {
    /// Storage/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrderStatusChanged => "ORDER_STATUS_CHANGED",
            Self::OrderPaymentUpdated => "ORDER_PAYMENT_UPDATED",
            Self::OrderUpdated => "ORDER_UPDATED",
            Self::ProductCreated => "PRODUCT_CREATED",
            Self::ProductUpdated => "PRODUCT_UPDATED",
            Self::ProductDeleted => "PRODUCT_DELETED",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORDER_STATUS_CHANGED" => Ok(Self::OrderStatusChanged),
            "ORDER_PAYMENT_UPDATED" => Ok(Self::OrderPaymentUpdated),
            "ORDER_UPDATED" => Ok(Self::OrderUpdated),
            "PRODUCT_CREATED" => Ok(Self::ProductCreated),
            "PRODUCT_UPDATED" => Ok(Self::ProductUpdated),
            "PRODUCT_DELETED" => Ok(Self::ProductDeleted),
            _ => Err(format!("invalid audit action: {s}")),
        }
    }
}
