//! Audit trail entities.
//!
//! Entries are append-only: written once per mutating admin action, never
//! updated or deleted. Provider-originated payment updates are deliberately
//! not audited as admin actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AdminUserId, AuditAction, AuditLogId, OrderId};

/// Who performed a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// An authenticated administrator.
    Admin(AdminUserId),
    /// The system itself, e.g. a payment-provider callback.
    System,
}

impl Actor {
    /// The admin ID, when the actor is an administrator.
    #[must_use]
    pub const fn admin_id(&self) -> Option<AdminUserId> {
        match self {
            Self::Admin(id) => Some(*id),
            Self::System => None,
        }
    }

    /// Whether this is the reserved system identity.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

/// An immutable audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Unique entry ID.
    pub id: AuditLogId,
    /// What kind of mutation happened.
    pub action: AuditAction,
    /// The order the mutation touched, if any.
    pub order_id: Option<OrderId>,
    /// The administrator who acted; absent for system-originated changes.
    pub admin_user_id: Option<AdminUserId>,
    /// Snapshot of the changed fields before the mutation.
    pub old_values: Option<serde_json::Value>,
    /// Snapshot of the changed fields after the mutation.
    pub new_values: Option<serde_json::Value>,
    /// Free-text description.
    pub description: Option<String>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// A not-yet-persisted audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub order_id: Option<OrderId>,
    pub admin_user_id: Option<AdminUserId>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub description: Option<String>,
}

impl NewAuditEntry {
    /// Materialize the entry with a fresh ID and timestamp.
    #[must_use]
    pub fn into_entry(self) -> AuditLogEntry {
        AuditLogEntry {
            id: AuditLogId::generate(),
            action: self.action,
            order_id: self.order_id,
            admin_user_id: self.admin_user_id,
            old_values: self.old_values,
            new_values: self.new_values,
            description: self.description,
            created_at: Utc::now(),
        }
    }
}

/// Filter for the admin audit listing. Newest entries first.
#[derive(Debug, Clone)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub order_id: Option<OrderId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for AuditFilter {
    fn default() -> Self {
        Self {
            action: None,
            order_id: None,
            from: None,
            to: None,
            limit: 50,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_identity() {
        let id = AdminUserId::generate();
        assert_eq!(Actor::Admin(id).admin_id(), Some(id));
        assert!(Actor::System.admin_id().is_none());
        assert!(Actor::System.is_system());
    }

    #[test]
    fn test_default_filter_page_size() {
        let filter = AuditFilter::default();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
    }
}
