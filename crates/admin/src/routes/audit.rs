//! Audit log listing.

use axum::Json;
use axum::extract::{Query, State};
use fournil_core::model::{AuditFilter, AuditLogEntry};
use fournil_core::types::{AuditAction, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::AdminIdentity;
use crate::state::AppState;

const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub struct AuditListQuery {
    pub action: Option<String>,
    pub order_id: Option<OrderId>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AuditListQuery {
    fn into_filter(self) -> Result<AuditFilter> {
        let action = self
            .action
            .map(|s| s.parse::<AuditAction>().map_err(AppError::BadRequest))
            .transpose()?;

        let mut filter = AuditFilter {
            action,
            order_id: self.order_id,
            ..AuditFilter::default()
        };
        if let Some(limit) = self.limit {
            filter.limit = limit.min(MAX_PAGE_SIZE);
        }
        if let Some(offset) = self.offset {
            filter.offset = offset;
        }
        Ok(filter)
    }
}

#[derive(Serialize)]
pub struct AuditListResponse {
    entries: Vec<AuditLogEntry>,
}

/// `GET /api/admin/audit` - audit trail, newest first.
pub async fn index(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Query(query): Query<AuditListQuery>,
) -> Result<Json<AuditListResponse>> {
    let filter = query.into_filter()?;
    let entries = state.audit().list(&filter).await?;
    Ok(Json(AuditListResponse { entries }))
}
