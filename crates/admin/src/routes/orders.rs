//! Order management handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, NaiveDate, Utc};
use fournil_core::model::{Actor, Order, OrderFilter, OrderStats};
use fournil_core::types::{OrderId, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::AdminIdentity;
use crate::state::AppState;

/// Accept either an RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
///
/// A bare date means the start of that day for lower bounds and the end of it
/// for upper bounds, keeping both bounds inclusive.
fn parse_date_param(key: &str, value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        if let Some(naive) = time {
            return Ok(naive.and_utc());
        }
    }
    Err(AppError::BadRequest(format!("invalid {key}: {value}")))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl OrderListQuery {
    fn into_filter(self) -> Result<OrderFilter> {
        let status = self
            .status
            .map(|s| s.parse::<OrderStatus>().map_err(AppError::BadRequest))
            .transpose()?;
        let payment_status = self
            .payment_status
            .map(|s| s.parse::<PaymentStatus>().map_err(AppError::BadRequest))
            .transpose()?;
        let date_from = self
            .date_from
            .map(|s| parse_date_param("date_from", &s, false))
            .transpose()?;
        let date_to = self
            .date_to
            .map(|s| parse_date_param("date_to", &s, true))
            .transpose()?;

        Ok(OrderFilter {
            status,
            payment_status,
            date_from,
            date_to,
        })
    }
}

#[derive(Serialize)]
pub struct OrderListResponse {
    orders: Vec<Order>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    order: Order,
}

#[derive(Serialize)]
pub struct OrderUpdateResponse {
    success: bool,
    order: Order,
}

/// `GET /api/admin/orders` - filterable order listing.
pub async fn index(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>> {
    let filter = query.into_filter()?;
    let orders = state.orders().list_orders(&filter).await?;
    Ok(Json(OrderListResponse { orders }))
}

/// `GET /api/admin/orders/{id}` - order detail.
pub async fn show(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let order = state.orders().get_order(id).await?;
    Ok(Json(OrderResponse { order }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// `PATCH /api/admin/orders/{id}/status` - move an order to a new status.
pub async fn update_status(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderUpdateResponse>> {
    let order = state
        .orders()
        .update_status(id, request.status, admin.id, request.notes)
        .await?;
    Ok(Json(OrderUpdateResponse {
        success: true,
        order,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    pub provider_payment_id: Option<String>,
}

/// `PATCH /api/admin/orders/{id}/payment` - update payment status.
pub async fn update_payment(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<OrderUpdateResponse>> {
    let order = state
        .orders()
        .update_payment_status(
            id,
            request.payment_status,
            Actor::Admin(admin.id),
            request.provider_payment_id,
        )
        .await?;
    Ok(Json(OrderUpdateResponse {
        success: true,
        order,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    calendar: BTreeMap<NaiveDate, Vec<Order>>,
}

/// `GET /api/admin/calendar` - orders grouped by pickup date.
pub async fn calendar(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>> {
    let from = query
        .date_from
        .map(|s| parse_date_param("date_from", &s, false))
        .transpose()?;
    let to = query
        .date_to
        .map(|s| parse_date_param("date_to", &s, true))
        .transpose()?;

    let calendar = state.orders().calendar(from, to).await?;
    Ok(Json(CalendarResponse { calendar }))
}

#[derive(Serialize)]
pub struct StatsResponse {
    stats: OrderStats,
}

/// `GET /api/admin/stats` - dashboard aggregates.
pub async fn stats(
    _admin: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>> {
    let stats = state.orders().stats().await?;
    Ok(Json(StatsResponse { stats }))
}
