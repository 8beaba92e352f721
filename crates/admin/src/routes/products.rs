//! Catalog management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use fournil_core::model::{CreateFlavor, CreateProduct, Flavor, Product, UpdateFlavor, UpdateProduct};
use fournil_core::types::{FlavorId, ProductId};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::AdminIdentity;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProductListResponse {
    products: Vec<Product>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    success: bool,
    product: Product,
}

#[derive(Serialize)]
pub struct FlavorResponse {
    success: bool,
    flavor: Flavor,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    success: bool,
}

/// `GET /api/admin/products` - all products, unavailable included.
pub async fn index(
    _admin: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>> {
    let products = state.catalog().list_products(false).await?;
    Ok(Json(ProductListResponse { products }))
}

/// `POST /api/admin/products` - create a product.
pub async fn create(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".to_string()));
    }

    let product = state.catalog().create_product(input, admin.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            product,
        }),
    ))
}

/// `PATCH /api/admin/products/{id}` - partial update.
pub async fn update(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<ProductResponse>> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("product name cannot be empty".to_string()));
    }

    let product = state.catalog().update_product(id, input, admin.id).await?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// `DELETE /api/admin/products/{id}` - delete a product and its flavors.
pub async fn destroy(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<DeleteResponse>> {
    state.catalog().delete_product(id, admin.id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

/// `POST /api/admin/products/{id}/flavors` - add a flavor.
pub async fn add_flavor(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<CreateFlavor>,
) -> Result<(StatusCode, Json<FlavorResponse>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("flavor name is required".to_string()));
    }

    let flavor = state.catalog().add_flavor(id, input, admin.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(FlavorResponse {
            success: true,
            flavor,
        }),
    ))
}

/// `PATCH /api/admin/flavors/{id}` - partial update.
pub async fn update_flavor(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<FlavorId>,
    Json(input): Json<UpdateFlavor>,
) -> Result<Json<FlavorResponse>> {
    let flavor = state.catalog().update_flavor(id, input, admin.id).await?;
    Ok(Json(FlavorResponse {
        success: true,
        flavor,
    }))
}

/// `DELETE /api/admin/flavors/{id}` - delete a flavor.
pub async fn delete_flavor(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<FlavorId>,
) -> Result<Json<DeleteResponse>> {
    state.catalog().delete_flavor(id, admin.id).await?;
    Ok(Json(DeleteResponse { success: true }))
}
