//! Public catalog browsing.

use axum::Json;
use axum::extract::{Path, State};
use fournil_core::model::Product;
use fournil_core::types::ProductId;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProductListResponse {
    products: Vec<Product>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    product: Product,
}

/// `GET /api/products` - available products with their flavors.
pub async fn index(State(state): State<AppState>) -> Result<Json<ProductListResponse>> {
    let products = state.catalog().list_products(true).await?;
    Ok(Json(ProductListResponse { products }))
}

/// `GET /api/products/{id}` - a single product.
///
/// Unavailable products still resolve here; the ordering flow is where
/// availability is enforced.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>> {
    let product = state
        .catalog()
        .find_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(ProductResponse { product }))
}
