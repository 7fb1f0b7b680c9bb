//! Inventory item endpoints.
//!
//! Reads are open to every authenticated role. Creating and editing need a
//! writer role; deleting is admin only.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::validation::validate_item_id;
use super::{ApiError, ApiResponse, AppState, CurrentUser, MessageResponse};
use crate::domain::Role;
use crate::inventory::{FilterOptions, InventoryStats, ItemQuery};
use crate::models::{InventoryItem, ItemPatch, NewItem};

/// `GET /api/inventory`
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<ApiResponse<Vec<InventoryItem>>>, ApiError> {
    let items = state.inventory_service().list(&query).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// `POST /api/inventory`
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<NewItem>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryItem>>), ApiError> {
    user.require(Role::WRITERS)?;

    let item = state
        .inventory_service()
        .create(payload, &user.email)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// `GET /api/inventory/{id}`
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InventoryItem>>, ApiError> {
    let id = validate_item_id(&id)?;
    let item = state.inventory_service().get(&id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// `PUT /api/inventory/{id}`
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<ApiResponse<InventoryItem>>, ApiError> {
    user.require(Role::WRITERS)?;
    let id = validate_item_id(&id)?;

    let item = state
        .inventory_service()
        .update(&id, patch, &user.email)
        .await?;

    Ok(Json(ApiResponse::success(item)))
}

/// `DELETE /api/inventory/{id}`
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    user.require(Role::ADMINS)?;
    let id = validate_item_id(&id)?;

    state.inventory_service().delete(&id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Item {id} deleted"
    )))))
}

/// `GET /api/inventory/stats/summary`
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<InventoryStats>>, ApiError> {
    let stats = state.inventory_service().stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// `GET /api/inventory/filter-options`
pub async fn filter_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FilterOptions>>, ApiError> {
    let options = state.inventory_service().filter_options().await?;
    Ok(Json(ApiResponse::success(options)))
}

/// `GET /api/inventory/brand-warehouses`
pub async fn brand_warehouses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<BTreeMap<String, Vec<String>>>>, ApiError> {
    let map = state.inventory_service().brand_warehouses().await?;
    Ok(Json(ApiResponse::success(map)))
}
