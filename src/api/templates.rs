use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_template_id;
use super::{ApiError, ApiResponse, AppState, CurrentUser, MessageResponse};
use crate::db::ExportTemplate;
use crate::services::NewTemplate;

/// `GET /api/export-templates`
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ExportTemplate>>>, ApiError> {
    let templates = state.template_service().list(&user.email).await?;
    Ok(Json(ApiResponse::success(templates)))
}

/// `POST /api/export-templates`
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<NewTemplate>,
) -> Result<(StatusCode, Json<ApiResponse<ExportTemplate>>), ApiError> {
    let template = state
        .template_service()
        .create(&user.email, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(template))))
}

/// `DELETE /api/export-templates/{id}`
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_template_id(&id)?;
    state.template_service().delete(&user.email, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Template deleted",
    ))))
}
