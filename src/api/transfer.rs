use axum::{
    Extension, Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CurrentUser};
use crate::domain::Role;
use crate::inventory::ImportReport;
use crate::services::ExportRequest;

/// `POST /api/inventory/import`
///
/// The body is the CSV text itself. Row failures are listed in the report;
/// the request only fails when the file as a whole is unreadable.
pub async fn import_items(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: String,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    user.require(Role::WRITERS)?;

    let report = state
        .transfer_service()
        .import_csv(&body, &user.email)
        .await?;

    Ok(Json(ApiResponse::success(report)))
}

/// `POST /api/inventory/export`
pub async fn export_items(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let file = state.transfer_service().export(&request).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.filename);

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
