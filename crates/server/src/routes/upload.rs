use axum::{
    Extension, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::post,
};
use axum_extra::extract::WithRejection;
use db::models::audit_log::{AuditAction, AuditLog};
use serde::Serialize;
use services::services::uploads::{MAX_UPLOAD_BYTES, UploadError};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{
    AppState,
    error::ApiError,
    middleware::{AdminContext, require_admin},
};

/// Request bodies up to this size reach the handler, so oversized files are
/// reported by the upload validator instead of a bare 413.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

#[derive(Debug, Serialize, TS)]
pub struct UploadResponse {
    pub path: String,
}

pub async fn upload_file(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(mut multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<ResponseJson<ApiResponse<UploadResponse>>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        let stored = state.uploads.save(&file_name, &data).await?;
        AuditLog::record(
            state.pool(),
            &admin.actor_id(),
            AuditAction::Upload,
            "upload",
            Some(&stored.file_name),
        )
        .await?;

        return Ok(ResponseJson(ApiResponse::success(UploadResponse {
            path: stored.path,
        })));
    }

    Err(UploadError::MissingFile.into())
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(upload_file)
            .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
            .layer(from_fn_with_state(state.clone(), require_admin)),
    )
}
