use axum::{
    Extension, Json, Router, extract::State, response::Json as ResponseJson, routing::get,
};
use axum_extra::extract::WithRejection;
use db::models::{
    audit_log::{AuditAction, AuditLog},
    site_settings::{SETTINGS_ID, SiteSettings, UpdateSiteSettings},
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::AdminContext};

pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<SiteSettings>>, ApiError> {
    let settings = SiteSettings::get(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(settings)))
}

/// Only the fields present in the body change.
pub async fn update_settings(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateSiteSettings>, ApiError>,
) -> Result<ResponseJson<ApiResponse<SiteSettings>>, ApiError> {
    let settings = SiteSettings::upsert(state.pool(), &payload).await?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::UpdateSettings,
        "site_settings",
        Some(SETTINGS_ID),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(settings)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).post(update_settings))
}
