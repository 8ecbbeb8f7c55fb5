use axum::{
    Extension, Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use db::{
    models::{
        ContentStage, SINGLETON_ID,
        audit_log::{AuditAction, AuditLog},
        homepage::{HomepageContent, SaveHomepageDraft},
    },
    validation::require_min_len,
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::AdminContext};

const ENTITY: &str = "homepage";

pub async fn get_draft(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Option<HomepageContent>>>, ApiError> {
    let draft = HomepageContent::find(state.pool(), ContentStage::Draft).await?;
    Ok(ResponseJson(ApiResponse::success(draft)))
}

pub async fn save_draft(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<SaveHomepageDraft>, ApiError>,
) -> Result<ResponseJson<ApiResponse<HomepageContent>>, ApiError> {
    require_min_len("Headline", &payload.headline, 3)?;

    let draft = HomepageContent::save_draft(state.pool(), &payload).await?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::SaveDraft,
        ENTITY,
        Some(SINGLETON_ID),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(draft)))
}

pub async fn publish(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<HomepageContent>>, ApiError> {
    let mut tx = state.pool().begin().await?;
    let Some(published) = HomepageContent::publish(&mut *tx).await? else {
        return Err(ApiError::bad_request("No draft"));
    };
    AuditLog::record(
        &mut *tx,
        &admin.actor_id(),
        AuditAction::Publish,
        ENTITY,
        Some(SINGLETON_ID),
    )
    .await?;
    tx.commit().await?;

    tracing::info!("Published homepage");
    Ok(ResponseJson(ApiResponse::success(published)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/homepage/draft", get(get_draft).post(save_draft))
        .route("/homepage/publish", post(publish))
}
