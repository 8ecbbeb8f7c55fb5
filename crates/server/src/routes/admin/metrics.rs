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
        metrics::{SaveMetricsDraft, SiteMetrics},
    },
    validation::{ValidationError, require_non_negative},
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::AdminContext};

const ENTITY: &str = "metrics";

fn validate(draft: &SaveMetricsDraft) -> Result<(), ValidationError> {
    require_non_negative("years_experience", draft.years_experience)?;
    require_non_negative("projects_led", draft.projects_led)?;
    require_non_negative("countries", draft.countries)?;
    require_non_negative("portfolio_value", draft.portfolio_value)
}

pub async fn get_draft(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Option<SiteMetrics>>>, ApiError> {
    let draft = SiteMetrics::find(state.pool(), ContentStage::Draft).await?;
    Ok(ResponseJson(ApiResponse::success(draft)))
}

pub async fn save_draft(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<SaveMetricsDraft>, ApiError>,
) -> Result<ResponseJson<ApiResponse<SiteMetrics>>, ApiError> {
    validate(&payload)?;

    let draft = SiteMetrics::save_draft(state.pool(), &payload).await?;
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
) -> Result<ResponseJson<ApiResponse<SiteMetrics>>, ApiError> {
    let mut tx = state.pool().begin().await?;
    let Some(published) = SiteMetrics::publish(&mut *tx).await? else {
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

    tracing::info!("Published metrics");
    Ok(ResponseJson(ApiResponse::success(published)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metrics/draft", get(get_draft).post(save_draft))
        .route("/metrics/publish", post(publish))
}
