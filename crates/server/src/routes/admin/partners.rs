use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use db::{
    models::{
        audit_log::{AuditAction, AuditLog},
        partner::{CreatePartner, PartnerDraft, UpdatePartner},
    },
    validation::require_min_len,
};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use super::{IdQuery, deleted, found};
use crate::{AppState, error::ApiError, middleware::AdminContext};

const ENTITY: &str = "partner";

/// Result of copying a draft list to its published table
#[derive(Debug, Serialize, TS)]
pub struct PublishSummary {
    pub published: u64,
}

pub async fn list_drafts(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<PartnerDraft>>>, ApiError> {
    let partners = PartnerDraft::list(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(partners)))
}

pub async fn create_draft(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePartner>, ApiError>,
) -> Result<ResponseJson<ApiResponse<PartnerDraft>>, ApiError> {
    require_min_len("name", &payload.name, 1)?;

    let partner = PartnerDraft::create(state.pool(), &payload).await?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::Create,
        ENTITY,
        Some(&partner.id.to_string()),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(partner)))
}

pub async fn update_draft(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdatePartner>, ApiError>,
) -> Result<ResponseJson<ApiResponse<PartnerDraft>>, ApiError> {
    if let Some(name) = &payload.name {
        require_min_len("name", name, 1)?;
    }

    let partner = found(PartnerDraft::update(state.pool(), &payload).await?)?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::Update,
        ENTITY,
        Some(&partner.id.to_string()),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(partner)))
}

pub async fn delete_draft(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<IdQuery>, ApiError>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = query.require()?;
    deleted(PartnerDraft::delete(state.pool(), id).await?)?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::Delete,
        ENTITY,
        Some(&id.to_string()),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(())))
}

/// Replace the public partner list with every visible draft.
pub async fn publish(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<PublishSummary>>, ApiError> {
    let mut tx = state.pool().begin().await?;
    let published = PartnerDraft::publish(&mut *tx).await?;
    AuditLog::record(&mut *tx, &admin.actor_id(), AuditAction::Publish, ENTITY, None).await?;
    tx.commit().await?;

    tracing::info!(published, "Published partners");
    Ok(ResponseJson(ApiResponse::success(PublishSummary { published })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/partners/draft",
            get(list_drafts)
                .post(create_draft)
                .put(update_draft)
                .delete(delete_draft),
        )
        .route("/partners/publish", post(publish))
}
