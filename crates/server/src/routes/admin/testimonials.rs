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
        testimonial::{CreateTestimonial, TestimonialDraft, UpdateTestimonial},
    },
    validation::{ValidationError, require_min_len},
};
use utils::response::ApiResponse;

use super::{IdQuery, deleted, found, partners::PublishSummary};
use crate::{AppState, error::ApiError, middleware::AdminContext};

const ENTITY: &str = "testimonial";

fn check_text(quote: Option<&str>, author: Option<&str>) -> Result<(), ValidationError> {
    if let Some(quote) = quote {
        require_min_len("quote", quote, 1)?;
    }
    if let Some(author) = author {
        require_min_len("author", author, 1)?;
    }
    Ok(())
}

pub async fn list_drafts(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<TestimonialDraft>>>, ApiError> {
    let testimonials = TestimonialDraft::list(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(testimonials)))
}

pub async fn create_draft(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateTestimonial>, ApiError>,
) -> Result<ResponseJson<ApiResponse<TestimonialDraft>>, ApiError> {
    check_text(Some(&payload.quote), Some(&payload.author))?;

    let testimonial = TestimonialDraft::create(state.pool(), &payload).await?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::Create,
        ENTITY,
        Some(&testimonial.id.to_string()),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(testimonial)))
}

pub async fn update_draft(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateTestimonial>, ApiError>,
) -> Result<ResponseJson<ApiResponse<TestimonialDraft>>, ApiError> {
    check_text(payload.quote.as_deref(), payload.author.as_deref())?;

    let testimonial = found(TestimonialDraft::update(state.pool(), &payload).await?)?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::Update,
        ENTITY,
        Some(&testimonial.id.to_string()),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(testimonial)))
}

pub async fn delete_draft(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<IdQuery>, ApiError>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = query.require()?;
    deleted(TestimonialDraft::delete(state.pool(), id).await?)?;
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

pub async fn publish(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<PublishSummary>>, ApiError> {
    let mut tx = state.pool().begin().await?;
    let published = TestimonialDraft::publish(&mut *tx).await?;
    AuditLog::record(&mut *tx, &admin.actor_id(), AuditAction::Publish, ENTITY, None).await?;
    tx.commit().await?;

    tracing::info!(published, "Published testimonials");
    Ok(ResponseJson(ApiResponse::success(PublishSummary { published })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/testimonials/draft",
            get(list_drafts)
                .post(create_draft)
                .put(update_draft)
                .delete(delete_draft),
        )
        .route("/testimonials/publish", post(publish))
}
