use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use axum_extra::extract::WithRejection;
use db::{
    models::{
        audit_log::{AuditAction, AuditLog},
        project::{CreateProject, Project, UpdateProject},
    },
    validation::{ValidationError, require_min_len, require_range},
};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::{IdQuery, deleted, found};
use crate::{AppState, error::ApiError, middleware::AdminContext};

const ENTITY: &str = "project";

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub changes: UpdateProject,
}

fn check_progress(progress: Option<i64>) -> Result<(), ValidationError> {
    match progress {
        Some(value) => require_range("progress", value, 0, 100),
        None => Ok(()),
    }
}

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = Project::find_all(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn create_project(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateProject>, ApiError>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    require_min_len("title", &payload.title, 1)?;
    check_progress(payload.progress)?;

    let project = Project::create(state.pool(), &payload).await?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::Create,
        ENTITY,
        Some(&project.id.to_string()),
    )
    .await?;

    tracing::info!(project_id = %project.id, "Created project");
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn update_project(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateProjectRequest>, ApiError>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    if let Some(title) = &payload.changes.title {
        require_min_len("title", title, 1)?;
    }
    check_progress(payload.changes.progress)?;

    let project = found(Project::update(state.pool(), payload.id, &payload.changes).await?)?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::Update,
        ENTITY,
        Some(&project.id.to_string()),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn delete_project(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<IdQuery>, ApiError>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = query.require()?;
    deleted(Project::delete(state.pool(), id).await?)?;
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

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/projects",
        get(list_projects)
            .post(create_project)
            .put(update_project)
            .delete(delete_project),
    )
}
