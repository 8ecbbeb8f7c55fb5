use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::{
    contact_message::{ContactMessage, MessageStatus},
    project::Project,
};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize, TS)]
pub struct DashboardSummary {
    pub unread_messages: i64,
    pub total_messages: i64,
    pub total_projects: i64,
    pub published_projects: i64,
}

pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<DashboardSummary>>, ApiError> {
    let pool = state.pool();
    let (unread_messages, total_messages, total_projects, published_projects) = tokio::try_join!(
        ContactMessage::count_by_status(pool, MessageStatus::New),
        ContactMessage::count(pool),
        Project::count(pool),
        Project::count_published(pool),
    )?;

    Ok(ResponseJson(ApiResponse::success(DashboardSummary {
        unread_messages,
        total_messages,
        total_projects,
        published_projects,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}
