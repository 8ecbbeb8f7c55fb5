use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use axum_extra::extract::WithRejection;
use db::models::audit_log::AuditLog;
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

impl AuditQuery {
    fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

pub async fn list_audit_log(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AuditQuery>, ApiError>,
) -> Result<ResponseJson<ApiResponse<Vec<AuditLog>>>, ApiError> {
    let entries = AuditLog::find_recent(state.pool(), query.effective_limit()).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/audit-log", get(list_audit_log))
}
