use std::str::FromStr;

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
};
use axum_extra::extract::WithRejection;
use db::models::{
    audit_log::{AuditAction, AuditLog},
    contact_message::{ContactMessage, MessageStatus},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::{IdQuery, deleted, found};
use crate::{AppState, error::ApiError, middleware::AdminContext};

/// Newest messages returned by the inbox listing
const INBOX_LIMIT: i64 = 200;

#[derive(Debug, Serialize, TS)]
pub struct Inbox {
    pub items: Vec<ContactMessage>,
    pub unread: i64,
}

/// Fields are loose strings so malformed input gets a plain 400.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateMessageStatus {
    pub id: Option<String>,
    pub status: Option<String>,
}

impl UpdateMessageStatus {
    fn parse(&self) -> Option<(Uuid, MessageStatus)> {
        let id = Uuid::parse_str(self.id.as_deref()?.trim()).ok()?;
        let status = MessageStatus::from_str(self.status.as_deref()?).ok()?;
        Some((id, status))
    }
}

pub async fn list_messages(State(state): State<AppState>) -> Result<Response, ApiError> {
    let pool = state.pool();
    let (items, unread) = tokio::try_join!(
        ContactMessage::find_recent(pool, INBOX_LIMIT),
        ContactMessage::count_by_status(pool, MessageStatus::New),
    )?;

    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        ResponseJson(ApiResponse::<Inbox>::success(Inbox { items, unread })),
    )
        .into_response())
}

pub async fn update_message(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateMessageStatus>, ApiError>,
) -> Result<ResponseJson<ApiResponse<ContactMessage>>, ApiError> {
    let (id, status) = payload
        .parse()
        .ok_or_else(|| ApiError::bad_request("Bad request"))?;

    let message = found(ContactMessage::update_status(state.pool(), id, status).await?)?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::UpdateStatus,
        "contact_message",
        Some(&id.to_string()),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(message)))
}

pub async fn delete_message(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<IdQuery>, ApiError>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = query.require()?;
    deleted(ContactMessage::delete(state.pool(), id).await?)?;
    AuditLog::record(
        state.pool(),
        &admin.actor_id(),
        AuditAction::Delete,
        "contact_message",
        Some(&id.to_string()),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/messages",
        get(list_messages)
            .put(update_message)
            .delete(delete_message),
    )
}
