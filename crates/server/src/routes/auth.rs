//! Login, session and password management for the admin account.

use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use db::models::{
    audit_log::{AuditAction, AuditLog},
    password_reset_token::PasswordResetToken,
    user::User,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use services::services::auth::{
    AuthError, SESSION_COOKIE, check_password_length, hash_password, verify_password,
};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{
    AppState,
    error::ApiError,
    middleware::{AdminContext, require_admin},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Serialize, TS)]
pub struct SessionInfo {
    pub email: String,
    pub name: Option<String>,
    pub must_change_password: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "currentPassword")]
    pub current_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestResetRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    #[serde(alias = "newPassword")]
    pub new_password: Option<String>,
}

/// `Set-Cookie` value carrying the session token.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}

fn with_cookie(cookie: String, body: impl IntoResponse) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(&cookie)
        .map_err(|_| ApiError::Auth(AuthError::InvalidToken))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok((headers, body).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Response, ApiError> {
    let email = payload.email.trim();

    let Some(user) = User::find_by_email(state.pool(), email).await? else {
        tracing::warn!(%email, "Login for unknown user");
        return Err(AuthError::InvalidCredentials.into());
    };

    if !verify_password(&payload.password, &user.password_hash).await? {
        tracing::warn!(%email, "Login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    if !state.config.is_admin_email(&user.email) {
        tracing::warn!(%email, "Login by non-admin account");
        return Err(AuthError::InvalidCredentials.into());
    }

    let session = state.sessions.issue(user.id, &user.email)?;
    tracing::info!(user_id = %user.id, "Admin signed in");

    let cookie = session_cookie(&session.token, state.sessions.ttl().num_seconds());
    with_cookie(
        cookie,
        ResponseJson(ApiResponse::<LoginResponse>::success(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user,
        })),
    )
}

pub async fn logout() -> Result<Response, ApiError> {
    with_cookie(
        session_cookie("", 0),
        ResponseJson(ApiResponse::<()>::success(())),
    )
}

pub async fn get_session(
    Extension(admin): Extension<AdminContext>,
) -> ResponseJson<ApiResponse<SessionInfo>> {
    ResponseJson(ApiResponse::success(SessionInfo {
        email: admin.user.email,
        name: admin.user.name,
        must_change_password: admin.user.must_change_password,
    }))
}

pub async fn change_password(
    Extension(admin): Extension<AdminContext>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<ChangePasswordRequest>, ApiError>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    check_password_length(&payload.new_password)?;

    if !verify_password(&payload.current_password, &admin.user.password_hash).await? {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    let hash = hash_password(&payload.new_password).await?;
    let actor = admin.actor_id();

    let mut tx = state.pool().begin().await?;
    User::update_password(&mut *tx, admin.user.id, &hash).await?;
    AuditLog::record(
        &mut *tx,
        &actor,
        AuditAction::ChangePassword,
        "user",
        Some(&actor),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = %admin.user.id, "Admin password changed");
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Always answers 200 for addresses that are not the admin account so the
/// endpoint cannot be used to discover which addresses exist.
pub async fn request_reset(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RequestResetRequest>, ApiError>,
) -> Result<ResponseJson<ApiResponse<serde_json::Value>>, ApiError> {
    let email = payload.email.trim();
    let ok = || ResponseJson(ApiResponse::<serde_json::Value>::success(json!({})));

    if !state.config.is_admin_email(email) {
        tracing::debug!("Reset requested for non-admin address");
        return Ok(ok());
    }

    let Some(user) = User::find_by_email(state.pool(), email).await? else {
        tracing::info!("Reset requested but admin user does not exist");
        return Ok(ok());
    };

    let token = PasswordResetToken::create(state.pool(), user.id).await?;
    let reset_url = format!(
        "{}/reset-password?token={}",
        state.config.app_base_url,
        urlencoding::encode(&token.token)
    );

    state
        .email
        .send_password_reset(&user.email, &reset_url, user.name.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "Password reset email sent");
    Ok(ok())
}

pub async fn reset_password(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<ResetPasswordRequest>, ApiError>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let (Some(token), Some(new_password)) = (
        payload.token.filter(|t| !t.is_empty()),
        payload.new_password,
    ) else {
        return Err(ApiError::bad_request("Invalid request"));
    };
    if check_password_length(&new_password).is_err() {
        return Err(ApiError::bad_request("Invalid request"));
    }

    let record = PasswordResetToken::find_by_token(state.pool(), &token)
        .await?
        .filter(|record| record.is_usable(Utc::now()))
        .ok_or_else(|| ApiError::bad_request("Token invalid or expired"))?;

    let hash = hash_password(&new_password).await?;
    let actor = record.user_id.to_string();

    let mut tx = state.pool().begin().await?;
    User::update_password(&mut *tx, record.user_id, &hash).await?;
    PasswordResetToken::mark_used(&mut *tx, record.id).await?;
    AuditLog::record(
        &mut *tx,
        &actor,
        AuditAction::ResetPassword,
        "user",
        Some(&actor),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = %record.user_id, "Password reset completed");
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let signed_in = Router::new()
        .route("/session", get(get_session))
        .route("/change-password", post(change_password))
        .layer(from_fn_with_state(state.clone(), require_admin));

    let open = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/request-reset", post(request_reset))
        .route("/reset-password", post(reset_password));

    Router::new().nest("/auth", open.merge(signed_in))
}
