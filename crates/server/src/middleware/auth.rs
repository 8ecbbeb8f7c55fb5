//! Admin email gate.
//!
//! There is a single privileged account. A request is admin when it carries a
//! valid session token whose email equals the configured admin email and
//! whose user row still exists.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use db::models::user::User;
use services::services::auth::SESSION_COOKIE;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Inserted into request extensions by [`require_admin`].
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user: User,
}

impl AdminContext {
    /// Id recorded in the audit log
    pub fn actor_id(&self) -> String {
        self.user.id.to_string()
    }
}

/// Session token from the `Authorization: Bearer` header or the session
/// cookie, in that order.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_owned());
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

/// Resolve the admin user for a request, if any.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = session_token(headers).ok_or(ApiError::Unauthorized)?;

    let claims = state.sessions.verify(&token).map_err(|error| {
        warn!(?error, "rejected session token");
        ApiError::Unauthorized
    })?;

    if !state.config.is_admin_email(&claims.email) {
        warn!(email = %claims.email, "session email is not the admin email");
        return Err(ApiError::Unauthorized);
    }

    let user = User::find_by_id(state.pool(), claims.sub)
        .await?
        .ok_or_else(|| {
            warn!("user `{}` missing", claims.sub);
            ApiError::Unauthorized
        })?;

    if !state.config.is_admin_email(&user.email) {
        return Err(ApiError::Unauthorized);
    }

    Ok(user)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(AdminContext { user });
            next.run(req).await
        }
        Err(error) => error.into_response(),
    }
}
