//! Admin CMS API. Everything here sits behind [`require_admin`] and every
//! mutation appends to the audit log.

use axum::{Router, middleware::from_fn_with_state};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::require_admin};

pub mod audit;
pub mod dashboard;
pub mod homepage;
pub mod messages;
pub mod metrics;
pub mod partners;
pub mod projects;
pub mod settings;
pub mod testimonials;

/// `?id=` on DELETE endpoints
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    /// Missing id is a client error; an id that is not a UUID cannot match
    /// any row.
    pub fn require(&self) -> Result<Uuid, ApiError> {
        let raw = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::bad_request("Missing id"))?;
        Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Not found".to_string()))
    }
}

/// Map "no rows touched" to 404.
pub(crate) fn found<T>(value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

pub(crate) fn deleted(rows_affected: u64) -> Result<(), ApiError> {
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        Ok(())
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    let inner = Router::new()
        .merge(dashboard::router())
        .merge(messages::router())
        .merge(projects::router())
        .merge(settings::router())
        .merge(homepage::router())
        .merge(metrics::router())
        .merge(partners::router())
        .merge(testimonials::router())
        .merge(audit::router())
        .layer(from_fn_with_state(state.clone(), require_admin));

    Router::new().nest("/admin", inner)
}
