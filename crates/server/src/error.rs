use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use db::validation::ValidationError;
use serde::Serialize;
use serde_json::json;
use services::services::{auth::AuthError, email::EmailError, uploads::UploadError};
use thiserror::Error;
use utils::response::ApiResponse;

/// One failed field from request validation
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<&ValidationError> for FieldIssue {
    fn from(err: &ValidationError) -> Self {
        FieldIssue::new(err.field().unwrap_or("body"), err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    MultipartRejection(#[from] MultipartRejection),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error(transparent)]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    InvalidFields {
        message: String,
        issues: Vec<FieldIssue>,
    },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("Too many requests. Please try again later.")]
    RateLimited {
        retry_after_secs: u64,
        reset_at_millis: i64,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Database(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Upload(UploadError::Io(_)) => internal(),
            ApiError::Upload(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Auth(AuthError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::Auth(AuthError::PasswordTooShort) => {
                (StatusCode::BAD_REQUEST, AuthError::PasswordTooShort.to_string())
            }
            ApiError::Auth(AuthError::InvalidToken | AuthError::TokenExpired) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            ApiError::Email(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send email".to_string(),
            ),
            ApiError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                (StatusCode::BAD_REQUEST, "File too large".to_string())
            }
            ApiError::Multipart(_) | ApiError::MultipartRejection(_) => {
                (StatusCode::BAD_REQUEST, "Invalid upload".to_string())
            }
            ApiError::Json(JsonRejection::JsonDataError(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
            }
            ApiError::Json(_) => (StatusCode::BAD_REQUEST, "Invalid JSON".to_string()),
            ApiError::Query(_) => (StatusCode::BAD_REQUEST, "Invalid query".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidFields { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ApiError::Database(_) | ApiError::Auth(_) | ApiError::Io(_) => internal(),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        } else {
            tracing::debug!(%status, error = %self, "Request rejected");
        }

        match self {
            ApiError::InvalidFields { issues, .. } => {
                let body = ApiResponse::<(), Vec<FieldIssue>>::error_with_data(&message, issues);
                (status, Json(body)).into_response()
            }
            ApiError::RateLimited {
                retry_after_secs,
                reset_at_millis,
            } => {
                let body = ApiResponse::<(), serde_json::Value>::error_with_data(
                    &message,
                    json!({ "retry_after": retry_after_secs }),
                );
                let mut response = (status, Json(body)).into_response();
                let headers = response.headers_mut();
                headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
                headers.insert("x-ratelimit-reset", HeaderValue::from(reset_at_millis));
                response
            }
            _ => (status, Json(ApiResponse::<()>::error(&message))).into_response(),
        }
    }
}
