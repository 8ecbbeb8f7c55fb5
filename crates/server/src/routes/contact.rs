use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::post,
};
use chrono::Utc;
use db::{
    models::contact_message::{ContactMessage, CreateContactMessage},
    validation::{require_email, require_min_len},
};
use serde::Deserialize;
use services::services::email::{Notification, templates::escape_html};
use utils::response::ApiResponse;

use crate::{
    AppState,
    error::{ApiError, FieldIssue},
    middleware::ClientIp,
};

/// Raw form body. Every field is optional here so missing values surface as
/// validation issues rather than JSON errors.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub organization: String,
    pub phone: Option<String>,
    #[serde(alias = "projectType")]
    pub project_type: String,
    pub timeline: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    /// reCAPTCHA token
    pub token: Option<String>,
}

impl ContactSubmission {
    /// Collect every failing field instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let checks = [
            require_min_len("name", &self.name, 2),
            require_email("email", self.email.trim()),
            require_min_len("organization", &self.organization, 1),
            require_min_len("project_type", &self.project_type, 1),
            require_min_len("message", &self.message, 10),
        ];
        let issues: Vec<FieldIssue> = checks
            .iter()
            .filter_map(|check| check.as_ref().err())
            .map(FieldIssue::from)
            .collect();
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    fn into_message(self) -> CreateContactMessage {
        CreateContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            organization: self.organization.trim().to_string(),
            phone: non_empty(self.phone),
            project_type: self.project_type.trim().to_string(),
            timeline: non_empty(self.timeline),
            subject: non_empty(self.subject),
            message: self.message,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Admin notification for a stored message. All user text is escaped.
pub fn notification_for(message: &ContactMessage) -> Notification {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let lines = [
        format!("Name: {}", message.name),
        format!("Email: {}", message.email),
        format!("Organization: {}", message.organization),
        format!("Phone: {}", optional(&message.phone)),
        format!("Project Type: {}", message.project_type),
        format!("Timeline: {}", optional(&message.timeline)),
        format!("Subject: {}", optional(&message.subject)),
    ];
    let details = lines
        .iter()
        .map(|line| format!("&bull; {}", escape_html(line)))
        .collect::<Vec<_>>()
        .join("<br>");
    let body = escape_html(&message.message).replace('\n', "<br>");

    let title = if message.organization.is_empty() {
        format!("New contact message from {}", message.name)
    } else {
        format!(
            "New contact message from {} \u{2014} {}",
            message.name, message.organization
        )
    };

    Notification {
        title,
        message_html: format!("{details}<br><br><strong>Message:</strong><br>{body}"),
        action_url: Some(format!("mailto:{}", message.email)),
        action_text: Some("Reply".to_string()),
    }
}

pub async fn submit_contact(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    body: Bytes,
) -> Result<Response, ApiError> {
    let decision = state.contact_limiter.check(&format!("contact:{ip}"));
    if !decision.allowed {
        tracing::info!(%ip, "Contact form rate limited");
        return Err(ApiError::RateLimited {
            retry_after_secs: decision.retry_after_secs(Utc::now()),
            reset_at_millis: decision.reset_at_millis(),
        });
    }

    let json: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(serde_json::Value::Null) | Err(_) => return Err(ApiError::bad_request("Invalid JSON")),
        Ok(value) => value,
    };
    let submission: ContactSubmission =
        serde_json::from_value(json).map_err(|e| ApiError::InvalidFields {
            message: "Validation failed".to_string(),
            issues: vec![FieldIssue::new("body", e.to_string())],
        })?;
    submission
        .validate()
        .map_err(|issues| ApiError::InvalidFields {
            message: "Validation failed".to_string(),
            issues,
        })?;

    let remote_ip = (ip != "unknown").then_some(ip.as_str());
    if !state
        .recaptcha
        .verify(submission.token.as_deref(), remote_ip)
        .await
    {
        return Err(ApiError::bad_request("reCAPTCHA verification failed"));
    }

    let message = ContactMessage::create(state.pool(), &submission.into_message()).await?;
    tracing::info!(message_id = %message.id, "Stored contact message");

    let notification = notification_for(&message);
    if let Err(e) = state
        .email
        .send_notification(&state.config.contact_notify_email, &notification)
        .await
    {
        tracing::error!("Failed to send contact notification: {}", e);
    }

    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(decision.reset_at_millis()),
    );
    Ok((headers, ResponseJson(ApiResponse::<()>::success(()))).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}
