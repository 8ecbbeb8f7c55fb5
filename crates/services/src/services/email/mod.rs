//! Transactional email.
//!
//! [`EmailService`] validates and renders messages, then hands them to a
//! [`Mailer`]. Which mailer is used depends on [`EmailConfig`]: Brevo or
//! Resend when an API key is present, otherwise [`LogMailer`], which only
//! writes the email to the log.

mod providers;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use db::validation::is_valid_email;
use thiserror::Error;

pub use providers::{BrevoMailer, LogMailer, ResendMailer};
pub use templates::{EmailTemplate, Notification};

use crate::services::config::{EmailConfig, EmailProvider};

/// Domain used in place of obviously local sender addresses.
pub const FALLBACK_SENDER_DOMAIN: &str = "nhungconsultancy.com";

const LOCAL_SENDER_MARKERS: &[&str] = &["localhost", "127.0.0.1", "example.com"];

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid email address: {0}")]
    InvalidRecipient(String),
    #[error("Email is incomplete: {0} is required")]
    Incomplete(&'static str),
    #[error("Invalid sender address: {0}")]
    InvalidSender(String),
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} API error ({status}): {body}")]
    Provider {
        provider: &'static str,
        status: u16,
        body: String,
    },
}

/// A fully rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// Sender address split into its optional display name and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub name: Option<String>,
    pub email: String,
}

impl Sender {
    /// Parse `Name <addr>` or a bare `addr`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(open) = raw.find('<') {
            let name = raw[..open].trim().trim_matches('"').trim();
            let email = raw[open + 1..].trim_end().trim_end_matches('>').trim();
            return Sender {
                name: (!name.is_empty()).then(|| name.to_string()),
                email: email.to_string(),
            };
        }
        Sender {
            name: None,
            email: raw.to_string(),
        }
    }

    /// Brevo rejects senders on local or placeholder domains; keep the local
    /// part and move it to the real domain.
    pub fn with_deliverable_domain(self) -> Self {
        if !LOCAL_SENDER_MARKERS
            .iter()
            .any(|marker| self.email.contains(marker))
        {
            return self;
        }
        let local = self.email.split('@').next().unwrap_or_default();
        Sender {
            name: self.name,
            email: format!("{local}@{FALLBACK_SENDER_DOMAIN}"),
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// Sender string as the chosen provider should see it.
pub fn normalize_sender(from: &str, provider: EmailProvider) -> String {
    let sender = Sender::parse(from);
    match provider {
        EmailProvider::Brevo => sender.with_deliverable_domain().to_string(),
        EmailProvider::Resend => sender.to_string(),
    }
}

#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
        }
    }

    /// Pick the provider from config, falling back to [`LogMailer`] without
    /// an API key.
    pub fn from_config(config: &EmailConfig) -> Self {
        let from = normalize_sender(&config.from, config.provider);
        let mailer: Arc<dyn Mailer> = match (&config.api_key, config.provider) {
            (Some(key), EmailProvider::Brevo) => Arc::new(BrevoMailer::new(key.clone())),
            (Some(key), EmailProvider::Resend) => Arc::new(ResendMailer::new(key.clone())),
            (None, provider) => {
                tracing::warn!(
                    ?provider,
                    "No email API key configured; outgoing email will only be logged"
                );
                Arc::new(LogMailer)
            }
        };
        Self::new(mailer, from)
    }

    pub fn provider_name(&self) -> &'static str {
        self.mailer.name()
    }

    pub async fn send(&self, to: &str, template: EmailTemplate) -> Result<(), EmailError> {
        let email = OutgoingEmail {
            from: self.from.clone(),
            to: to.trim().to_string(),
            subject: template.subject,
            html: template.html,
        };
        validate(&email)?;

        tracing::info!(
            provider = self.mailer.name(),
            to = %email.to,
            subject = %email.subject,
            "Sending email"
        );
        self.mailer.send(&email).await
    }

    pub async fn send_password_reset(
        &self,
        to: &str,
        reset_url: &str,
        user_name: Option<&str>,
    ) -> Result<(), EmailError> {
        self.send(to, templates::password_reset(reset_url, user_name))
            .await
    }

    pub async fn send_notification(
        &self,
        to: &str,
        notification: &Notification,
    ) -> Result<(), EmailError> {
        self.send(to, templates::notification(notification)).await
    }
}

fn validate(email: &OutgoingEmail) -> Result<(), EmailError> {
    if email.to.is_empty() {
        return Err(EmailError::Incomplete("to"));
    }
    if email.subject.trim().is_empty() {
        return Err(EmailError::Incomplete("subject"));
    }
    if email.html.trim().is_empty() {
        return Err(EmailError::Incomplete("html"));
    }
    if !is_valid_email(&email.to) {
        return Err(EmailError::InvalidRecipient(email.to.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    #[test]
    fn test_parse_sender_with_display_name() {
        let sender = Sender::parse("Nhung Consultancy <contact@nhungconsultancy.com>");
        assert_eq!(sender.name.as_deref(), Some("Nhung Consultancy"));
        assert_eq!(sender.email, "contact@nhungconsultancy.com");

        let bare = Sender::parse(" hello@example.org ");
        assert_eq!(bare.name, None);
        assert_eq!(bare.email, "hello@example.org");
    }

    #[test]
    fn test_brevo_rewrites_local_sender_domains() {
        assert_eq!(
            normalize_sender("Admin <noreply@localhost>", EmailProvider::Brevo),
            "Admin <noreply@nhungconsultancy.com>"
        );
        assert_eq!(
            normalize_sender("dev@example.com", EmailProvider::Brevo),
            "dev@nhungconsultancy.com"
        );
        assert_eq!(
            normalize_sender("Team <team@127.0.0.1>", EmailProvider::Brevo),
            "Team <team@nhungconsultancy.com>"
        );
        // Real domains and other providers are untouched
        assert_eq!(
            normalize_sender("Team <team@real.org>", EmailProvider::Brevo),
            "Team <team@real.org>"
        );
        assert_eq!(
            normalize_sender("dev@example.com", EmailProvider::Resend),
            "dev@example.com"
        );
    }

    #[tokio::test]
    async fn test_send_rejects_bad_recipient_without_contacting_mailer() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = EmailService::new(mailer.clone(), "Site <site@nhungconsultancy.com>");

        let result = service
            .send_password_reset("not-an-address", "https://x/reset", None)
            .await;
        assert!(matches!(result, Err(EmailError::InvalidRecipient(_))));

        let result = service
            .send(
                "admin@nhungconsultancy.com",
                EmailTemplate {
                    subject: " ".into(),
                    html: "<p>x</p>".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(EmailError::Incomplete("subject"))));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_uses_configured_sender() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = EmailService::new(mailer.clone(), "Site <site@nhungconsultancy.com>");

        service
            .send_password_reset(
                "admin@nhungconsultancy.com",
                "https://nhungconsultancy.com/reset-password?token=abc",
                Some("Nhung"),
            )
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "Site <site@nhungconsultancy.com>");
        assert!(sent[0].html.contains("reset-password?token=abc"));
    }
}
