use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use utils::build_info::BUILD_INFO;

use super::{EmailError, Mailer, OutgoingEmail, Sender};

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";
const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const DEFAULT_SENDER_NAME: &str = "Nhung Consultancy";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(BUILD_INFO.user_agent())
        .build()
        .unwrap_or_default()
}

/// Turn a non-2xx response into [`EmailError::Provider`].
async fn check_response(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<(), EmailError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(EmailError::Provider {
        provider,
        status: status.as_u16(),
        body,
    })
}

pub struct BrevoMailer {
    http: Client,
    api_key: SecretString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmail<'a> {
    sender: BrevoContact<'a>,
    to: [BrevoContact<'a>; 1],
    subject: &'a str,
    html_content: &'a str,
}

#[derive(Serialize)]
struct BrevoContact<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
}

impl BrevoMailer {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            http: http_client(),
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    fn name(&self) -> &'static str {
        "Brevo"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let sender = Sender::parse(&email.from).with_deliverable_domain();
        if !db::validation::is_valid_email(&sender.email) {
            return Err(EmailError::InvalidSender(sender.email));
        }

        let payload = BrevoEmail {
            sender: BrevoContact {
                name: Some(sender.name.as_deref().unwrap_or(DEFAULT_SENDER_NAME)),
                email: &sender.email,
            },
            to: [BrevoContact {
                name: None,
                email: &email.to,
            }],
            subject: &email.subject,
            html_content: &email.html,
        };

        let response = self
            .http
            .post(BREVO_ENDPOINT)
            .header("api-key", self.api_key.expose_secret())
            .header("accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|source| EmailError::Transport {
                provider: "Brevo",
                source,
            })?;

        check_response("Brevo", response).await
    }
}

pub struct ResendMailer {
    http: Client,
    api_key: SecretString,
}

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendMailer {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            http: http_client(),
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    fn name(&self) -> &'static str {
        "Resend"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(self.api_key.expose_secret())
            .json(&ResendEmail {
                from: &email.from,
                to: [&email.to],
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await
            .map_err(|source| EmailError::Transport {
                provider: "Resend",
                source,
            })?;

        check_response("Resend", response).await
    }
}

/// Used when no provider key is configured. Nothing leaves the process.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            html_len = email.html.len(),
            "Email not sent (no provider configured)"
        );
        Ok(())
    }
}
