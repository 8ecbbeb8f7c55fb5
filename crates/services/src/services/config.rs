//! Server configuration read from the environment.
//!
//! Every value has a default so a bare `cargo run` works locally; production
//! deployments set the secrets and API keys through env vars or `.env`.

use std::{path::PathBuf, str::FromStr, time::Duration};

use rand::{Rng, distr::Alphanumeric};
use secrecy::SecretString;
use thiserror::Error;
use utils::assets::{static_dir, upload_dir};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ADMIN_EMAIL: &str = "nhungconsultancy@gmail.com";
pub const DEFAULT_NOTIFY_EMAIL: &str = "contact@nhungconsultancy.com";
pub const DEFAULT_EMAIL_FROM: &str = "Nhung Consultancy <contact@nhungconsultancy.com>";
pub const DEFAULT_CONTACT_RATE_LIMIT: u32 = 5;
pub const DEFAULT_CONTACT_RATE_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
    #[error("Unsupported email provider: '{0}'. Valid values: brevo, resend")]
    UnknownEmailProvider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailProvider {
    #[default]
    Brevo,
    Resend,
}

impl FromStr for EmailProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brevo" => Ok(EmailProvider::Brevo),
            "resend" => Ok(EmailProvider::Resend),
            other => Err(ConfigError::UnknownEmailProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub from: String,
    /// Key for the selected provider. `None` means emails are only logged.
    pub api_key: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_email: String,
    pub session_secret: SecretString,
    /// True when no secret was configured and one was generated for this
    /// process. Sessions will not survive a restart.
    pub session_secret_generated: bool,
    pub app_base_url: String,
    pub contact_notify_email: String,
    pub email: EmailConfig,
    pub recaptcha_secret: Option<SecretString>,
    pub contact_rate_limit: u32,
    pub contact_rate_window: Duration,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("BACKEND_PORT").or_else(|| get("PORT")) {
            Some(raw) => parse_value("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let (session_secret, session_secret_generated) = match get("FOLIO_SESSION_SECRET") {
            Some(secret) => (SecretString::from(secret), false),
            None => (SecretString::from(random_secret()), true),
        };

        let provider = match get("FOLIO_EMAIL_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => EmailProvider::default(),
        };
        let api_key = match provider {
            EmailProvider::Brevo => get("BREVO_API_KEY"),
            EmailProvider::Resend => get("RESEND_API_KEY"),
        }
        .map(SecretString::from);

        let contact_rate_limit = match get("FOLIO_CONTACT_RATE_LIMIT") {
            Some(raw) => parse_value("FOLIO_CONTACT_RATE_LIMIT", &raw)?,
            None => DEFAULT_CONTACT_RATE_LIMIT,
        };
        let contact_rate_window = match get("FOLIO_CONTACT_RATE_WINDOW_SECS") {
            Some(raw) => Duration::from_secs(parse_value("FOLIO_CONTACT_RATE_WINDOW_SECS", &raw)?),
            None => DEFAULT_CONTACT_RATE_WINDOW,
        };

        let app_base_url = get("FOLIO_APP_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        Ok(ServerConfig {
            admin_email: get("FOLIO_ADMIN_EMAIL")
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string())
                .to_lowercase(),
            session_secret,
            session_secret_generated,
            app_base_url,
            contact_notify_email: get("FOLIO_CONTACT_NOTIFY_EMAIL")
                .unwrap_or_else(|| DEFAULT_NOTIFY_EMAIL.to_string()),
            email: EmailConfig {
                provider,
                from: get("FOLIO_EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
                api_key,
            },
            recaptcha_secret: get("FOLIO_RECAPTCHA_SECRET").map(SecretString::from),
            contact_rate_limit,
            contact_rate_window,
            upload_dir: upload_dir(),
            static_dir: static_dir(),
            host,
            port,
        })
    }

    /// Whether `email` is the configured admin address (ASCII case-insensitive).
    pub fn is_admin_email(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.admin_email)
    }
}

fn parse_value<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}

fn random_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
