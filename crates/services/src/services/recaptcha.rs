use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Google reCAPTCHA token check. Disabled when no secret is configured.
#[derive(Clone)]
pub struct RecaptchaVerifier {
    http: Client,
    secret: Option<SecretString>,
}

impl RecaptchaVerifier {
    pub fn new(secret: Option<SecretString>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { http, secret }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Returns true when the submission may proceed.
    ///
    /// Verification only happens when a secret is configured and the client
    /// sent a token; otherwise the check passes. Network and decode errors
    /// count as a failed check.
    pub async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> bool {
        let (Some(secret), Some(token)) = (&self.secret, token.filter(|t| !t.is_empty())) else {
            return true;
        };

        let mut form = vec![
            ("secret", secret.expose_secret().to_string()),
            ("response", token.to_string()),
        ];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip.to_string()));
        }

        let response = match self.http.post(SITEVERIFY_URL).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("reCAPTCHA request failed: {}", e);
                return false;
            }
        };

        match response.json::<SiteVerifyResponse>().await {
            Ok(body) => {
                if !body.success {
                    tracing::info!(errors = ?body.error_codes, "reCAPTCHA rejected token");
                }
                body.success
            }
            Err(e) => {
                tracing::warn!("reCAPTCHA response could not be decoded: {}", e);
                false
            }
        }
    }
}
