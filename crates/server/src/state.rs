use std::sync::Arc;

use db::DBService;
use services::services::{
    auth::SessionService,
    config::ServerConfig,
    email::EmailService,
    rate_limit::RateLimiter,
    recaptcha::RecaptchaVerifier,
    uploads::UploadStore,
};
use sqlx::SqlitePool;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<SessionService>,
    pub email: EmailService,
    pub contact_limiter: Arc<RateLimiter>,
    pub recaptcha: RecaptchaVerifier,
    pub uploads: UploadStore,
}

impl AppState {
    /// Wire every service from `config`.
    pub fn new(db: DBService, config: ServerConfig) -> Self {
        let email = EmailService::from_config(&config.email);
        Self::with_email(db, config, email)
    }

    /// Same as [`AppState::new`] with a caller-supplied email service.
    pub fn with_email(db: DBService, config: ServerConfig, email: EmailService) -> Self {
        let sessions = Arc::new(SessionService::new(&config.session_secret));
        let contact_limiter = Arc::new(RateLimiter::new(
            config.contact_rate_limit,
            config.contact_rate_window,
        ));
        let recaptcha = RecaptchaVerifier::new(config.recaptcha_secret.clone());
        let uploads = UploadStore::new(config.upload_dir.clone());

        Self {
            db,
            config: Arc::new(config),
            sessions,
            email,
            contact_limiter,
            recaptcha,
            uploads,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
