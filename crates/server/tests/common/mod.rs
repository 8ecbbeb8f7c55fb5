#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use db::{
    DBService,
    models::user::{CreateUser, User},
    test_utils::create_test_db,
};
use serde_json::Value;
use server::{AppState, routes};
use services::services::{
    auth::hash_password_with_cost,
    config::ServerConfig,
    email::{EmailError, EmailService, Mailer, OutgoingEmail},
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "owner@folio.test";
pub const ADMIN_PASSWORD: &str = "initial-password";

/// Keeps every email instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
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

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub admin: User,
    _assets: TempDir,
    _db_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

pub fn test_config(assets: &TempDir) -> ServerConfig {
    let mut config = ServerConfig::from_lookup(|key| match key {
        "FOLIO_ADMIN_EMAIL" => Some(ADMIN_EMAIL.to_string()),
        "FOLIO_SESSION_SECRET" => Some("integration-test-secret".to_string()),
        "FOLIO_APP_BASE_URL" => Some("https://folio.test".to_string()),
        "FOLIO_CONTACT_NOTIFY_EMAIL" => Some("inbox@folio.test".to_string()),
        _ => None,
    })
    .unwrap();
    config.upload_dir = assets.path().join("uploads");
    config.static_dir = assets.path().join("dist");
    config
}

impl TestApp {
    pub async fn new() -> Self {
        let assets = TempDir::new().unwrap();
        let (db, db_dir): (DBService, TempDir) = create_test_db().await;
        let config = test_config(&assets);

        let mailer = Arc::new(RecordingMailer::default());
        let email = EmailService::new(mailer.clone(), "Folio <noreply@folio.test>");
        let state = AppState::with_email(db, config, email);

        let admin = User::create(
            state.pool(),
            &CreateUser {
                email: ADMIN_EMAIL.to_string(),
                name: Some("Owner".to_string()),
                password_hash: hash_password_with_cost(ADMIN_PASSWORD, 4).await.unwrap(),
                must_change_password: true,
            },
        )
        .await
        .unwrap();

        let router = routes::router(state.clone());

        Self {
            state,
            router,
            mailer,
            admin,
            _assets: assets,
            _db_dir: db_dir,
        }
    }

    pub fn admin_token(&self) -> String {
        self.state
            .sessions
            .issue(self.admin.id, &self.admin.email)
            .unwrap()
            .token
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, token, Body::empty())).await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let mut req = request(method, uri, token, Body::from(body.to_string()));
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        self.send(req).await
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).unwrap()
}
