mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, TestApp};
use db::models::{
    password_reset_token::PasswordResetToken,
    user::{CreateUser, User},
};
use serde_json::json;
use services::services::auth::hash_password_with_cost;

#[tokio::test]
async fn admin_routes_reject_missing_or_bad_tokens() {
    let app = TestApp::new().await;

    for uri in [
        "/api/admin/dashboard",
        "/api/admin/messages",
        "/api/admin/audit-log",
        "/api/auth/session",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.message(), "Unauthorized");
    }

    let response = app.get("/api/admin/dashboard", Some("not-a-jwt")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_for_other_email_is_rejected() {
    let app = TestApp::new().await;
    let other = User::create(
        app.state.pool(),
        &CreateUser {
            email: "editor@folio.test".to_string(),
            name: None,
            password_hash: hash_password_with_cost("whatever-pass", 4).await.unwrap(),
            must_change_password: false,
        },
    )
    .await
    .unwrap();

    let token = app.state.sessions.issue(other.id, &other.email).unwrap().token;
    let response = app.get("/api/admin/dashboard", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Admin email but a user id that does not exist
    let token = app
        .state
        .sessions
        .issue(uuid::Uuid::new_v4(), ADMIN_EMAIL)
        .unwrap()
        .token;
    let response = app.get("/api/admin/dashboard", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_cookie_usable_for_session() {
    let app = TestApp::new().await;

    let wrong = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": "nope-nope" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.message(), "Invalid credentials");

    let login = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "OWNER@folio.test", "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(login.data()["user"].get("password_hash").is_none());

    let cookie = login.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.contains("HttpOnly"));
    let pair = cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/auth/session")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let session = app.send(request).await;
    assert_eq!(session.status, StatusCode::OK);
    assert_eq!(session.data()["email"], ADMIN_EMAIL);
    assert_eq!(session.data()["must_change_password"], true);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = TestApp::new().await;
    let response = app.json("POST", "/api/auth/logout", None, json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("folio_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn change_password_clears_forced_change() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let short = app
        .json(
            "POST",
            "/api/auth/change-password",
            Some(&token),
            json!({ "current_password": ADMIN_PASSWORD, "new_password": "short" }),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let ok = app
        .json(
            "POST",
            "/api/auth/change-password",
            Some(&token),
            json!({ "current_password": ADMIN_PASSWORD, "new_password": "a-better-password" }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    let user = User::find_by_id(app.state.pool(), app.admin.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!user.must_change_password);
}

#[tokio::test]
async fn request_reset_does_not_reveal_unknown_addresses() {
    let app = TestApp::new().await;

    let response = app
        .json(
            "POST",
            "/api/auth/request-reset",
            None,
            json!({ "email": "stranger@folio.test" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn password_reset_round_trip() {
    let app = TestApp::new().await;

    let response = app
        .json(
            "POST",
            "/api/auth/request-reset",
            None,
            json!({ "email": ADMIN_EMAIL }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, ADMIN_EMAIL);
    assert!(sent[0].html.contains("https://folio.test/reset-password?token="));

    let (token,): (String,) = sqlx::query_as("SELECT token FROM password_reset_tokens")
        .fetch_one(app.state.pool())
        .await
        .unwrap();

    let invalid = app
        .json(
            "POST",
            "/api/auth/reset-password",
            None,
            json!({ "token": token, "new_password": "short" }),
        )
        .await;
    assert_eq!(invalid.message(), "Invalid request");

    let reset = app
        .json(
            "POST",
            "/api/auth/reset-password",
            None,
            json!({ "token": token, "newPassword": "brand-new-password" }),
        )
        .await;
    assert_eq!(reset.status, StatusCode::OK);

    let record = PasswordResetToken::find_by_token(app.state.pool(), &token)
        .await
        .unwrap()
        .unwrap();
    assert!(record.used);

    let reused = app
        .json(
            "POST",
            "/api/auth/reset-password",
            None,
            json!({ "token": token, "new_password": "another-password" }),
        )
        .await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);
    assert_eq!(reused.message(), "Token invalid or expired");

    let login = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": "brand-new-password" }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
}
