mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::TestApp;
use db::models::contact_message::ContactMessage;
use serde_json::{Value, json};

fn contact_request(ip: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(body.into())
        .unwrap()
}

fn valid_submission() -> Value {
    json!({
        "name": "Minh Anh",
        "email": "minh@partner.org",
        "organization": "Delta Renewables",
        "projectType": "Feasibility study",
        "subject": "Solar pilot",
        "message": "Could we schedule a call next week?\nThanks."
    })
}

#[tokio::test]
async fn rejects_malformed_json() {
    let app = TestApp::new().await;
    let response = app.send(contact_request("10.0.0.1", "{not json")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid JSON");
}

#[tokio::test]
async fn reports_validation_issues() {
    let app = TestApp::new().await;
    let body = json!({ "name": "A", "email": "bad", "message": "hi" });
    let response = app
        .send(contact_request("10.0.0.2", body.to_string()))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Validation failed");
    let fields: Vec<&str> = response.body["error_data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"message"));
    assert_eq!(ContactMessage::count(app.state.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn stores_message_and_notifies_admin() {
    let app = TestApp::new().await;
    let response = app
        .send(contact_request("10.0.0.3", valid_submission().to_string()))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-ratelimit-remaining"], "4");
    assert!(response.headers.contains_key("x-ratelimit-reset"));

    let stored = ContactMessage::find_recent(app.state.pool(), 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].project_type, "Feasibility study");
    assert_eq!(stored[0].status.to_string(), "new");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "inbox@folio.test");
    assert!(sent[0].html.contains("mailto:minh@partner.org"));
}

#[tokio::test]
async fn sixth_submission_is_rate_limited() {
    let app = TestApp::new().await;
    let body = valid_submission().to_string();

    for _ in 0..5 {
        let response = app.send(contact_request("10.0.0.4", body.clone())).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let limited = app.send(contact_request("10.0.0.4", body.clone())).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        limited.message(),
        "Too many requests. Please try again later."
    );
    assert_eq!(limited.headers["x-ratelimit-remaining"], "0");
    assert!(limited.headers.contains_key(header::RETRY_AFTER));
    assert!(limited.body["error_data"]["retry_after"].as_u64().unwrap() > 0);

    // The limit is checked before the body is parsed
    let garbage = app.send(contact_request("10.0.0.4", "nope")).await;
    assert_eq!(garbage.status, StatusCode::TOO_MANY_REQUESTS);

    let other_ip = app.send(contact_request("10.0.0.5", body)).await;
    assert_eq!(other_ip.status, StatusCode::OK);
    assert_eq!(ContactMessage::count(app.state.pool()).await.unwrap(), 6);
}
