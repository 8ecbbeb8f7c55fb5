mod common;

use axum::{body::Body, http::StatusCode};
use common::TestApp;
use db::models::contact_message::{ContactMessage, CreateContactMessage, MessageStatus};
use serde_json::json;

#[tokio::test]
async fn homepage_draft_is_hidden_until_published() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let short = app
        .json(
            "POST",
            "/api/admin/homepage/draft",
            Some(&token),
            json!({ "headline": "Hi" }),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.message(), "Headline too short");

    let no_draft = app
        .json("POST", "/api/admin/homepage/publish", Some(&token), json!({}))
        .await;
    assert_eq!(no_draft.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_draft.message(), "No draft");

    let saved = app
        .json(
            "POST",
            "/api/admin/homepage/draft",
            Some(&token),
            json!({ "headline": "Energy transition advisory", "primary_cta_text": "Talk to us" }),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK);

    let before = app.get("/api/home", None).await;
    assert!(before.data()["homepage"].is_null());

    let published = app
        .json("POST", "/api/admin/homepage/publish", Some(&token), json!({}))
        .await;
    assert_eq!(published.status, StatusCode::OK);

    let after = app.get("/api/home", None).await;
    assert_eq!(
        after.data()["homepage"]["headline"],
        "Energy transition advisory"
    );

    let audit = app.get("/api/admin/audit-log", Some(&token)).await;
    let actions: Vec<&str> = audit
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["publish", "save_draft"]);
    assert_eq!(audit.data()[0]["user_id"], app.admin.id.to_string());
}

#[tokio::test]
async fn missing_headline_is_reported_as_too_short() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .json(
            "POST",
            "/api/admin/homepage/draft",
            Some(&token),
            json!({ "subheadline": "x" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.message(), "Headline too short");
}

#[tokio::test]
async fn malformed_admin_bodies_use_the_error_envelope() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let wrong_type = app
        .json(
            "POST",
            "/api/admin/projects",
            Some(&token),
            json!({ "title": 5 }),
        )
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_type.body["success"], false);
    assert_eq!(wrong_type.message(), "Invalid request body");

    let not_json = app
        .send(common::request(
            "POST",
            "/api/admin/settings",
            Some(&token),
            Body::from("site_title=Folio"),
        ))
        .await;
    assert_eq!(not_json.status, StatusCode::BAD_REQUEST);
    assert_eq!(not_json.message(), "Invalid JSON");

    let bad_query = app
        .get("/api/admin/audit-log?limit=lots", Some(&token))
        .await;
    assert_eq!(bad_query.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_query.message(), "Invalid query");
}

#[tokio::test]
async fn site_settings_default_to_empty() {
    let app = TestApp::new().await;

    let site = app.get("/api/site", None).await;
    assert_eq!(site.status, StatusCode::OK);
    assert_eq!(site.body["success"], true);
    assert!(site.data()["site_title"].is_null());
    assert!(site.data()["logo_path"].is_null());
}

#[tokio::test]
async fn settings_update_only_supplied_fields_and_null_clears() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let first = app
        .json(
            "POST",
            "/api/admin/settings",
            Some(&token),
            json!({ "site_title": "Nhung Consultancy", "logo_path": "/uploads/1-logo.png" }),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let partial = app
        .json(
            "POST",
            "/api/admin/settings",
            Some(&token),
            json!({ "phone": "+84 123" }),
        )
        .await;
    assert_eq!(partial.data()["site_title"], "Nhung Consultancy");
    assert_eq!(partial.data()["logo_path"], "/uploads/1-logo.png");
    assert_eq!(partial.data()["phone"], "+84 123");

    let cleared = app
        .json(
            "POST",
            "/api/admin/settings",
            Some(&token),
            json!({ "logo_path": null }),
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.data()["logo_path"].is_null());
    assert_eq!(cleared.data()["site_title"], "Nhung Consultancy");

    let site = app.get("/api/site", None).await;
    assert!(site.data()["logo_path"].is_null());
    assert_eq!(site.data()["phone"], "+84 123");

    let audit = app.get("/api/admin/audit-log", Some(&token)).await;
    let entries = audit.data().as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|entry| entry["action"] == "update_settings"
        && entry["entity"] == "site_settings"));
}

#[tokio::test]
async fn metrics_reject_negative_counts() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let negative = app
        .json(
            "POST",
            "/api/admin/metrics/draft",
            Some(&token),
            json!({ "countries": -1 }),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let saved = app
        .json(
            "POST",
            "/api/admin/metrics/draft",
            Some(&token),
            json!({ "years_experience": 12, "countries": 9 }),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK);
    assert_eq!(saved.data()["portfolio_currency"], "USD");
}

#[tokio::test]
async fn hidden_partners_are_not_published() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    for (name, hidden, sort_order) in [("Beta", false, 2), ("Alpha", false, 1), ("Secret", true, 0)] {
        let created = app
            .json(
                "POST",
                "/api/admin/partners/draft",
                Some(&token),
                json!({ "name": name, "hidden": hidden, "sort_order": sort_order }),
            )
            .await;
        assert_eq!(created.status, StatusCode::OK);
    }

    let publish = app
        .json("POST", "/api/admin/partners/publish", Some(&token), json!({}))
        .await;
    assert_eq!(publish.data()["published"], 2);

    let home = app.get("/api/home", None).await;
    let names: Vec<&str> = home.data()["partners"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn partner_url_can_be_cleared() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let created = app
        .json(
            "POST",
            "/api/admin/partners/draft",
            Some(&token),
            json!({ "name": "ADB", "url": "https://adb.org", "logo_path": "/uploads/1-adb.png" }),
        )
        .await;
    let id = created.data()["id"].as_str().unwrap().to_string();

    let renamed = app
        .json(
            "PUT",
            "/api/admin/partners/draft",
            Some(&token),
            json!({ "id": id, "name": "Asian Development Bank" }),
        )
        .await;
    assert_eq!(renamed.data()["url"], "https://adb.org");

    let cleared = app
        .json(
            "PUT",
            "/api/admin/partners/draft",
            Some(&token),
            json!({ "id": id, "url": null }),
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.data()["url"].is_null());
    assert_eq!(cleared.data()["logo_path"], "/uploads/1-adb.png");
    assert_eq!(cleared.data()["name"], "Asian Development Bank");
}

#[tokio::test]
async fn testimonial_drafts_publish_visible_entries() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let empty_quote = app
        .json(
            "POST",
            "/api/admin/testimonials/draft",
            Some(&token),
            json!({ "quote": "", "author": "Someone" }),
        )
        .await;
    assert_eq!(empty_quote.status, StatusCode::BAD_REQUEST);

    let kept = app
        .json(
            "POST",
            "/api/admin/testimonials/draft",
            Some(&token),
            json!({
                "quote": "Rigorous and thoughtful.",
                "author": "Programme Lead",
                "avatar_path": "/uploads/1-lead.png",
                "sort_order": 1
            }),
        )
        .await;
    assert_eq!(kept.status, StatusCode::OK);
    let kept_id = kept.data()["id"].as_str().unwrap().to_string();

    let dropped = app
        .json(
            "POST",
            "/api/admin/testimonials/draft",
            Some(&token),
            json!({ "quote": "Draft only.", "author": "Reviewer", "sort_order": 0 }),
        )
        .await;
    let dropped_id = dropped.data()["id"].as_str().unwrap().to_string();

    let hidden = app
        .json(
            "POST",
            "/api/admin/testimonials/draft",
            Some(&token),
            json!({ "quote": "Not yet.", "author": "Client", "hidden": true }),
        )
        .await;
    assert_eq!(hidden.data()["hidden"], true);

    let cleared = app
        .json(
            "PUT",
            "/api/admin/testimonials/draft",
            Some(&token),
            json!({ "id": kept_id, "avatar_path": null }),
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.data()["avatar_path"].is_null());
    assert_eq!(cleared.data()["quote"], "Rigorous and thoughtful.");

    let deleted = app
        .send(common::request(
            "DELETE",
            &format!("/api/admin/testimonials/draft?id={dropped_id}"),
            Some(&token),
            Body::empty(),
        ))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let drafts = app.get("/api/admin/testimonials/draft", Some(&token)).await;
    assert_eq!(drafts.data().as_array().unwrap().len(), 2);

    let publish = app
        .json("POST", "/api/admin/testimonials/publish", Some(&token), json!({}))
        .await;
    assert_eq!(publish.status, StatusCode::OK);
    assert_eq!(publish.data()["published"], 1);

    let home = app.get("/api/home", None).await;
    let testimonials = home.data()["testimonials"].as_array().unwrap();
    assert_eq!(testimonials.len(), 1);
    assert_eq!(testimonials[0]["author"], "Programme Lead");
    assert!(testimonials[0]["avatar_path"].is_null());
}

#[tokio::test]
async fn dashboard_counts_messages_and_projects() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let mut ids = Vec::new();
    for name in ["Lan", "Quang"] {
        let message = ContactMessage::create(
            app.state.pool(),
            &CreateContactMessage {
                name: name.to_string(),
                email: "someone@partner.org".to_string(),
                organization: "Partner".to_string(),
                phone: None,
                project_type: "Evaluation".to_string(),
                timeline: None,
                subject: None,
                message: "We would like to talk.".to_string(),
            },
        )
        .await
        .unwrap();
        ids.push(message.id);
    }
    ContactMessage::update_status(app.state.pool(), ids[0], MessageStatus::Read)
        .await
        .unwrap();

    for (title, published) in [("Live", true), ("Hidden", false)] {
        let created = app
            .json(
                "POST",
                "/api/admin/projects",
                Some(&token),
                json!({ "title": title, "published": published }),
            )
            .await;
        assert_eq!(created.status, StatusCode::OK);
    }

    let dashboard = app.get("/api/admin/dashboard", Some(&token)).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(
        dashboard.data(),
        &json!({
            "unread_messages": 1,
            "total_messages": 2,
            "total_projects": 2,
            "published_projects": 1
        })
    );
}

#[tokio::test]
async fn project_lifecycle_and_portfolio_view() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let created = app
        .json(
            "POST",
            "/api/admin/projects",
            Some(&token),
            json!({
                "title": "Grid modernisation",
                "client": "Utility Co",
                "overview": "Aging substations",
                "template_id": "does-not-exist",
                "status": "completed",
                "progress": 40,
                "published": true
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.data()["template_id"], "blue-energy");
    assert!(created.data()["progress"].is_null());
    let id = created.data()["id"].as_str().unwrap().to_string();

    let portfolio = app.get("/api/portfolio/projects", None).await;
    let project = &portfolio.data()[0];
    assert_eq!(project["challenge"], "Aging substations");
    assert_eq!(project["progress"], 100);

    let updated = app
        .json(
            "PUT",
            "/api/admin/projects",
            Some(&token),
            json!({ "id": id, "status": "ongoing", "progress": 30 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["progress"], 30);

    let missing = app
        .json("DELETE", "/api/admin/projects", Some(&token), json!({}))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.message(), "Missing id");

    let deleted = app
        .send(common::request(
            "DELETE",
            &format!("/api/admin/projects?id={id}"),
            Some(&token),
            Body::empty(),
        ))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let templates = app.get("/api/portfolio/templates", None).await;
    assert_eq!(templates.data().as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn message_status_updates_validate_input() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let bad = app
        .json(
            "PUT",
            "/api/admin/messages",
            Some(&token),
            json!({ "id": uuid::Uuid::new_v4(), "status": "archived" }),
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.message(), "Bad request");

    let unknown = app
        .json(
            "PUT",
            "/api/admin/messages",
            Some(&token),
            json!({ "id": uuid::Uuid::new_v4(), "status": "read" }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let inbox = app.get("/api/admin/messages", Some(&token)).await;
    assert_eq!(inbox.status, StatusCode::OK);
    assert_eq!(inbox.headers["cache-control"], "no-store");
    assert_eq!(inbox.data()["unread"], 0);
}
