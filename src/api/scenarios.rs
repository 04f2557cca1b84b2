// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end request flows through the full router.

use axum::http::{Method, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};

use super::test_support::TestApp;
use crate::auth::Role;

const SOURCE: &str = "ZTF21aaqjmps";

/// Users and groups shared by most flows:
///
/// - `g1`, `g2`: public groups
/// - `uploader` (g1), `uploader2` (g1, g2): upload + comment
/// - `viewer` (g1), `viewer2` (g2): view only
/// - `commenter` (g1), `commenter2` (g1, g2)
/// - `admin`: super admin in no group
async fn fixture() -> TestApp {
    let app = TestApp::new();
    app.user("uploader", Role::FullUser, &["g1"]).await;
    app.user("uploader2", Role::FullUser, &["g1", "g2"]).await;
    app.user("viewer", Role::ViewOnly, &["g1"]).await;
    app.user("viewer2", Role::ViewOnly, &["g2"]).await;
    app.user("commenter", Role::FullUser, &["g1"]).await;
    app.user("commenter2", Role::FullUser, &["g1", "g2"]).await;
    app.user("admin", Role::SuperAdmin, &[]).await;
    app
}

async fn post_photometry(app: &TestApp, token_user: &str, groups: &[&str]) -> String {
    let (status, body) = app
        .request(
            Method::POST,
            "/api/photometry",
            Some(token_user),
            Some(json!({
                "obj_id": SOURCE,
                "mjd": 58000.0,
                "flux": 12.24,
                "fluxerr": 0.031,
                "zp": 25.0,
                "magsys": "ab",
                "filter": "ztfg",
                "group_ids": groups,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "success");
    body["data"]["ids"][0].as_str().unwrap().to_string()
}

async fn post_comment(app: &TestApp, token_user: &str, payload: Value) -> String {
    let (status, body) = app
        .request(Method::POST, "/api/comment", Some(token_user), Some(payload))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["comment_id"].as_str().unwrap().to_string()
}

async fn get(app: &TestApp, uri: &str, user: &str) -> (StatusCode, Value) {
    app.request(Method::GET, uri, Some(user), None).await
}

async fn share(app: &TestApp, user: &str, payload: Value) -> (StatusCode, Value) {
    app.request(Method::POST, "/api/sharing", Some(user), Some(payload))
        .await
}

// =========================================================================
// Sharing
// =========================================================================

#[tokio::test]
async fn sharing_photometry_reveals_it_to_the_new_group() {
    let app = fixture().await;
    app.source(SOURCE, &["g1", "g2"]).await;

    let id = post_photometry(&app, "uploader2", &["g2"]).await;
    let uri = format!("/api/photometry/{id}?format=flux");

    let (status, _) = get(&app, &uri, "uploader2").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &uri, "viewer").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("Insufficient permissions"));

    let (status, body) = share(&app, "uploader2", json!({"photometryIDs": [id], "groupIDs": ["g1"]})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "success");

    let (status, body) = get(&app, &uri, "viewer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["obj_id"], SOURCE);
}

#[tokio::test]
async fn owner_may_share_into_a_group_they_are_not_in() {
    let app = fixture().await;
    app.source(SOURCE, &["g1", "g2"]).await;

    // uploader is only in g1 and targets g2 on creation
    let id = post_photometry(&app, "uploader", &["g2"]).await;
    let uri = format!("/api/photometry/{id}?format=flux");

    let (status, _) = get(&app, &uri, "viewer").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = share(&app, "uploader", json!({"photometryIDs": [id], "groupIDs": ["g1"]})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &uri, "viewer").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn sharing_photometry_shares_the_source() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;
    let source_uri = format!("/api/sources/{SOURCE}");

    let (status, body) = get(&app, &source_uri, "viewer2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().to_lowercase().contains("permissions"));

    let id = post_photometry(&app, "uploader", &["g1"]).await;
    let (status, _) = share(&app, "uploader", json!({"photometryIDs": [id], "groupIDs": ["g2"]})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &source_uri, "viewer2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn sharing_a_spectrum_does_not_share_the_source() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;
    let source_uri = format!("/api/sources/{SOURCE}");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/spectrum",
            Some("uploader"),
            Some(json!({
                "obj_id": SOURCE,
                "observed_at": "2020-11-04 12:00:03.123456",
                "wavelengths": [664, 665, 666],
                "fluxes": [234.2, 232.1, 235.3],
                "group_ids": ["g1"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let spectrum_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = get(&app, &format!("/api/spectrum/{spectrum_id}"), "uploader").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = share(&app, "uploader", json!({"spectrumIDs": [spectrum_id], "groupIDs": ["g2"]})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &source_uri, "viewer2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    // the spectrum itself is now visible to g2
    let (status, _) = get(&app, &format!("/api/spectrum/{spectrum_id}"), "viewer2").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cannot_share_unowned_photometry() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let id = post_photometry(&app, "uploader", &["g1"]).await;
    let (status, body) = share(&app, "uploader2", json!({"photometryIDs": [id], "groupIDs": ["g2"]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().unwrap().to_lowercase();
    assert!(message.contains("owner"));
    assert!(!message.contains("permissions"));

    assert!(!app.source_groups(SOURCE).await.contains("g2"));
}

#[tokio::test]
async fn system_admin_can_share_unowned_photometry() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let id = post_photometry(&app, "uploader", &["g1"]).await;
    let (status, body) = share(&app, "admin", json!({"photometryIDs": [id], "groupIDs": ["g2"]})).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = get(&app, &format!("/api/photometry/{id}?format=flux"), "viewer2").await;
    assert_eq!(status, StatusCode::OK);
}

// =========================================================================
// Comments
// =========================================================================

#[tokio::test]
async fn comment_with_explicit_group() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let id = post_comment(&app, "commenter", json!({"obj_id": SOURCE, "text": "Comment text", "group_ids": ["g1"]})).await;
    let (status, body) = get(&app, &format!("/api/comment/{id}"), "commenter").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Comment text");
}

#[tokio::test]
async fn comment_without_group_uses_poster_groups() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let id = post_comment(&app, "commenter", json!({"obj_id": SOURCE, "text": "Comment text"})).await;
    let (status, body) = get(&app, &format!("/api/comment/{id}"), "commenter").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["group_ids"], json!(["g1"]));
}

#[tokio::test]
async fn comment_visibility_follows_groups() {
    let app = fixture().await;
    app.source(SOURCE, &["g1", "g2"]).await;

    let private = post_comment(&app, "commenter2", json!({"obj_id": SOURCE, "text": "Comment text", "group_ids": ["g2"]})).await;
    let (status, _) = get(&app, &format!("/api/comment/{private}"), "commenter2").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &format!("/api/comment/{private}"), "commenter").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient permissions.");

    let both = post_comment(&app, "commenter2", json!({"obj_id": SOURCE, "text": "Comment text", "group_ids": ["g1", "g2"]})).await;
    for user in ["commenter", "commenter2"] {
        let (status, body) = get(&app, &format!("/api/comment/{both}"), user).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["text"], "Comment text");
    }
}

#[tokio::test]
async fn updating_comment_groups_changes_visibility() {
    let app = fixture().await;
    app.source(SOURCE, &["g1", "g2"]).await;

    let id = post_comment(&app, "commenter2", json!({"obj_id": SOURCE, "text": "Comment text", "group_ids": ["g2"]})).await;
    let uri = format!("/api/comment/{id}");

    let (status, body) = get(&app, &uri, "commenter").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient permissions.");

    let (status, _) = app
        .request(
            Method::PUT,
            &uri,
            Some("commenter2"),
            Some(json!({"text": "Comment text new", "group_ids": ["g1", "g2"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    for user in ["commenter", "commenter2"] {
        let (status, body) = get(&app, &uri, user).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["text"], "Comment text new");
    }
}

#[tokio::test]
async fn removing_a_group_from_a_comment_revokes_its_access() {
    let app = fixture().await;
    app.source(SOURCE, &["g1", "g2"]).await;

    let id = post_comment(&app, "commenter2", json!({"obj_id": SOURCE, "text": "Comment text", "group_ids": ["g1", "g2"]})).await;
    let uri = format!("/api/comment/{id}");

    let (status, _) = get(&app, &uri, "commenter").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(Method::PUT, &uri, Some("commenter2"), Some(json!({"group_ids": ["g2"]})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &uri, "commenter").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient permissions.");

    let (status, _) = get(&app, &uri, "commenter2").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn view_only_user_cannot_comment() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/comment",
            Some("viewer"),
            Some(json!({"obj_id": SOURCE, "text": "Comment text"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn deleted_comment_is_gone() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let id = post_comment(&app, "commenter", json!({"obj_id": SOURCE, "text": "Comment text"})).await;
    let uri = format!("/api/comment/{id}");

    let (status, _) = app.request(Method::DELETE, &uri, Some("commenter"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &uri, "commenter").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.request(Method::DELETE, &uri, Some("commenter"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_attachment_needs_both_fields_and_round_trips() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let id = post_comment(&app, "admin", json!({"obj_id": SOURCE, "text": "asdf", "group_ids": ["g1"]})).await;
    let uri = format!("/api/comment/{id}");
    let attachment = STANDARD.encode(
        br#"{"timestamp": "2020-11-04T12:00:03", "run": 1839, "result": {"model": "salt2", "fit_acceptable": false}}"#,
    );

    let (status, body) = app
        .request(Method::PUT, &uri, Some("admin"), Some(json!({"attachment_bytes": attachment})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some("admin"),
            Some(json!({"attachment_bytes": attachment, "attachment_name": "ampel_test.json"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, body) = get(&app, &uri, "admin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attachment_bytes"], attachment);
    assert_eq!(body["data"]["attachment_name"], "ampel_test.json");
}

#[tokio::test]
async fn post_comment_with_attachment() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let attachment = STANDARD.encode(br#"{"snid": "ZTF21aaqjmps", "chisq": 20.29}"#);
    let id = post_comment(
        &app,
        "admin",
        json!({
            "obj_id": SOURCE,
            "text": "asdf",
            "group_ids": ["g1"],
            "attachment": {"body": attachment, "name": "ampel_test.json"},
        }),
    )
    .await;

    let (_, body) = get(&app, &format!("/api/comment/{id}"), "commenter").await;
    assert_eq!(body["data"]["attachment_bytes"], attachment);
}

// =========================================================================
// Malformed requests
// =========================================================================

fn assert_validation_envelope(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn missing_body_field_is_a_validation_error() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;

    let (status, body) = app
        .request(Method::POST, "/api/comment", Some("commenter"), Some(json!({"obj_id": SOURCE})))
        .await;
    assert_validation_envelope(status, &body);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn unparseable_or_untyped_bodies_are_validation_errors() {
    let app = fixture().await;

    let (status, body) = app
        .send(Method::POST, "/api/sharing", Some("uploader"), Some("application/json"), "{not json".to_string())
        .await;
    assert_validation_envelope(status, &body);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/groups",
            Some("admin"),
            None,
            json!({"name": "Transients"}).to_string(),
        )
        .await;
    assert_validation_envelope(status, &body);
}

#[tokio::test]
async fn unknown_photometry_format_is_a_validation_error() {
    let app = fixture().await;
    app.source(SOURCE, &["g1"]).await;
    let id = post_photometry(&app, "uploader", &["g1"]).await;

    let (status, body) = get(&app, &format!("/api/photometry/{id}?format=bogus"), "uploader").await;
    assert_validation_envelope(status, &body);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid query string"));
}

// =========================================================================
// Authentication
// =========================================================================

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = fixture().await;
    let (status, body) = app.request(Method::GET, "/api/internal/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn tokens_for_unregistered_users_are_unauthorized() {
    let app = fixture().await;
    let (status, _) = app
        .request(Method::GET, "/api/internal/profile", Some("nobody"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unreadable_group_record_is_an_internal_error() {
    let app = fixture().await;
    let state = app.state();
    let storage = state.storage.read().await;
    std::fs::write(storage.paths().record("groups", "g2"), b"{truncated").unwrap();
    drop(storage);

    let (status, body) = get(&app, "/api/internal/profile", "commenter").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn profile_and_health_are_served() {
    let app = fixture().await;

    let (status, body) = get(&app, "/api/internal/profile", "uploader2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["group_ids"], json!(["g1", "g2"]));

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["storage"], "ok");
}
