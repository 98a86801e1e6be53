//! Integration tests for share codes and the browser redirect.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{
    create_public_poll, create_test_poll, delete_request_with_auth, get_request,
    get_request_with_auth, json_request_with_auth, register_user, send, setup, APP_BASE_URL,
};
use serde_json::json;
use tower::ServiceExt;

fn share_request(poll_id: &str, token: &str) -> Request<Body> {
    json_request_with_auth(
        Method::POST,
        &format!("/api/v1/polls/{}/shares", poll_id),
        json!({}),
        token,
    )
}

#[tokio::test]
async fn test_create_share_reuses_live_code() {
    let (_pool, app) = setup().await;
    let owner = register_user(&app).await;
    let poll = create_public_poll(&app, &owner, &["a", "b"]).await;
    let poll_id = poll["id"].as_str().unwrap();

    let (status, first) = send(&app, share_request(poll_id, &owner.access_token)).await;
    assert_eq!(status, StatusCode::CREATED);
    let code = first["shareCode"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert_eq!(first["shareUrl"], format!("{}/share/{}", APP_BASE_URL, code));
    assert_eq!(first["qrData"], first["shareUrl"]);

    let (status, second) = send(&app, share_request(poll_id, &owner.access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["shareCode"], first["shareCode"]);
}

#[tokio::test]
async fn test_share_requires_owner_and_public_poll() {
    let (_pool, app) = setup().await;
    let owner = register_user(&app).await;
    let stranger = register_user(&app).await;

    let public = create_public_poll(&app, &owner, &["a", "b"]).await;
    let (status, _) = send(
        &app,
        share_request(public["id"].as_str().unwrap(), &stranger.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let private = create_test_poll(
        &app,
        &owner,
        json!({ "title": "Secret", "options": ["a", "b"], "isPublic": false }),
    )
    .await;
    let (status, body) = send(
        &app,
        share_request(private["id"].as_str().unwrap(), &owner.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only public polls can be shared");
}

#[tokio::test]
async fn test_resolve_and_validate() {
    let (_pool, app) = setup().await;
    let owner = register_user(&app).await;
    let poll = create_public_poll(&app, &owner, &["a", "b"]).await;
    let poll_id = poll["id"].as_str().unwrap();
    let (_, share) = send(&app, share_request(poll_id, &owner.access_token)).await;
    let code = share["shareCode"].as_str().unwrap();

    // Codes are case-insensitive on lookup
    let (status, resolved) = send(
        &app,
        get_request(&format!("/api/v1/shares/{}", code.to_lowercase())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["shareCode"], code);
    assert_eq!(resolved["poll"]["id"], poll_id);

    let (status, valid) = send(&app, get_request(&format!("/api/v1/shares/{}/validate", code))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(valid["isValid"], true);
    assert_eq!(valid["pollId"], poll_id);

    let (status, invalid) = send(&app, get_request("/api/v1/shares/ZZZZZZZZ/validate")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invalid["isValid"], false);
    assert!(invalid.get("pollId").is_none());

    let (status, missing) = send(&app, get_request("/api/v1/shares/ZZZZZZZZ")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "Share code not found");
}

#[tokio::test]
async fn test_share_redirect() {
    let (_pool, app) = setup().await;
    let owner = register_user(&app).await;
    let poll = create_public_poll(&app, &owner, &["a", "b"]).await;
    let poll_id = poll["id"].as_str().unwrap();
    let (_, share) = send(&app, share_request(poll_id, &owner.access_token)).await;
    let code = share["shareCode"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/share/{}", code)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        format!("/polls/{}", poll_id).as_str()
    );

    let response = app
        .clone()
        .oneshot(get_request("/share/ZZZZZZZZ"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/polls?error=Share%20code%20not%20found"
    );
}

#[tokio::test]
async fn test_redirect_rejects_poll_made_private() {
    let (_pool, app) = setup().await;
    let owner = register_user(&app).await;
    let poll = create_public_poll(&app, &owner, &["a", "b"]).await;
    let poll_id = poll["id"].as_str().unwrap();
    let (_, share) = send(&app, share_request(poll_id, &owner.access_token)).await;
    let code = share["shareCode"].as_str().unwrap();

    let (status, _) = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!("/api/v1/polls/{}", poll_id),
            json!({ "title": "Now private", "options": ["a", "b"], "isPublic": false }),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get_request(&format!("/api/v1/shares/{}", code))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "This poll is no longer public");
}

#[tokio::test]
async fn test_share_stats_and_delete() {
    let (_pool, app) = setup().await;
    let owner = register_user(&app).await;
    let stranger = register_user(&app).await;
    let poll = create_public_poll(&app, &owner, &["a", "b"]).await;
    let poll_id = poll["id"].as_str().unwrap();
    let (_, share) = send(&app, share_request(poll_id, &owner.access_token)).await;
    let code = share["shareCode"].as_str().unwrap();

    let stats_uri = format!("/api/v1/polls/{}/shares/stats", poll_id);
    let (status, stats) = send(&app, get_request_with_auth(&stats_uri, &owner.access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["shareCount"], 1);
    assert!(!stats["lastShared"].is_null());

    let (status, _) = send(&app, get_request_with_auth(&stats_uri, &stranger.access_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let share_uri = format!("/api/v1/shares/{}", code);
    let (status, _) = send(&app, delete_request_with_auth(&share_uri, &stranger.access_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, delete_request_with_auth(&share_uri, &owner.access_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get_request(&share_uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_share_rejects_malformed_expiry() {
    let (_pool, app) = setup().await;
    let owner = register_user(&app).await;
    let poll = create_public_poll(&app, &owner, &["a", "b"]).await;
    let uri = format!("/api/v1/polls/{}/shares", poll["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        json_request_with_auth(
            Method::POST,
            &uri,
            json!({ "expiresAt": "tomorrow" }),
            &owner.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A bodyless request still issues a code without expiry
    let request = Request::builder()
        .method(Method::POST)
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", owner.access_token))
        .body(Body::empty())
        .unwrap();
    let (status, share) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(share["expiresAt"].is_null());
}
