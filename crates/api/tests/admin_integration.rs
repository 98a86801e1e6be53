//! Integration tests for administration endpoints and public totals.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_public_poll, get_request, get_request_with_auth, json_request_with_auth,
    register_user, register_user_with_role, send, setup,
};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_list_users_requires_admin() {
    let (pool, app) = setup().await;
    let user = register_user(&app).await;
    let moderator = register_user_with_role(&app, &pool, "moderator").await;
    let admin = register_user_with_role(&app, &pool, "admin").await;

    let (status, _) = send(&app, get_request("/api/v1/admin/users")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_request_with_auth("/api/v1/admin/users", &user.access_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        get_request_with_auth("/api/v1/admin/users", &moderator.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, users) = send(&app, get_request_with_auth("/api/v1/admin/users", &admin.access_token)).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert!(users.iter().any(|u| u["id"] == user.user_id.as_str()));
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));
}

#[tokio::test]
async fn test_role_change_applies_immediately() {
    let (pool, app) = setup().await;
    let admin = register_user_with_role(&app, &pool, "admin").await;
    let target = register_user(&app).await;

    let (status, _) = send(
        &app,
        get_request_with_auth("/api/v1/admin/comments/reported", &target.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request_with_auth(
            Method::PATCH,
            "/api/v1/admin/users",
            json!({ "userId": target.user_id, "role": "moderator" }),
            &admin.access_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "moderator");

    // Same token, new role
    let (status, _) = send(
        &app,
        get_request_with_auth("/api/v1/admin/comments/reported", &target.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_role_change_rejections() {
    let (pool, app) = setup().await;
    let admin = register_user_with_role(&app, &pool, "admin").await;
    let moderator = register_user_with_role(&app, &pool, "moderator").await;
    let target = register_user(&app).await;

    let change = |token: &str, user_id: &str, role: &str| {
        json_request_with_auth(
            Method::PATCH,
            "/api/v1/admin/users",
            json!({ "userId": user_id, "role": role }),
            token,
        )
    };

    let (status, body) = send(&app, change(&admin.access_token, &admin.user_id, "user")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot change your own role");

    let (status, _) = send(&app, change(&moderator.access_token, &target.user_id, "admin")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, change(&admin.access_token, &target.user_id, "owner")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid role");

    let unknown = Uuid::new_v4().to_string();
    let (status, body) = send(&app, change(&admin.access_token, &unknown, "moderator")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_admin_stats_for_moderators() {
    let (pool, app) = setup().await;
    let user = register_user(&app).await;
    let moderator = register_user_with_role(&app, &pool, "moderator").await;
    create_public_poll(&app, &user, &["a", "b"]).await;

    let (status, _) = send(&app, get_request_with_auth("/api/v1/admin/stats", &user.access_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, stats) = send(
        &app,
        get_request_with_auth("/api/v1/admin/stats", &moderator.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats["users"]["total"].as_i64().unwrap() >= 2);
    assert!(stats["users"]["moderators"].as_i64().unwrap() >= 1);
    assert!(stats["polls"]["public"].as_i64().unwrap() >= 1);
    assert_eq!(
        stats["polls"]["total"].as_i64().unwrap(),
        stats["polls"]["public"].as_i64().unwrap() + stats["polls"]["private"].as_i64().unwrap()
    );
    assert!(stats["comments"].is_object());
}

#[tokio::test]
async fn test_site_stats_is_public() {
    let (_pool, app) = setup().await;
    let user = register_user(&app).await;
    create_public_poll(&app, &user, &["a", "b"]).await;

    let (status, stats) = send(&app, get_request("/api/v1/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats["totalPolls"].as_i64().unwrap() >= 1);
    assert!(stats["totalUsers"].as_i64().unwrap() >= 1);
    assert!(stats["totalVotes"].as_i64().is_some());
}
