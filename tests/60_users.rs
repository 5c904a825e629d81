mod common;

use anyhow::Result;
use common::{json_of, unique, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn registration(username: &str) -> Value {
    json!({
        "username": username,
        "password": "password1",
        "first_name": "Test",
        "last_name": "User",
        "email": format!("{}@example.com", username)
    })
}

#[tokio::test]
async fn register_login_and_manage_self() -> Result<()> {
    let Some(server) = TestServer::spawn_with_db().await? else {
        return Ok(());
    };
    let username = unique("user");

    // Register returns a token
    let (status, body) = json_of(
        server
            .client
            .post(server.url("/users"))
            .json(&registration(&username))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());

    // Same username again
    let (status, body) = json_of(
        server
            .client
            .post(server.url("/users"))
            .json(&registration(&username))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already taken");

    // Login
    let (status, body) = json_of(
        server
            .client
            .post(server.url("/login"))
            .json(&json!({ "username": username, "password": "password1" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    let (status, body) = json_of(
        server
            .client
            .post(server.url("/login"))
            .json(&json!({ "username": username, "password": "wrong" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");

    // Password hashes never leave the server
    let (status, body) = json_of(
        server
            .client
            .get(server.url(&format!("/users/{}", username)))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], username.as_str());
    assert_eq!(body["user"]["is_admin"], false);
    assert!(body["user"].get("password").is_none());

    // Update self, including a new password
    let (status, body) = json_of(
        server
            .client
            .patch(server.url(&format!("/users/{}", username)))
            .bearer_auth(&token)
            .json(&json!({ "first_name": "Changed", "password": "password2" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["first_name"], "Changed");
    assert_eq!(body["user"]["last_name"], "User");

    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "username": username, "password": "password2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Delete self
    let (status, body) = json_of(
        server
            .client
            .delete(server.url(&format!("/users/{}", username)))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");
    Ok(())
}

#[tokio::test]
async fn login_with_unknown_user_is_404() -> Result<()> {
    let Some(server) = TestServer::spawn_with_db().await? else {
        return Ok(());
    };
    let username = unique("ghost");

    let (status, body) = json_of(
        server
            .client
            .post(server.url("/login"))
            .json(&json!({ "username": username, "password": "password1" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("{} not found", username));
    Ok(())
}

#[tokio::test]
async fn user_listing_includes_new_users() -> Result<()> {
    let Some(server) = TestServer::spawn_with_db().await? else {
        return Ok(());
    };
    let username = unique("listed");
    server.create_user(&username, false).await?;

    let (status, body) = json_of(server.client.get(server.url("/users")).send().await?).await?;
    assert_eq!(status, StatusCode::OK);

    let users = body["users"].as_array().cloned().unwrap_or_default();
    let listed = users.iter().find(|u| u["username"] == username.as_str());
    assert!(listed.is_some());
    assert!(listed.and_then(|u| u.get("password")).is_none());
    Ok(())
}
