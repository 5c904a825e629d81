mod common;

use anyhow::Result;
use common::{json_of, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.client.get(server.url("/health")).send().await?;

    // OK with a database, SERVICE_UNAVAILABLE without one
    assert!(
        res.status() == StatusCode::OK || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert!(body.get("status").is_some());
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_404() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = json_of(server.client.get(server.url("/no-such-path")).send().await?).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Not Found");
    Ok(())
}
