#![allow(clippy::unwrap_used)]

mod common;

use async_trait::async_trait;
use common::TestApp;
use portal_server::adapters::identity::{IdentityError, IdentityProvider, TokenStatus};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug)]
struct UnreachableProvider;

#[async_trait]
impl IdentityProvider for UnreachableProvider {
    async fn lookup(&self, _access_token: &str) -> Result<TokenStatus, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn test_unreachable_provider_denies_rpc() {
    let app = TestApp::spawn_with_identity(Arc::new(UnreachableProvider)).await;
    let token = common::valid_token("u1");

    let resp = app.client.post(format!("{}/rpc/viewer.me", app.server_url)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_unreachable_provider_redirects_pages_to_login() {
    let app = TestApp::spawn_with_identity(Arc::new(UnreachableProvider)).await;
    let token = common::valid_token("u1");

    let resp = app.client.get(format!("{}/en/dashboard", app.server_url)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("location").unwrap(), "/en/login?next=%2Fen%2Fdashboard");

    let resp = app
        .client
        .get(format!("{}/auth/session", app.server_url))
        .bearer_auth(&token)
        .header("Cookie", "sb-refresh-token=refresh-abc")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({ "user": null, "session": null }));
}

#[tokio::test]
async fn test_unreachable_provider_fails_readiness() {
    let app = TestApp::spawn_with_identity(Arc::new(UnreachableProvider)).await;

    let resp = app.client.get(format!("{}/readyz", app.mgmt_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["identity"], "error");
}
