#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::Value;

fn location(resp: &reqwest::Response) -> String {
    resp.headers().get("location").unwrap().to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_landing_sends_anonymous_callers_to_login() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(format!("{}/", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/en/login");

    let resp = app
        .client
        .get(format!("{}/", app.server_url))
        .header("Accept-Language", "de-DE,de;q=0.9,en;q=0.5")
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/de/login");
}

#[tokio::test]
async fn test_landing_sends_signed_in_callers_to_dashboard() {
    let app = TestApp::spawn().await;
    let token = common::valid_token("u1");

    let resp = app.client.get(format!("{}/", app.server_url)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(location(&resp), "/en/dashboard");

    let resp = app.client.get(format!("{}/de", app.server_url)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(location(&resp), "/de/dashboard");
}

#[tokio::test]
async fn test_unknown_locale_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(format!("{}/fr/dashboard", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let app = TestApp::spawn().await;
    let expired = common::expired_token("u1");

    let resp = app.client.get(format!("{}/en/dashboard", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/en/login?next=%2Fen%2Fdashboard");

    let resp = app
        .client
        .get(format!("{}/de/settings/profile", app.server_url))
        .header("Cookie", format!("sb-access-token={expired}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/de/login?next=%2Fde%2Fsettings%2Fprofile");
}

#[tokio::test]
async fn test_login_redirect_preserves_query() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(format!("{}/en/settings/account?tab=security", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/en/login?next=%2Fen%2Fsettings%2Faccount%3Ftab%3Dsecurity");
}

#[tokio::test]
async fn test_dashboard_renders_viewer() {
    let app = TestApp::spawn().await;
    let token = common::valid_token("u1");

    let resp = app
        .client
        .get(format!("{}/en/dashboard", app.server_url))
        .header("Cookie", format!("theme=dark; sb-access-token={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["page"], "dashboard");
    assert_eq!(body["locale"], "en");
    assert_eq!(body["viewer"]["id"], "u1");
}

#[tokio::test]
async fn test_settings_sections() {
    let app = TestApp::spawn().await;
    let token = common::valid_token("u1");

    let resp =
        app.client.get(format!("{}/en/settings/appearance", app.server_url)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["page"], "settings");
    assert_eq!(body["section"], "appearance");
    assert_eq!(body["sections"].as_array().unwrap().len(), 4);

    let resp =
        app.client.get(format!("{}/en/settings/billing", app.server_url)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_page() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(format!("{}/de/login", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["page"], "login");
    assert!(body.get("viewer").is_none());

    let token = common::valid_token("u1");
    let resp = app.client.get(format!("{}/de/login", app.server_url)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/de/dashboard");
}
