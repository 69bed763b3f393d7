#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    missing_debug_implementations,
    unreachable_pub,
    dead_code
)]

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use portal_server::AppBuilder;
use portal_server::adapters::identity::{Claims, IdentityProvider, UserMetadata};
use portal_server::config::{AuthConfig, Config, HealthConfig, LocaleConfig, LogFormat, ServerConfig, TelemetryConfig};
use portal_server::rpc::{RpcClient, RpcError, Transport};
use portal_server::schemas::Schema;
use portal_server::schemas::error::ErrorResponse;
use serde_json::Value;
use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

pub const JWT_SECRET: &str = "test_secret";

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("portal_server=debug".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
    });
}

pub fn get_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            mgmt_port: 0,
            shutdown_timeout_secs: 1,
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_audience: "authenticated".to_string(),
            jwt_leeway_secs: 0,
            access_cookie: "sb-access-token".to_string(),
            refresh_cookie: "sb-refresh-token".to_string(),
        },
        locale: LocaleConfig { supported: vec!["en".to_string(), "de".to_string()], default_locale: "en".to_string() },
        health: HealthConfig { identity_timeout_ms: 500 },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

pub fn now() -> i64 {
    i64::try_from(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()).unwrap()
}

pub fn claims_for(user_id: &str, expires_at: i64) -> Claims {
    Claims {
        sub: user_id.to_string(),
        exp: expires_at,
        aud: Some("authenticated".to_string()),
        email: Some(format!("{user_id}@example.com")),
        phone: None,
        user_metadata: UserMetadata { full_name: Some(format!("User {user_id}")), avatar_url: None },
    }
}

/// Signs an access token the way the hosted auth service does.
pub fn sign_claims(claims: &Claims) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).unwrap()
}

pub fn mint_token(user_id: &str, expires_at: i64) -> String {
    sign_claims(&claims_for(user_id, expires_at))
}

pub fn valid_token(user_id: &str) -> String {
    mint_token(user_id, now() + 3600)
}

pub fn expired_token(user_id: &str) -> String {
    mint_token(user_id, now() - 3600)
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(AppBuilder::new(get_test_config())).await
    }

    pub async fn spawn_with_identity(identity: Arc<dyn IdentityProvider>) -> Self {
        Self::spawn_with(AppBuilder::new(get_test_config()).with_identity_provider(identity)).await
    }

    pub async fn spawn_with(builder: AppBuilder) -> Self {
        setup_tracing();
        let app = builder.build().expect("Failed to build app");

        let api_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", api_listener.local_addr().unwrap());
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());

        let api = portal_server::api::app_router(app.state);
        let mgmt = portal_server::api::mgmt_router(app.mgmt);

        tokio::spawn(async move {
            axum::serve(api_listener, api).await.unwrap();
        });
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt).await.unwrap();
        });

        let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build().unwrap();

        Self { server_url, mgmt_url, client }
    }

    pub fn rpc(&self, token: Option<&str>) -> RpcClient<HttpTransport> {
        RpcClient::new(HttpTransport {
            client: self.client.clone(),
            base_url: self.server_url.clone(),
            token: token.map(str::to_string),
        })
    }
}

/// Sends procedure calls to a running server over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, path: &str, input: Value) -> Result<Value, RpcError> {
        let mut request = self.client.post(format!("{}/rpc/{path}", self.base_url)).json(&input);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| RpcError::Transport(e.to_string()))?;
        let success = resp.status().is_success();
        let body: Value = resp.json().await.map_err(|e| RpcError::Transport(e.to_string()))?;

        if success {
            Ok(body)
        } else {
            Err(RpcError::Remote(ErrorResponse::validate(&body)?))
        }
    }
}
