use crate::config::Config;
use crate::domain::locale::Locales;
use crate::rpc::RouterTree;
use crate::services::auth_gate::AuthGate;
use crate::services::health_service::HealthService;
use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod health;
pub mod middleware;
pub mod pages;
pub mod rpc;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub router: Arc<RouterTree>,
    pub auth_gate: AuthGate,
    pub locales: Arc<Locales>,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

/// Configures and returns the primary application router.
pub fn app_router(state: AppState) -> Router {
    let rpc_routes = Router::new()
        .route("/rpc", get(rpc::list_procedures))
        .route("/rpc/{path}", post(rpc::call_procedure))
        .route("/auth/session", get(auth::session));

    let page_routes = Router::new()
        .route("/", get(pages::landing))
        .route("/{locale}", get(pages::locale_landing))
        .route("/{locale}/login", get(pages::login))
        .route("/{locale}/dashboard", get(pages::dashboard))
        .route("/{locale}/settings/{section}", get(pages::settings));

    Router::new()
        .merge(rpc_routes)
        .merge(page_routes)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
