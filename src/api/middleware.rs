use crate::api::AppState;
use crate::domain::auth::AuthContext;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use std::convert::Infallible;

/// Resolves the caller through the auth gate at most once per request.
///
/// The resolved context is cached in the request extensions, so every handler
/// argument and layer in the same request observes the same identity.
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<Self>() {
            return Ok(ctx.clone());
        }

        let token = bearer_token(&parts.headers).or_else(|| cookie(&parts.headers, &state.config.auth.access_cookie));
        let ctx = state.auth_gate.resolve(token).await;

        if let Some(user_id) = ctx.get_current_user_id() {
            tracing::Span::current().record("user_id", tracing::field::display(user_id));
        }

        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

pub(crate) fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}
