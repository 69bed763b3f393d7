use crate::api::AppState;
use crate::api::middleware::cookie;
use crate::domain::auth::AuthContext;
use crate::schemas::auth::{AuthResponse, Session};
use axum::{Json, extract::State, http::HeaderMap};
use time::OffsetDateTime;

const TOKEN_TYPE: &str = "bearer";

/// Reports the caller's user and session. Either both are present or both are `null`.
pub async fn session(State(state): State<AppState>, ctx: AuthContext, headers: HeaderMap) -> Json<AuthResponse> {
    let Some(active) = ctx.session() else {
        return Json(AuthResponse::signed_out());
    };

    let Some(refresh_token) = cookie(&headers, &state.config.auth.refresh_cookie) else {
        tracing::debug!(user_id = %active.user.id, "Access token without refresh cookie, reporting signed out");
        return Json(AuthResponse::signed_out());
    };

    let now = OffsetDateTime::now_utc().unix_timestamp();
    let session = Session {
        access_token: active.access_token.clone(),
        refresh_token: refresh_token.to_string(),
        expires_in: (active.expires_at - now).max(0),
        expires_at: active.expires_at,
        token_type: TOKEN_TYPE.to_string(),
    };

    Json(AuthResponse::signed_in(active.user.clone(), session))
}
