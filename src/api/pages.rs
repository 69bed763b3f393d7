//! Page models for the dashboard front end.
//!
//! Protected pages call `require_current_user_id` before producing anything and
//! turn a denial into a redirect to the locale's login page. Landing routes only
//! branch on `get_current_user_id`.

use crate::api::AppState;
use crate::domain::auth::{AuthContext, Unauthenticated};
use crate::error::AppError;
use crate::rpc::procedures::viewer::Me;
use crate::rpc::{RpcClient, RpcError};
use crate::schemas::user::User;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, Uri, header, uri::PathAndQuery},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsSection {
    Profile,
    Account,
    Appearance,
    Notifications,
}

impl SettingsSection {
    pub const ALL: [Self; 4] = [Self::Profile, Self::Account, Self::Appearance, Self::Notifications];
}

impl FromStr for SettingsSection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profile" => Ok(Self::Profile),
            "account" => Ok(Self::Account),
            "appearance" => Ok(Self::Appearance),
            "notifications" => Ok(Self::Notifications),
            other => Err(AppError::NotFound(format!("settings section '{other}'"))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModel {
    pub page: &'static str,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<SettingsSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SettingsSection>,
}

impl PageModel {
    fn new(page: &'static str, locale: String) -> Self {
        Self { page, locale, viewer: None, section: None, sections: Vec::new() }
    }
}

#[derive(Debug)]
pub enum PageError {
    Redirect(String),
    App(AppError),
}

impl PageError {
    /// Redirect to the locale's login page, returning to `uri` (path and query) afterwards.
    fn login(locale: &str, uri: &Uri, err: Unauthenticated) -> Self {
        let next = uri.path_and_query().map_or_else(|| uri.path(), PathAndQuery::as_str);
        tracing::debug!(reason = %err.reason, next = %next, "Redirecting to login");
        Self::Redirect(format!("/{locale}/login?next={}", urlencoding::encode(next)))
    }
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<RpcError> for PageError {
    fn from(err: RpcError) -> Self {
        Self::App(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(to) => Redirect::to(&to).into_response(),
            Self::App(err) => err.into_response(),
        }
    }
}

fn resolve_locale(state: &AppState, segment: &str) -> Result<String, AppError> {
    state.locales.resolve(segment).map(str::to_string).ok_or_else(|| AppError::NotFound(format!("locale '{segment}'")))
}

fn home_for(ctx: &AuthContext, locale: &str) -> Redirect {
    if ctx.get_current_user_id().is_some() {
        Redirect::to(&format!("/{locale}/dashboard"))
    } else {
        Redirect::to(&format!("/{locale}/login"))
    }
}

/// `/`: picks a locale from `Accept-Language` and sends the caller home.
pub async fn landing(State(state): State<AppState>, ctx: AuthContext, headers: HeaderMap) -> Redirect {
    let accept = headers.get(header::ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
    let locale = state.locales.negotiate(accept);
    home_for(&ctx, locale)
}

/// `/{locale}`
pub async fn locale_landing(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    ctx: AuthContext,
) -> Result<Redirect, AppError> {
    let locale = resolve_locale(&state, &locale)?;
    Ok(home_for(&ctx, &locale))
}

/// `/{locale}/login`: signed-in callers are sent on to the dashboard.
pub async fn login(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    ctx: AuthContext,
) -> Result<Response, AppError> {
    let locale = resolve_locale(&state, &locale)?;
    if ctx.get_current_user_id().is_some() {
        return Ok(Redirect::to(&format!("/{locale}/dashboard")).into_response());
    }
    Ok(Json(PageModel::new("login", locale)).into_response())
}

/// `/{locale}/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    ctx: AuthContext,
    uri: Uri,
) -> Result<Json<PageModel>, PageError> {
    let locale = resolve_locale(&state, &locale)?;
    ctx.require_current_user_id().map_err(|e| PageError::login(&locale, &uri, e))?;

    let client = RpcClient::local(Arc::clone(&state.router), ctx);
    let viewer = client.call::<Me>(()).await?;

    let mut model = PageModel::new("dashboard", locale);
    model.viewer = Some(viewer);
    Ok(Json(model))
}

/// `/{locale}/settings/{section}`
pub async fn settings(
    State(state): State<AppState>,
    Path((locale, section)): Path<(String, String)>,
    ctx: AuthContext,
    uri: Uri,
) -> Result<Json<PageModel>, PageError> {
    let locale = resolve_locale(&state, &locale)?;
    ctx.require_current_user_id().map_err(|e| PageError::login(&locale, &uri, e))?;
    let section = section.parse::<SettingsSection>()?;

    let mut model = PageModel::new("settings", locale);
    model.viewer = ctx.session().map(|s| s.user.clone());
    model.section = Some(section);
    model.sections = SettingsSection::ALL.to_vec();
    Ok(Json(model))
}
