use crate::api::AppState;
use crate::domain::auth::AuthContext;
use crate::error::{AppError, Result};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde_json::Value;

/// Lists every addressable `<group>.<procedure>` path.
pub async fn list_procedures(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.router.paths())
}

/// Runs one procedure. The body is the procedure input; an empty body means `null`.
pub async fn call_procedure(
    State(state): State<AppState>,
    Path(path): Path<String>,
    ctx: AuthContext,
    body: Bytes,
) -> Result<Json<Value>> {
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("Malformed JSON body: {e}")))?
    };

    let output = state.router.dispatch(&path, &ctx, input).await?;
    Ok(Json(output))
}
