//! Operational HTTP endpoints.
//!
//! - `/metrics` : full snapshot as JSON
//! - `/ping`    : database health (500 when absent or unreachable)

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;

use metrix_core::error::MetrixError;

use crate::app_state::AppState;
use crate::error::ApiResult;
use crate::persist::BackendKind;

pub async fn metrics(State(app): State<AppState>) -> ApiResult<Response> {
    let snapshot = app.store().snapshot();
    Ok(crate::api::signed_json(&app, &snapshot)?)
}

pub async fn ping(State(app): State<AppState>) -> ApiResult<StatusCode> {
    let Some(backend) = app.backend().filter(|b| b.kind() == BackendKind::Database) else {
        return Err(MetrixError::BackendUnreachable("no database configured".into()).into());
    };
    backend.ping().await?;
    Ok(StatusCode::OK)
}
