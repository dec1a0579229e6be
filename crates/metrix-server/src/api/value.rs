use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;

use metrix_core::protocol::{codec, MetricKind, MetricValue};

use crate::app_state::AppState;
use crate::error::ApiResult;

use super::{lookup, open_body, signed_json};

/// `GET /value/{type}/{name}` as plain text.
pub async fn value_path(
    State(app): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> ApiResult<String> {
    let kind: MetricKind = kind.parse()?;
    let metric = lookup(app.store(), kind, &name)?;
    let text = match metric.value {
        MetricValue::Counter(_) => metric.counter_delta().unwrap_or_default().to_string(),
        MetricValue::Gauge(v) => v.to_string(),
    };
    Ok(text)
}

/// `POST /value/` with `{"id", "type"}`; answers with the populated metric.
pub async fn value_json(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let plain = open_body(&app, &headers, &body)?;
    let query = codec::decode_query(&plain)?;
    let metric = lookup(app.store(), query.kind, &query.id)?;
    Ok(signed_json(&app, &metric)?)
}
