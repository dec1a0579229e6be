use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use metrix_core::error::MetrixError;
use metrix_core::protocol::{codec, MetricKind, MetricValue, WireMetric};
use metrix_core::Snapshot;

use crate::app_state::AppState;
use crate::error::ApiResult;

use super::{lookup, open_body, signed_json};

/// `POST /update/{type}/{name}/{value}`
pub async fn update_path(
    State(app): State<AppState>,
    Path((kind, name, value)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let kind: MetricKind = kind.parse()?;
    let metric = match kind {
        MetricKind::Counter => {
            // u64::from_str accepts a leading '+'; counters take plain digits only
            let delta: u64 = value
                .parse()
                .ok()
                .filter(|_| !value.starts_with('+'))
                .ok_or_else(|| {
                    MetrixError::MalformedPayload(format!("bad counter value: {value}"))
                })?;
            WireMetric::counter(name, delta)
        }
        MetricKind::Gauge => {
            let v: f64 = value.parse().map_err(|_| {
                MetrixError::MalformedPayload(format!("bad gauge value: {value}"))
            })?;
            WireMetric::gauge(name, v)
        }
    };
    metric.validate()?;
    apply(&app, &metric);
    Ok(StatusCode::OK)
}

/// `POST /update/` with one JSON metric; answers with the stored value.
pub async fn update_json(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let plain = open_body(&app, &headers, &body)?;
    let metric = codec::decode_single(&plain)?;
    apply(&app, &metric);

    let current = lookup(app.store(), metric.kind(), &metric.id)?;
    Ok(signed_json(&app, &current)?)
}

/// `POST /updates/` with a JSON array; validated as a whole, then merged.
pub async fn update_batch(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let plain = open_body(&app, &headers, &body)?;
    let metrics = codec::decode_batch(&plain)?;
    let batch = Snapshot::from_metrics(&metrics);
    app.store().merge(&batch);
    tracing::debug!(
        metrics = metrics.len(),
        counters = batch.counter.len(),
        gauges = batch.gauge.len(),
        "batch merged"
    );
    Ok(StatusCode::OK)
}

fn apply(app: &AppState, metric: &WireMetric) {
    match metric.value {
        MetricValue::Counter(_) => {
            let delta = metric.counter_delta().unwrap_or_default();
            let total = app.store().increment_counter(&metric.id, delta);
            tracing::debug!(name = %metric.id, delta, total, "counter updated");
        }
        MetricValue::Gauge(v) => {
            app.store().update_gauge(&metric.id, v);
            tracing::debug!(name = %metric.id, value = v, "gauge updated");
        }
    }
}
