//! Ingestion and query endpoints.
//!
//! - `POST /update/{type}/{name}/{value}` : path-encoded single update
//! - `POST /update/`  : one JSON metric
//! - `POST /updates/` : JSON batch
//! - `GET  /value/{type}/{name}` : plain-text value
//! - `POST /value/`   : JSON lookup

pub mod update;
pub mod value;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use metrix_core::error::{MetrixError, Result};
use metrix_core::protocol::{self, MetricKind, WireMetric, SIGNATURE_HEADER};
use metrix_core::MetricStore;

use crate::app_state::AppState;

/// Inflate and verify a request body per its headers.
pub(crate) fn open_body(app: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<Vec<u8>> {
    let encoding = header_str(headers, header::CONTENT_ENCODING.as_str())?;
    let signature = header_str(headers, SIGNATURE_HEADER)?;
    protocol::open(body, encoding, signature, app.key())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| MetrixError::MalformedPayload(format!("header {name} is not ascii")))
        })
        .transpose()
}

/// Current stored value as a wire metric (counter total travels as delta).
pub(crate) fn lookup(store: &MetricStore, kind: MetricKind, id: &str) -> Result<WireMetric> {
    let found = match kind {
        MetricKind::Counter => store.counter(id).map(|v| WireMetric::counter(id, v)),
        MetricKind::Gauge => store.gauge(id).map(|v| WireMetric::gauge(id, v)),
    };
    found.ok_or_else(|| MetrixError::NotFound(format!("{kind} {id}")))
}

/// JSON response, signed when a key is configured.
pub(crate) fn signed_json<T: Serialize + ?Sized>(app: &AppState, value: &T) -> Result<Response> {
    let body = serde_json::to_vec(value)
        .map_err(|e| MetrixError::Internal(format!("encode response: {e}")))?;

    let mut resp = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body.clone(),
    )
        .into_response();

    if let Some(key) = app.key() {
        let digest = HeaderValue::from_str(&key.sign(&body))
            .map_err(|e| MetrixError::Internal(format!("signature header: {e}")))?;
        let name = HeaderName::from_bytes(SIGNATURE_HEADER.as_bytes())
            .map_err(|e| MetrixError::Internal(format!("signature header: {e}")))?;
        resp.headers_mut().insert(name, digest);
    }
    Ok(resp)
}
