//! JSON codec for single metrics and batches.
//!
//! Decoding runs in two stages so callers can tell the failures apart:
//! - bytes -> [`RawMetric`]: any JSON/shape error is `MalformedPayload`
//! - [`RawMetric`] -> [`WireMetric`]: bad `type` or missing `delta`/`value`
//!   is `InvalidMetricKind`

use crate::error::{MetrixError, Result};

use super::wire::{MetricQuery, RawMetric, WireMetric};

/// Result of decoding a body whose shape is not known in advance.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Single(WireMetric),
    Batch(Vec<WireMetric>),
}

impl Decoded {
    pub fn into_metrics(self) -> Vec<WireMetric> {
        match self {
            Decoded::Single(m) => vec![m],
            Decoded::Batch(ms) => ms,
        }
    }
}

pub fn encode_single(metric: &WireMetric) -> Result<Vec<u8>> {
    metric.validate()?;
    serde_json::to_vec(metric).map_err(|e| MetrixError::Internal(format!("encode metric: {e}")))
}

pub fn encode_batch(metrics: &[WireMetric]) -> Result<Vec<u8>> {
    for m in metrics {
        m.validate()?;
    }
    serde_json::to_vec(metrics).map_err(|e| MetrixError::Internal(format!("encode batch: {e}")))
}

pub fn decode_single(bytes: &[u8]) -> Result<WireMetric> {
    let raw: RawMetric = serde_json::from_slice(bytes)
        .map_err(|e| MetrixError::MalformedPayload(format!("invalid metric json: {e}")))?;
    WireMetric::try_from(raw)
}

/// Decode a batch. One invalid entry rejects the whole batch.
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<WireMetric>> {
    let raws: Vec<RawMetric> = serde_json::from_slice(bytes)
        .map_err(|e| MetrixError::MalformedPayload(format!("invalid batch json: {e}")))?;
    raws.into_iter().map(WireMetric::try_from).collect()
}

/// Decode either shape, picked by the first non-whitespace byte.
pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') => decode_batch(bytes).map(Decoded::Batch),
        Some(_) => decode_single(bytes).map(Decoded::Single),
        None => Err(MetrixError::MalformedPayload("empty body".into())),
    }
}

pub fn decode_query(bytes: &[u8]) -> Result<MetricQuery> {
    let raw: RawMetric = serde_json::from_slice(bytes)
        .map_err(|e| MetrixError::MalformedPayload(format!("invalid query json: {e}")))?;
    MetricQuery::try_from(raw)
}
