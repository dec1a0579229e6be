//! Wire metric DTO.
//!
//! JSON shape: `{"id": "...", "type": "counter"|"gauge", "delta": i64?, "value": f64?}`.
//! The typed form ([`WireMetric`]) cannot hold a counter without a delta or a
//! gauge without a value; [`RawMetric`] is the permissive serde mirror that
//! decoding goes through so errors can be classified precisely.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MetrixError, Result};
use crate::store::Snapshot;

/// Metric kind (field name is `type` in JSON).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl FromStr for MetricKind {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "counter" => Ok(MetricKind::Counter),
            "gauge" => Ok(MetricKind::Gauge),
            other => Err(MetrixError::InvalidMetricKind(format!("unknown type: {other:?}"))),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observation carried by one wire metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Contribution to be added to the stored counter.
    Counter(i64),
    /// Absolute replacement for the stored gauge.
    Gauge(f64),
}

/// One validated metric as exchanged between agent and server.
#[derive(Debug, Clone, PartialEq)]
pub struct WireMetric {
    pub id: String,
    pub value: MetricValue,
}

impl WireMetric {
    /// Counter observation. The u64 travels as its i64 bit pattern.
    pub fn counter(id: impl Into<String>, delta: u64) -> Self {
        Self {
            id: id.into(),
            value: MetricValue::Counter(delta as i64),
        }
    }

    pub fn gauge(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value: MetricValue::Gauge(value),
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self.value {
            MetricValue::Counter(_) => MetricKind::Counter,
            MetricValue::Gauge(_) => MetricKind::Gauge,
        }
    }

    /// Counter delta reinterpreted as the storage type.
    pub fn counter_delta(&self) -> Option<u64> {
        match self.value {
            MetricValue::Counter(d) => Some(d as u64),
            MetricValue::Gauge(_) => None,
        }
    }

    pub fn gauge_value(&self) -> Option<f64> {
        match self.value {
            MetricValue::Gauge(v) => Some(v),
            MetricValue::Counter(_) => None,
        }
    }

    /// Reject identities and values the store must never see.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(MetrixError::MalformedPayload("metric id must not be empty".into()));
        }
        if let MetricValue::Gauge(v) = self.value {
            if !v.is_finite() {
                return Err(MetrixError::MalformedPayload(format!(
                    "gauge {} must be finite, got {v}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Permissive serde mirror of the wire shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetric {
    pub id: String,
    #[serde(rename = "type")]
    pub mtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl From<&WireMetric> for RawMetric {
    fn from(m: &WireMetric) -> Self {
        let (delta, value) = match m.value {
            MetricValue::Counter(d) => (Some(d), None),
            MetricValue::Gauge(v) => (None, Some(v)),
        };
        Self {
            id: m.id.clone(),
            mtype: m.kind().as_str().to_string(),
            delta,
            value,
        }
    }
}

impl TryFrom<RawMetric> for WireMetric {
    type Error = MetrixError;

    fn try_from(raw: RawMetric) -> Result<Self> {
        let kind: MetricKind = raw.mtype.parse()?;
        let value = match kind {
            MetricKind::Counter => MetricValue::Counter(raw.delta.ok_or_else(|| {
                MetrixError::InvalidMetricKind(format!("counter {} requires delta", raw.id))
            })?),
            MetricKind::Gauge => MetricValue::Gauge(raw.value.ok_or_else(|| {
                MetrixError::InvalidMetricKind(format!("gauge {} requires value", raw.id))
            })?),
        };
        let metric = WireMetric { id: raw.id, value };
        metric.validate()?;
        Ok(metric)
    }
}

impl Serialize for WireMetric {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RawMetric::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WireMetric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawMetric::deserialize(deserializer)?;
        WireMetric::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Lookup request for `POST /value/`: only `id` and `type` are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub id: String,
    pub kind: MetricKind,
}

impl TryFrom<RawMetric> for MetricQuery {
    type Error = MetrixError;

    fn try_from(raw: RawMetric) -> Result<Self> {
        let kind = raw.mtype.parse()?;
        if raw.id.is_empty() {
            return Err(MetrixError::MalformedPayload("metric id must not be empty".into()));
        }
        Ok(Self { id: raw.id, kind })
    }
}

impl Snapshot {
    /// Flatten into wire metrics: counters carry their accumulated value as
    /// delta, gauges their latest value. Counters come first, each kind in
    /// name order.
    pub fn to_metrics(&self) -> Vec<WireMetric> {
        let counters = self
            .counter
            .iter()
            .map(|(name, v)| WireMetric::counter(name.clone(), *v));
        let gauges = self
            .gauge
            .iter()
            .map(|(name, v)| WireMetric::gauge(name.clone(), *v));
        counters.chain(gauges).collect()
    }

    /// Fold a batch into a snapshot with the store's merge rules, so that
    /// merging the result equals applying each metric in order.
    pub fn from_metrics(metrics: &[WireMetric]) -> Self {
        let mut out = Snapshot::default();
        for m in metrics {
            match m.value {
                MetricValue::Counter(d) => {
                    let slot = out.counter.entry(m.id.clone()).or_insert(0);
                    *slot = slot.wrapping_add(d as u64);
                }
                MetricValue::Gauge(v) => {
                    out.gauge.insert(m.id.clone(), v);
                }
            }
        }
        out
    }
}
