//! Delivery of reports to the server.
//!
//! [`Sender`] is the seam between the agent loop and the network.
//! [`HttpSender`] encodes, seals (sign + gzip) and posts metrics, retrying
//! each request under a [`RetryPolicy`]. Any transport error or non-2xx
//! status counts as a failed attempt.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::Url;

use metrix_core::error::{MetrixError, Result};
use metrix_core::protocol::{
    codec, seal, MetricValue, SealedPayload, SigningKey, WireMetric, GZIP_ENCODING,
    SIGNATURE_HEADER,
};
use metrix_core::retry::{retry, RetryPolicy};

use crate::config::{AgentConfig, SendMode};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Sender: Send + Sync {
    /// Deliver one report. Errors are `DeliveryFailed` once retries are spent.
    async fn send(&self, metrics: Vec<WireMetric>) -> Result<()>;
}

pub struct HttpSender {
    client: reqwest::Client,
    base_url: Url,
    mode: SendMode,
    compress: bool,
    key: Option<SigningKey>,
    policy: RetryPolicy,
    max_in_flight: usize,
}

impl HttpSender {
    pub fn new(cfg: &AgentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MetrixError::InvalidConfig(format!("http client: {e}")))?;
        let base_url = Url::parse(&cfg.base_url())
            .map_err(|e| MetrixError::InvalidConfig(format!("server address: {e}")))?;
        Ok(Self {
            client,
            base_url,
            mode: cfg.mode,
            compress: cfg.compress,
            key: SigningKey::from_config(&cfg.key)?,
            policy: RetryPolicy::default(),
            max_in_flight: cfg.max_in_flight.max(1),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn send_batch(&self, metrics: &[WireMetric]) -> Result<()> {
        let json = codec::encode_batch(metrics)?;
        let payload = seal(json, self.compress, self.key.as_ref())?;
        let url = self.endpoint(&["updates", ""])?;
        self.post(&url, Some(&payload)).await
    }

    async fn send_one(&self, metric: WireMetric) -> Result<()> {
        match self.mode {
            SendMode::Path => {
                metric.validate()?;
                let value = path_value(&metric);
                let url = self.endpoint(&["update", metric.kind().as_str(), &metric.id, &value])?;
                self.post(&url, None).await
            }
            SendMode::Json | SendMode::Batch => {
                let json = codec::encode_single(&metric)?;
                let payload = seal(json, self.compress, self.key.as_ref())?;
                let url = self.endpoint(&["update", ""])?;
                self.post(&url, Some(&payload)).await
            }
        }
    }

    /// Base URL extended with percent-encoded path segments. A trailing
    /// `""` segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MetrixError::InvalidConfig(format!("{} cannot be a base url", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_each(&self, metrics: Vec<WireMetric>) -> Result<()> {
        let total = metrics.len();
        let requests: Vec<_> = metrics.into_iter().map(|m| self.send_one(m)).collect();
        let results: Vec<Result<()>> = stream::iter(requests)
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        let mut failures = results.into_iter().filter_map(|r| r.err());
        let Some(first) = failures.next() else {
            return Ok(());
        };
        let failed = 1 + failures.count();
        Err(MetrixError::DeliveryFailed(format!(
            "{failed} of {total} metrics not delivered, first error: {first}"
        )))
    }

    async fn post(&self, url: &Url, payload: Option<&SealedPayload>) -> Result<()> {
        retry(&self.policy, move |_| self.post_once(url, payload)).await
    }

    async fn post_once(&self, url: &Url, payload: Option<&SealedPayload>) -> Result<()> {
        let mut req = self.client.post(url.clone());
        match payload {
            Some(p) => {
                req = req
                    .header(CONTENT_TYPE, "application/json")
                    .body(p.body.clone());
                if p.gzip {
                    req = req.header(CONTENT_ENCODING, GZIP_ENCODING);
                }
                if let Some(sig) = &p.signature {
                    req = req.header(SIGNATURE_HEADER, sig.as_str());
                }
            }
            None => req = req.header(CONTENT_TYPE, "text/plain"),
        }

        let resp = req
            .send()
            .await
            .map_err(|e| MetrixError::DeliveryFailed(format!("POST {url}: {e}")))?;
        let status = resp.status();
        // always drain so the connection goes back to the pool
        let drained = resp.bytes().await;
        if !status.is_success() {
            return Err(MetrixError::DeliveryFailed(format!("POST {url}: status {status}")));
        }
        drained.map_err(|e| MetrixError::DeliveryFailed(format!("POST {url}: read body: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(&self, metrics: Vec<WireMetric>) -> Result<()> {
        if metrics.is_empty() {
            return Ok(());
        }
        let n = metrics.len();
        match self.mode {
            SendMode::Batch => self.send_batch(&metrics).await?,
            SendMode::Json | SendMode::Path => self.send_each(metrics).await?,
        }
        tracing::debug!(metrics = n, mode = ?self.mode, "report delivered");
        Ok(())
    }
}

fn path_value(metric: &WireMetric) -> String {
    match metric.value {
        MetricValue::Counter(_) => metric.counter_delta().unwrap_or_default().to_string(),
        MetricValue::Gauge(v) => v.to_string(),
    }
}
