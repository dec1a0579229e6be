use std::time::Duration;

use serde::Deserialize;

use metrix_core::error::{MetrixError, Result};

/// How a report reaches the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SendMode {
    /// One `POST /updates/` with every metric.
    #[default]
    Batch,
    /// One `POST /update/` JSON body per metric.
    Json,
    /// One `POST /update/{type}/{name}/{value}` per metric.
    Path,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Server address; `http://` is assumed when no scheme is given.
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,

    /// Shared HMAC key; empty disables signing.
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub mode: SendMode,

    #[serde(default = "default_compress")]
    pub compress: bool,

    /// Concurrent requests in the single-metric modes.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            poll_interval_secs: default_poll_interval_secs(),
            report_interval_secs: default_report_interval_secs(),
            key: String::new(),
            mode: SendMode::default(),
            compress: default_compress(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(MetrixError::InvalidConfig("address must not be empty".into()));
        }
        if self.poll_interval_secs < 1 {
            return Err(MetrixError::InvalidConfig("poll interval must be >= 1s".into()));
        }
        if self.report_interval_secs < 1 {
            return Err(MetrixError::InvalidConfig("report interval must be >= 1s".into()));
        }
        if self.max_in_flight < 1 {
            return Err(MetrixError::InvalidConfig("max_in_flight must be >= 1".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        let addr = self.address.trim().trim_end_matches('/');
        if addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{addr}")
        }
    }
}

fn default_address() -> String {
    "localhost:8080".into()
}
fn default_poll_interval_secs() -> u64 {
    2
}
fn default_report_interval_secs() -> u64 {
    10
}
fn default_compress() -> bool {
    true
}
fn default_max_in_flight() -> usize {
    4
}
