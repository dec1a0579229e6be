use std::path::PathBuf;

use clap::Parser;

use super::schema::{AgentConfig, SendMode};

#[derive(Debug, Default, Parser)]
#[command(name = "metrix-agent", about = "Runtime metric collector and reporter")]
pub struct AgentArgs {
    /// YAML config file.
    #[arg(short = 'c', long = "config", env = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Server address (host:port or URL).
    #[arg(short = 'a', long = "address", env = "ADDRESS")]
    pub address: Option<String>,

    /// Seconds between samples.
    #[arg(short = 'p', long = "poll-interval", env = "POLL_INTERVAL")]
    pub poll_interval: Option<u64>,

    /// Seconds between reports.
    #[arg(short = 'r', long = "report-interval", env = "REPORT_INTERVAL")]
    pub report_interval: Option<u64>,

    /// HMAC-SHA256 signing key.
    #[arg(short = 'k', long = "key", env = "KEY")]
    pub key: Option<String>,

    #[arg(short = 'm', long = "mode", env = "MODE", value_enum)]
    pub mode: Option<SendMode>,

    /// Gzip request bodies.
    #[arg(long = "compress", env = "COMPRESS")]
    pub compress: Option<bool>,

    /// Concurrent requests in single-metric modes.
    #[arg(short = 'l', long = "rate-limit", env = "RATE_LIMIT")]
    pub max_in_flight: Option<usize>,
}

impl AgentArgs {
    pub fn apply(&self, cfg: &mut AgentConfig) {
        if let Some(v) = &self.address {
            cfg.address = v.clone();
        }
        if let Some(v) = self.poll_interval {
            cfg.poll_interval_secs = v;
        }
        if let Some(v) = self.report_interval {
            cfg.report_interval_secs = v;
        }
        if let Some(v) = &self.key {
            cfg.key = v.clone();
        }
        if let Some(v) = self.mode {
            cfg.mode = v;
        }
        if let Some(v) = self.compress {
            cfg.compress = v;
        }
        if let Some(v) = self.max_in_flight {
            cfg.max_in_flight = v;
        }
    }
}
