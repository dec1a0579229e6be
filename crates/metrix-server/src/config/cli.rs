use std::path::PathBuf;

use clap::Parser;

use super::schema::ServerConfig;

/// Flags and environment variables; each one, when set, overrides the file.
#[derive(Debug, Default, Parser)]
#[command(name = "metrix-server", about = "Metric ingestion and persistence server")]
pub struct ServerArgs {
    /// YAML config file.
    #[arg(short = 'c', long = "config", env = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address (host:port).
    #[arg(short = 'a', long = "address", env = "ADDRESS")]
    pub address: Option<String>,

    /// Seconds between snapshot saves (<= 0 disables).
    #[arg(
        short = 'i',
        long = "store-interval",
        env = "STORE_INTERVAL",
        allow_negative_numbers = true
    )]
    pub store_interval: Option<i64>,

    /// Snapshot file path.
    #[arg(short = 'f', long = "file-storage-path", env = "FILE_STORAGE_PATH")]
    pub file_storage_path: Option<String>,

    /// Load the last snapshot at startup.
    #[arg(short = 'r', long = "restore", env = "RESTORE")]
    pub restore: Option<bool>,

    /// PostgreSQL connection string.
    #[arg(short = 'd', long = "database-dsn", env = "DATABASE_DSN")]
    pub database_dsn: Option<String>,

    /// HMAC-SHA256 signing key.
    #[arg(short = 'k', long = "key", env = "KEY")]
    pub key: Option<String>,
}

impl ServerArgs {
    pub fn apply(&self, cfg: &mut ServerConfig) {
        if let Some(v) = &self.address {
            cfg.address = v.clone();
        }
        if let Some(v) = self.store_interval {
            cfg.store_interval_secs = v;
        }
        if let Some(v) = &self.file_storage_path {
            cfg.file_storage_path = v.clone();
        }
        if let Some(v) = self.restore {
            cfg.restore = v;
        }
        if let Some(v) = &self.database_dsn {
            cfg.database_dsn = v.clone();
        }
        if let Some(v) = &self.key {
            cfg.key = v.clone();
        }
    }
}
