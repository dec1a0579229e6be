use std::time::Duration;

use serde::Deserialize;

use metrix_core::error::{MetrixError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,

    /// Seconds between periodic saves; `<= 0` disables them.
    #[serde(default = "default_store_interval_secs")]
    pub store_interval_secs: i64,

    /// Empty disables file persistence.
    #[serde(default = "default_file_storage_path")]
    pub file_storage_path: String,

    #[serde(default = "default_restore")]
    pub restore: bool,

    /// Non-empty selects PostgreSQL over the file backend.
    #[serde(default)]
    pub database_dsn: String,

    /// Shared HMAC key; empty disables signing.
    #[serde(default)]
    pub key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            store_interval_secs: default_store_interval_secs(),
            file_storage_path: default_file_storage_path(),
            restore: default_restore(),
            database_dsn: String::new(),
            key: String::new(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        let port = self
            .address
            .rsplit_once(':')
            .map(|(_, port)| port)
            .ok_or_else(|| {
                MetrixError::InvalidConfig(format!(
                    "address must be host:port, got {:?}",
                    self.address
                ))
            })?;
        port.parse::<u16>().map_err(|_| {
            MetrixError::InvalidConfig(format!("address has an invalid port: {:?}", self.address))
        })?;
        Ok(())
    }

    pub fn store_interval(&self) -> Option<Duration> {
        u64::try_from(self.store_interval_secs)
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }

    pub fn uses_database(&self) -> bool {
        !self.database_dsn.is_empty()
    }
}

fn default_address() -> String {
    "localhost:8080".into()
}
fn default_store_interval_secs() -> i64 {
    300
}
fn default_file_storage_path() -> String {
    "/tmp/metrics-db.json".into()
}
fn default_restore() -> bool {
    true
}
