//! Server config loader.
//!
//! Precedence: defaults < YAML file < environment < CLI flags. The YAML layer
//! is strict (`deny_unknown_fields`); environment and flags are resolved by
//! clap and overlaid on top.

pub mod cli;
pub mod schema;

use std::fs;
use std::path::Path;

use metrix_core::error::{MetrixError, Result};

pub use cli::ServerArgs;
pub use schema::ServerConfig;

pub fn load(args: &ServerArgs) -> Result<ServerConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_from_file(path)?,
        None => ServerConfig::default(),
    };
    args.apply(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &Path) -> Result<ServerConfig> {
    let s = fs::read_to_string(path).map_err(|e| {
        MetrixError::InvalidConfig(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| MetrixError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
