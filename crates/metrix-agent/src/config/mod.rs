//! Agent config loader.
//!
//! Same layering as the server: defaults < YAML file < environment < CLI
//! flags, with the YAML layer strict and validated.

pub mod cli;
pub mod schema;

use std::fs;
use std::path::Path;

use metrix_core::error::{MetrixError, Result};

pub use cli::AgentArgs;
pub use schema::{AgentConfig, SendMode};

pub fn load(args: &AgentArgs) -> Result<AgentConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_from_file(path)?,
        None => AgentConfig::default(),
    };
    args.apply(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &Path) -> Result<AgentConfig> {
    let s = fs::read_to_string(path).map_err(|e| {
        MetrixError::InvalidConfig(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AgentConfig> {
    let cfg: AgentConfig = serde_yaml::from_str(s)
        .map_err(|e| MetrixError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
