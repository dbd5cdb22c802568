//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use folio_core::error::{FolioError, Result};

pub use schema::{GatewayConfig, GatewaySection, PresenceSection};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "folio.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| FolioError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| FolioError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from `$FOLIO_CONFIG` (or `folio.yaml`); a missing file means defaults.
pub fn load_from_env() -> Result<GatewayConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::info!(%path, "config file not found, using defaults");
        return Ok(GatewayConfig::default());
    }
    tracing::info!(%path, "loading config");
    load_from_file(&path)
}
