//! Exporter config loader (strict parsing).
//!
//! Configuration comes from a YAML file when `HOMEPROM_CONFIG` is set, and
//! from plain environment variables otherwise. Both paths produce the same
//! [`ExporterConfig`] and run the same validation.

pub mod env;
pub mod schema;

use std::fs;

use homeprom_core::error::{HomepromError, Result};

pub use env::{from_env, from_lookup};
pub use schema::{ExporterConfig, FeedMode, HueConfig, QuoteConfig, RefreshSection, ServerSection, WeatherConfig};

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_VAR: &str = "HOMEPROM_CONFIG";

/// Load from `HOMEPROM_CONFIG` if present, otherwise from the environment.
pub fn load() -> Result<ExporterConfig> {
    match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) if !path.trim().is_empty() => load_from_file(path.trim()),
        _ => from_env(),
    }
}

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| HomepromError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| HomepromError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
