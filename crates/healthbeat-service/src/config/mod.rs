//! Service config loader (strict parsing).
//!
//! The config file is optional. When it is absent every setting takes its
//! default, which reproduces the stock service (`0.0.0.0:5000`).

pub mod schema;

use std::{fs, io, path::Path};

use healthbeat_core::error::{Result, ServiceError};

pub use schema::{ServiceConfig, ServiceSection};

/// Default config path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "healthbeat.yaml";
/// Environment variable overriding [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "HEALTHBEAT_CONFIG";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<ServiceConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| ServiceError::Config(format!("read {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| ServiceError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ServiceConfig> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(s) => {
            tracing::info!(path = %path.display(), "loading config");
            load_from_str(&s)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(ServiceConfig::default())
        }
        Err(e) => Err(ServiceError::Config(format!("read {} failed: {e}", path.display()))),
    }
}
