use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use healthbeat_core::error::{Result, ServiceError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub service: ServiceSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            service: ServiceSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ServiceError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.service.validate()?;

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.service.listen_addr()
    }

    pub fn load_duration(&self) -> Duration {
        Duration::from_millis(self.service.load_duration_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Directory holding the frontend `index.html`.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,

    /// Length of one `/api/load` burst.
    #[serde(default = "default_load_duration_ms")]
    pub load_duration_ms: u64,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            frontend_dir: default_frontend_dir(),
            load_duration_ms: default_load_duration_ms(),
        }
    }
}

impl ServiceSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(100..=10_000).contains(&self.load_duration_ms) {
            return Err(ServiceError::Config(
                "service.load_duration_ms must be between 100 and 10000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ServiceError::Config(format!("service.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:5000".into()
}
fn default_frontend_dir() -> PathBuf {
    PathBuf::from("../frontend")
}
fn default_load_duration_ms() -> u64 {
    1000
}
