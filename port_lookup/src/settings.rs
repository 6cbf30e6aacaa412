//! Layered configuration: embedded defaults, optional local file, environment.

use anyhow::{anyhow, Result};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::loader;

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: false,
        }
    }
}

/// Dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: loader::default_source(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load settings from the embedded defaults, `port_lookup.toml` and `PORTS__*` variables
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name("port_lookup").required(false))
            .add_source(
                Environment::with_prefix("PORTS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port cannot be 0"));
        }
        if self.data.path.as_os_str().is_empty() {
            return Err(anyhow!("Data path cannot be empty"));
        }
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => return Err(anyhow!("Unknown log format: {}", other)),
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| anyhow!("Invalid server host {}: {}", self.server.host, e))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Overwrite host and port from an explicit address.
    pub fn set_listen_addr(&mut self, addr: SocketAddr) {
        self.server.host = addr.ip().to_string();
        self.server.port = addr.port();
    }
}
