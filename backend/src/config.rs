//! Server configuration.
//!
//! Defaults live in constants. `ServerConfig::from_env` loads `.env` (if
//! present) and reads:
//!
//! | Variable                 | Default     |
//! |--------------------------|-------------|
//! | `POLIZAS_HOST`           | `0.0.0.0`   |
//! | `POLIZAS_PORT`           | `3000`      |
//! | `POLIZAS_MAX_UPLOAD_MB`  | `20`        |
//!
//! CLI flags override host and port.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::api::logs::log_warning;

pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Upload size limit, in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;

/// Entries an SSE client may lag behind before losing the oldest.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Base name of the exported workbook; the date is appended.
pub const EXPORT_FILE_STEM: &str = "validacion_polizas";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Build from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Invalid values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("POLIZAS_HOST") {
            match raw.trim().parse() {
                Ok(host) => config.host = host,
                Err(_) => log_warning(format!("Ignoring invalid POLIZAS_HOST '{}'", raw)),
            }
        }

        if let Some(raw) = lookup("POLIZAS_PORT") {
            match raw.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => log_warning(format!("Ignoring invalid POLIZAS_PORT '{}'", raw)),
            }
        }

        if let Some(raw) = lookup("POLIZAS_MAX_UPLOAD_MB") {
            match raw.trim().parse::<usize>() {
                Ok(mb) if mb > 0 => config.max_upload_bytes = mb * 1024 * 1024,
                _ => log_warning(format!("Ignoring invalid POLIZAS_MAX_UPLOAD_MB '{}'", raw)),
            }
        }

        config
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn with_host(mut self, host: Option<IpAddr>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
