use std::env;

use tracing::warn;

/// Server configuration with builder-style overrides.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }

    /// Defaults overridden by `TRIPPLAN_HOST` / `TRIPPLAN_PORT` where set.
    /// An unparseable value keeps the default rather than failing startup.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(host) = env::var("TRIPPLAN_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("TRIPPLAN_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(e) => warn!("Invalid TRIPPLAN_PORT value: {e}, using {}", config.port),
            }
        }
        config
    }

    /// Set the host
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}
