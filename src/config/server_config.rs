//! Web server configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Port the form is served on unless overridden.
pub const DEFAULT_PORT: u16 = 8501;

/// Server environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEnvConfig {
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            open_browser: true,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse::<u16>()
                .context("Failed to parse SERVER_PORT")?,
            open_browser: env::var("OPEN_BROWSER")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerEnvConfig::default();
        assert_eq!(config.port, 8501);
        assert_eq!(config.bind_address(), "127.0.0.1:8501");
        assert!(config.open_browser);
    }
}
