//! Service configuration.
//!
//! Loaded from an optional TOML file, then overridden by `LINKHUB_ADDR`
//! and `LINKHUB_CATALOG` environment variables.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Default catalog site the service scrapes.
pub const DEFAULT_CATALOG: &str = "https://movielinkhub.fun";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen address.
    pub addr: SocketAddr,
    /// Base URL of the catalog site.
    pub catalog_base_url: String,
    /// Name reported in the combined endpoint's envelope.
    pub developer: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            catalog_base_url: DEFAULT_CATALOG.to_string(),
            developer: "linkhub".to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file when given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };

        if let Ok(addr) = std::env::var("LINKHUB_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|_| Error::Custom(format!("invalid LINKHUB_ADDR: {}", addr)))?;
        }
        if let Ok(base) = std::env::var("LINKHUB_CATALOG") {
            config.catalog_base_url = base;
        }

        config.catalog_base_url = config.catalog_base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| Error::Custom(format!("invalid config: {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.addr.port(), 8000);
        assert_eq!(config.catalog_base_url, DEFAULT_CATALOG);
    }

    #[test]
    fn parses_toml() -> anyhow::Result<()> {
        let config = Config::from_toml(
            r#"
addr = "127.0.0.1:9000"
catalog_base_url = "https://mirror.example"
developer = "someone"
"#,
        )?;
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.catalog_base_url, "https://mirror.example");
        assert_eq!(config.developer, "someone");
        Ok(())
    }

    #[test]
    fn partial_toml_keeps_defaults() -> anyhow::Result<()> {
        let config = Config::from_toml(r#"developer = "someone""#)?;
        assert_eq!(config.addr.port(), 8000);
        assert_eq!(config.catalog_base_url, DEFAULT_CATALOG);
        Ok(())
    }
}
