//! Server configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! bind = "0.0.0.0:8080"
//! context_path = "/app"
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `host:port` the server listens on.
    pub bind: String,
    /// Prefix the application is mounted under. Stripped from every request
    /// path before routing.
    pub context_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { bind: "127.0.0.1:3000".to_owned(), context_path: String::new() }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let mut config: Self = toml::from_str(content)?;
        config.context_path = config.context_path.trim_end_matches('/').to_owned();
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, Error> {
        self.bind.parse().map_err(|_| Error::InvalidAddress(self.bind.clone()))
    }

    /// The path the route table sees for a request URI path.
    ///
    /// A path outside the context path is routed unchanged.
    pub fn route_path<'a>(&self, uri_path: &'a str) -> &'a str {
        if self.context_path.is_empty() {
            return uri_path;
        }
        match uri_path.strip_prefix(self.context_path.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => uri_path,
        }
    }
}
