//! Server configuration.
//!
//! Defaults match a local development server: `127.0.0.1:8080`, backlog 5,
//! files served from `./static`. A YAML file named by `WICKET_CONFIG` may
//! override any field, and `WICKET_HOST`, `WICKET_PORT` and
//! `WICKET_STATIC_DIR` override the file.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::http::frame::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_HEADER_BYTES};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Pending-connection queue length passed to `listen(2)`.
    pub backlog: u32,
    pub static_dir: PathBuf,
    pub read_chunk_size: usize,
    pub max_header_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backlog: 5,
            static_dir: PathBuf::from("static"),
            read_chunk_size: DEFAULT_CHUNK_SIZE,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` to resolve variables.
    pub fn load_from<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup("WICKET_CONFIG") {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(host) = lookup("WICKET_HOST") {
            cfg.host = host;
        }
        if let Some(port) = lookup("WICKET_PORT") {
            cfg.port = port
                .parse()
                .with_context(|| format!("invalid WICKET_PORT {:?}", port))?;
        }
        if let Some(dir) = lookup("WICKET_STATIC_DIR") {
            cfg.static_dir = PathBuf::from(dir);
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
