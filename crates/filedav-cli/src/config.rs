//! Optional TOML configuration file.
//!
//! ```toml
//! [dav]
//! root = "/srv/webdav"
//! port = 8080
//!
//! [files]
//! root = "/srv/uploads"
//! bind = "127.0.0.1"
//! ```
//!
//! Every key is optional. Command-line flags and environment variables take
//! precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Settings for one server mode.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub root: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind: Option<IpAddr>,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub dav: ServerSection,
    #[serde(default)]
    pub files: ServerSection,
}

impl Config {
    /// Load the configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
