//! TOML configuration file support.
//!
//! Store settings can be kept in a config file instead of the defaults:
//!
//! ```toml
//! # mzdb.toml
//! [store]
//! cache_size_kib = 65536
//! mmap_size = 268435456
//! strict_version = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use mzdb::store::StoreConfig;

/// Root configuration structure for mzdb.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Store settings; unset keys keep the default.
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
