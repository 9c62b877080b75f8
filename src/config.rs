//! Configuration types for nzb-slurp

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::selection::Selection;

/// NNTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server hostname
    #[serde(default)]
    pub host: String,

    /// Server port (default: 119)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use TLS/SSL
    #[serde(default)]
    pub tls: bool,

    /// Username (optional, authentication is skipped when absent)
    #[serde(default)]
    pub username: Option<String>,

    /// Password (optional)
    #[serde(default)]
    pub password: Option<String>,
}

impl ServerConfig {
    /// `host:port` address used to open the transport
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            tls: false,
            username: None,
            password: None,
        }
    }
}

/// Download behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Number of parallel connections per file (default: 1)
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Render the carriage-return progress line to stderr (default: true)
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Process PAR2 files after everything else (default: false)
    #[serde(default)]
    pub par2_last: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            progress: true,
            par2_last: false,
        }
    }
}

/// File selection applied against each file's display name
///
/// With no patterns every file is selected (or, with `par2_only`, every PAR2 file).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Shell-style globs (`*`, `?`, `[...]`); a file matching any of them is selected
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Select files matching none of the patterns instead
    #[serde(default)]
    pub invert: bool,

    /// Only select PAR2 files
    #[serde(default)]
    pub par2_only: bool,
}

/// Main configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// NNTP server to fetch from
    #[serde(default)]
    pub server: ServerConfig,

    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// File selection
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })
    }

    /// Check that the configuration can drive a download run.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::config("server.host", "server host is required"));
        }
        if self.server.port == 0 {
            return Err(Error::config("server.port", "port must be non-zero"));
        }
        if self.download.threads == 0 {
            return Err(Error::config(
                "download.threads",
                "thread count must be at least 1",
            ));
        }
        Selection::from_config(&self.selection)?;
        Ok(())
    }
}

fn default_port() -> u16 {
    119
}

fn default_threads() -> usize {
    1
}

fn default_true() -> bool {
    true
}
