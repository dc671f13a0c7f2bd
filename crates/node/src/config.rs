//! Node configuration.
//!
//! Loaded from TOML. Every field has a default so a partial file (or no
//! file at all) yields a usable node.

use seele_p2p::P2pConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_RPC_ADDR: &str = "127.0.0.1:55027";
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:65027";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub name: String,
    pub data_dir: PathBuf,
    pub p2p: P2pConfig,
    /// Raw socket JSON-RPC listen address.
    pub rpc_addr: String,
    /// HTTP JSON-RPC listen address.
    pub http_addr: String,
    /// Hosts accepted in the HTTP `Host` header. `*` accepts any host.
    pub http_white_host: Vec<String>,
    /// Origins allowed to call over HTTP from a browser. `*` allows any.
    pub http_cors: Vec<String>,
    pub log: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "seele-node".to_string(),
            data_dir: PathBuf::from("data"),
            p2p: P2pConfig::default(),
            rpc_addr: DEFAULT_RPC_ADDR.to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_white_host: vec!["localhost".to_string()],
            http_cors: Vec::new(),
            log: LoggingConfig::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line text
    #[default]
    Text,
    /// One JSON object per event
    Json,
    /// Multi-line text for local debugging
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format `{other}` (expected text, json or pretty)")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Pretty => "pretty",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub console_output: bool,
    /// Log file or directory. No file logging when unset.
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            console_output: true,
            file_path: None,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("rpc_addr must not be empty".to_string()));
        }
        if self.http_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("http_addr must not be empty".to_string()));
        }
        if self.rpc_addr.trim() == self.http_addr.trim() {
            return Err(ConfigError::Invalid(format!(
                "rpc_addr and http_addr must differ (both {})",
                self.rpc_addr
            )));
        }
        Ok(())
    }
}
