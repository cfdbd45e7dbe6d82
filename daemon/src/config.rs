//! Daemon configuration with TOML file support.

use daoship_store::RetryPolicy;
use daoship_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; every key is
/// optional and falls back to its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_rpc_bind")]
    pub rpc_bind: IpAddr,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Seconds between lifecycle sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Attempts per storage operation, including the first.
    #[serde(default = "default_store_retry_attempts")]
    pub store_retry_attempts: u32,

    #[serde(default = "default_store_retry_backoff_ms")]
    pub store_retry_backoff_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, overridden by `RUST_LOG` when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./daoship_data")
}

fn default_rpc_bind() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_rpc_port() -> u16 {
    5000
}

fn default_sweep_interval_secs() -> u64 {
    30
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_store_retry_attempts() -> u32 {
    3
}

fn default_store_retry_backoff_ms() -> u64 {
    25
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reject values the daemon cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sweep_interval_secs must be at least 1".into(),
            ));
        }
        if self.map_size_mb == 0 {
            return Err(ConfigError::Invalid("map_size_mb must be at least 1".into()));
        }
        self.log_format()?;
        Ok(())
    }

    pub fn rpc_addr(&self) -> SocketAddr {
        SocketAddr::new(self.rpc_bind, self.rpc_port)
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.store_retry_attempts,
            backoff: Duration::from_millis(self.store_retry_backoff_ms),
        }
    }

    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        self.log_format.parse().map_err(ConfigError::Invalid)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_bind: default_rpc_bind(),
            rpc_port: default_rpc_port(),
            sweep_interval_secs: default_sweep_interval_secs(),
            map_size_mb: default_map_size_mb(),
            store_retry_attempts: default_store_retry_attempts(),
            store_retry_backoff_ms: default_store_retry_backoff_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
