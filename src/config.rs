/*!
 * Configuration structures and defaults (spec 11).
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DistcpError, Result};
use crate::model::TransferOptions;

/// Minimum severity emitted by the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Main configuration for a `Copy` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    pub overwrite: bool,
    pub checksum: bool,
    pub preserve: bool,
    pub chunk_size: usize,
    pub threads: i64,

    pub log_level: LogLevel,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            checksum: true,
            preserve: false,
            chunk_size: 64 * 1024,
            threads: 1,
            log_level: LogLevel::Info,
            verbose: false,
            log_file: None,
        }
    }
}

impl From<&CopyConfig> for TransferOptions {
    fn from(config: &CopyConfig) -> Self {
        Self {
            overwrite: config.overwrite,
            checksum: config.checksum,
            preserve: config.preserve,
            chunk_size: config.chunk_size,
            n_threads: config.threads,
        }
    }
}

/// On-disk configuration file structure (TOML).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: ConfigDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigDefaults {
    pub overwrite: Option<bool>,
    pub checksum: Option<bool>,
    pub preserve: Option<bool>,
    pub chunk_size: Option<usize>,
    pub threads: Option<i64>,
    pub log_level: Option<LogLevel>,
    pub verbose: Option<bool>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DistcpError::Config(format!("failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| DistcpError::Config(format!("failed to parse config file: {e}")))
    }

    /// Search order: `./distcp.toml`, then `~/.distcp/distcp.toml`, then defaults.
    pub fn load_with_fallback() -> Self {
        if let Ok(config) = Self::load(Path::new("distcp.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".distcp").join("distcp.toml");
            if let Ok(config) = Self::load(&user_config) {
                return config;
            }
        }

        Self::default()
    }

    pub fn apply_to(&self, config: &mut CopyConfig) {
        let d = &self.defaults;
        if let Some(v) = d.overwrite {
            config.overwrite = v;
        }
        if let Some(v) = d.checksum {
            config.checksum = v;
        }
        if let Some(v) = d.preserve {
            config.preserve = v;
        }
        if let Some(v) = d.chunk_size {
            config.chunk_size = v;
        }
        if let Some(v) = d.threads {
            config.threads = v;
        }
        if let Some(v) = d.log_level {
            config.log_level = v;
        }
        if let Some(v) = d.verbose {
            config.verbose = v;
        }
        if let Some(ref v) = d.log_file {
            config.log_file = Some(v.clone());
        }
    }
}
