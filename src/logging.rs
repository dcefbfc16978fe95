//! Logging
//!
//! `tracing` subscriber setup for the partfs binary. Storage operations emit
//! events; this module decides where they go.
//!
//! Environment overrides configuration:
//! - `PARTFS_LOG`: filter directives (`debug`, `partfs::partition=trace`, ...)
//! - `PARTFS_LOG_FORMAT`: `text` or `json`
//! - `PARTFS_LOG_OUTPUT`: `stderr`, `stdout` or `file`
//! - `PARTFS_LOG_FILE`: log file path when output is `file`

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Where log events are written. Stdout is left to command output by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stderr,
    Stdout,
    File,
}

impl FromStr for LogOutput {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stderr" => Ok(LogOutput::Stderr),
            "stdout" => Ok(LogOutput::Stdout),
            "file" => Ok(LogOutput::File),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log output '{}' (expected stderr, stdout or file)",
                other
            ))),
        }
    }
}

/// `[logging]` configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Filter directives, used when `PARTFS_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file: Option<PathBuf>,
    /// ANSI colors for text output on a terminal stream
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::Stderr,
            file: None,
            color: true,
        }
    }
}

impl LoggingConfig {
    /// Apply `PARTFS_LOG_FORMAT`, `PARTFS_LOG_OUTPUT` and `PARTFS_LOG_FILE`.
    fn with_env_overrides(&self) -> Result<Self, ApiError> {
        let mut effective = self.clone();
        if let Some(format) = non_empty_env("PARTFS_LOG_FORMAT") {
            effective.format = format.parse()?;
        }
        if let Some(output) = non_empty_env("PARTFS_LOG_OUTPUT") {
            effective.output = output.parse()?;
        }
        if let Some(file) = non_empty_env("PARTFS_LOG_FILE") {
            effective.file = Some(PathBuf::from(file));
        }
        Ok(effective)
    }

    fn filter(&self) -> Result<EnvFilter, ApiError> {
        if let Ok(filter) = EnvFilter::try_from_env("PARTFS_LOG") {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level).map_err(|e| {
            ApiError::ConfigError(format!("Invalid log level '{}': {}", self.level, e))
        })
    }

    /// Log file location: configured path, else the platform state dir.
    pub fn log_file_path(&self) -> Result<PathBuf, ApiError> {
        match &self.file {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => default_log_file_path(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn default_log_file_path() -> Result<PathBuf, ApiError> {
    let project_dirs = directories::ProjectDirs::from("", "partfs", "partfs").ok_or_else(|| {
        ApiError::ConfigError("Could not determine platform state directory for log file".to_string())
    })?;
    let state_dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir());
    Ok(state_dir.join("partfs.log"))
}

fn open_log_file(path: &Path) -> Result<Arc<std::fs::File>, ApiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ApiError::ConfigError(format!("Failed to open log file {}: {}", path.display(), e))
        })?;
    Ok(Arc::new(file))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    let config = config.with_env_overrides()?;
    let filter = if config.enabled {
        config.filter()?
    } else {
        EnvFilter::new("off")
    };

    let writer = match config.output {
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::File => BoxMakeWriter::new(open_log_file(&config.log_file_path()?)?),
    };
    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);

    let registry = Registry::default().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Text => {
            let ansi = config.color && config.output != LogOutput::File;
            registry.with(layer.with_ansi(ansi)).try_init()
        }
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}
