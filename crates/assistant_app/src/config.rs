use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use assistant_engine::{BackendSettings, EngineConfig};
use assistant_logging::{LogDestination, DEFAULT_LOG_FILE};
use chrono::Utc;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{Cli, LogTarget};

pub const DEFAULT_CONFIG_FILE: &str = "assistant.ron";
const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Optional settings read from the RON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub log: Option<LogTarget>,
    pub log_file: Option<PathBuf>,
}

pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the file named by `--config`, or the default file if it exists.
pub fn load_for(cli: &Cli) -> Result<AppConfig, ConfigError> {
    match &cli.config {
        Some(path) => load(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load(default_path)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

/// Fully resolved settings: CLI flags over config file over defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    pub download_dir: PathBuf,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: AppConfig) -> Self {
        let mut backend = BackendSettings::default();
        if let Some(url) = cli.backend_url.clone().or(file.backend_url) {
            backend.base_url = url;
        }
        if let Some(secs) = file.connect_timeout_secs {
            backend.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            backend.request_timeout = Duration::from_secs(secs);
        }

        let log_target = cli.log.or(file.log).unwrap_or(LogTarget::File);
        Self {
            backend,
            download_dir: cli
                .download_dir
                .clone()
                .or(file.download_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR)),
            log_destination: match log_target {
                LogTarget::File => LogDestination::File,
                LogTarget::Terminal => LogDestination::Terminal,
                LogTarget::Both => LogDestination::Both,
            },
            log_level: if cli.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            log_file: file
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default_with_download_dir(self.download_dir.clone());
        config.backend = self.backend.clone();
        config.now_millis = Arc::new(|| Utc::now().timestamp_millis());
        config
    }
}
