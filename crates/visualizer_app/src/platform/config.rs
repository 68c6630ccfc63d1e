use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use visualizer_core::DEFAULT_TRANSIENT_THRESHOLD;
use visualizer_engine::{TrackerSettings, DEFAULT_BASE_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid base url {value:?}: {reason}")]
    BaseUrl { value: String, reason: String },
    #[error("poll interval must be positive")]
    PollInterval,
}

/// File-backed settings. Absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub transient_error_threshold: u32,
    /// Where the job history and log file live.
    pub state_dir: PathBuf,
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: 3000,
            transient_error_threshold: DEFAULT_TRANSIENT_THRESHOLD,
            state_dir: PathBuf::from("."),
            log_to_file: true,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, base_url: Option<String>, poll_interval_ms: Option<u64>) {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(poll_interval_ms) = poll_interval_ms {
            self.poll_interval_ms = poll_interval_ms;
        }
    }

    pub fn tracker_settings(&self) -> Result<TrackerSettings, ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::PollInterval);
        }
        let mut settings =
            TrackerSettings::with_base_url(&self.base_url).map_err(|err| ConfigError::BaseUrl {
                value: self.base_url.clone(),
                reason: err.to_string(),
            })?;
        settings.poll_interval = Duration::from_millis(self.poll_interval_ms);
        settings.transient_error_threshold = self.transient_error_threshold;
        Ok(settings)
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("visualizer.log")
    }
}
