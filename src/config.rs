//! Tracker configuration (`htrack.toml`)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analytics::{DEFAULT_ADHERENCE_WINDOW, DEFAULT_TREND_WINDOW};
use crate::error::TrackerError;

pub const CONFIG_FILE_NAME: &str = "htrack.toml";
pub const DEFAULT_DATA_DIR: &str = ".health-tracker";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Window lengths (in records) used by the analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisWindows {
    pub trend_days: usize,
    pub comparison_days: usize,
    pub adherence_days: usize,
}

impl Default for AnalysisWindows {
    fn default() -> Self {
        Self {
            trend_days: DEFAULT_TREND_WINDOW,
            comparison_days: DEFAULT_TREND_WINDOW,
            adherence_days: DEFAULT_ADHERENCE_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub windows: AnalysisWindows,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            windows: AnalysisWindows::default(),
        }
    }
}

/// Load configuration from `path`; a missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<TrackerConfig, TrackerError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(TrackerConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: TrackerConfig = toml::from_str(&raw)?;
    Ok(normalize_config(parsed))
}

/// Write `config` to `path` as pretty TOML, creating parent directories.
pub fn save_config(path: impl AsRef<Path>, config: &TrackerConfig) -> Result<(), TrackerError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

fn non_zero_or(value: usize, fallback: usize) -> usize {
    if value == 0 {
        fallback
    } else {
        value
    }
}

fn normalize_config(mut config: TrackerConfig) -> TrackerConfig {
    let defaults = AnalysisWindows::default();
    config.windows.trend_days = non_zero_or(config.windows.trend_days, defaults.trend_days);
    config.windows.comparison_days =
        non_zero_or(config.windows.comparison_days, defaults.comparison_days);
    config.windows.adherence_days =
        non_zero_or(config.windows.adherence_days, defaults.adherence_days);

    let log_level = config.log_level.trim();
    config.log_level = if log_level.is_empty() {
        DEFAULT_LOG_LEVEL.to_owned()
    } else {
        log_level.to_lowercase()
    };

    if config.data_dir.as_os_str().is_empty() {
        config.data_dir = PathBuf::from(DEFAULT_DATA_DIR);
    }

    config
}
