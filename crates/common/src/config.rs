//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LinkcardError, LinkcardResult};

/// Namespace under which card defaults are persisted.
pub const DEFAULT_SETTINGS_NAMESPACE: &str = "linkcard_defaults";

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the defaults template and the local card library.
    pub data_dir: PathBuf,

    /// Key for the persisted defaults template.
    pub defaults_namespace: String,

    /// Creator identity attached to composed cards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,

    /// Capture settings.
    pub capture: CaptureSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Capture and rasterization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Frame size used when the device reports a zero-sized frame.
    pub fallback_frame_width: u32,
    pub fallback_frame_height: u32,

    /// JPEG quality (1-100) for video thumbnails.
    pub thumbnail_jpeg_quality: u8,

    /// Upper bound for CLI recordings in seconds (0 = until Ctrl+C).
    pub max_recording_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "linkcard=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            defaults_namespace: DEFAULT_SETTINGS_NAMESPACE.to_string(),
            creator_id: None,
            capture: CaptureSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            fallback_frame_width: 640,
            fallback_frame_height: 480,
            thumbnail_jpeg_quality: 80,
            max_recording_secs: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from `config_path`. A missing file yields the defaults;
    /// an unreadable or malformed one is an error so the caller can warn and
    /// fall back once logging is up.
    pub fn try_load_from(config_path: &Path) -> LinkcardResult<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(config_path)?;
        serde_json::from_str(&content).map_err(|e| {
            LinkcardError::config(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Location of the local card library.
    pub fn cards_path(&self) -> PathBuf {
        self.data_dir.join("cards.json")
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("linkcard").join("config.json")
}

/// Default data directory.
fn default_data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("linkcard")
}
