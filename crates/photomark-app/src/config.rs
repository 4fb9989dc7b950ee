//! Application configuration.

use crate::error::CliError;
use photomark_core::Rgba;
use photomark_core::tools::{Brush, DEFAULT_WIDTH};
use photomark_render::{DOWNLOAD_QUALITY, SAVE_QUALITY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default API endpoint for presigned URLs and uploads.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

/// Settings loaded from `--config`, with defaults for anything missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Initial stroke color as `#rrggbb` or `#rrggbbaa`.
    pub color: String,
    /// Initial line width in image pixels.
    pub width: f64,
    /// JPEG quality (0..=1) for saves.
    pub save_quality: f32,
    /// JPEG quality (0..=1) for downloads.
    pub download_quality: f32,
    pub api_url: String,
    /// Directory downloads land in when no `--out` is given.
    pub download_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            color: Rgba::red().to_string(),
            width: DEFAULT_WIDTH,
            save_quality: SAVE_QUALITY,
            download_quality: DOWNLOAD_QUALITY,
            api_url: DEFAULT_API_URL.to_string(),
            download_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CliError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// The initial brush.
    pub fn brush(&self) -> Result<Brush, CliError> {
        Ok(Brush {
            color: self.color.parse()?,
            width: self.width,
        })
    }
}
