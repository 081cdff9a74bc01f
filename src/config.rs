// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON under the user config directory. Missing fields take their
//! defaults, so older files keep loading as settings are added.

use crate::constants::{decode, paths, timing};
use crate::errors::{AppError, AppResult};
use crate::frame_processor::engine::DecodeHints;
use crate::frame_processor::types::{BarcodeFormat, BarcodeFormats};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Symbologies to look for; empty means any
    pub formats: Vec<BarcodeFormat>,
    /// Also search rotated orientations
    pub try_rotate: bool,
    /// Spend more time for a higher hit rate
    pub try_harder: bool,
    /// Cooldown window length in milliseconds; 0 disables the cooldown
    pub cooldown_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            try_rotate: decode::DEFAULT_TRY_ROTATE,
            try_harder: decode::DEFAULT_TRY_HARDER,
            cooldown_ms: timing::COOLDOWN_WINDOW.as_millis() as u64,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(paths::APP_DIR).join(paths::CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> AppResult<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    pub fn format_set(&self) -> BarcodeFormats {
        self.formats.iter().copied().collect()
    }

    pub fn hints(&self) -> DecodeHints {
        DecodeHints::default()
            .with_formats(self.format_set())
            .with_try_rotate(self.try_rotate)
            .with_try_harder(self.try_harder)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
