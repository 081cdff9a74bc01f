// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// Length of one cooldown window; at most one decode starts per window
    pub const COOLDOWN_WINDOW: Duration = Duration::from_millis(200);
}

/// Default decode hints
pub mod decode {
    /// Also search rotated orientations
    pub const DEFAULT_TRY_ROTATE: bool = true;

    /// Spend more time for a higher hit rate
    pub const DEFAULT_TRY_HARDER: bool = true;
}

/// Configuration file locations
pub mod paths {
    /// Directory under the user config dir
    pub const APP_DIR: &str = "barcode-filter";

    pub const CONFIG_FILE: &str = "config.json";
}

/// Supported still image extensions for the `scan` command
pub mod file_formats {
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

    /// Check whether a path has a supported image extension
    pub fn is_image(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
