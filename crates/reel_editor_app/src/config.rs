// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Stored as RON next to the scenes it is used with. Every field has a
//! default, so a partial file (or no file) is valid.

use crate::error::{EditorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "reel_editor.ron";

/// Frame loop rate when none is configured
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Highest accepted frame loop rate
pub const MAX_FRAME_RATE: f64 = 1000.0;

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Format version
    pub version: u32,
    /// Viewport size the edit surface is fitted into
    pub viewport: [f64; 2],
    /// Surface size while the video has not reported its own
    pub fallback_video_size: [u32; 2],
    /// Frames per second of the headless frame loop
    pub frame_rate: f64,
    /// Prefix of generated widget ids
    pub id_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            viewport: [1280.0, 720.0],
            fallback_video_size: [1280, 720],
            frame_rate: DEFAULT_FRAME_RATE,
            id_prefix: "id".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a RON document
    pub fn from_ron(content: &str) -> Result<Self> {
        let config: EditorConfig = ron::from_str(content)?;
        if config.version > CONFIG_FORMAT_VERSION {
            tracing::warn!(
                "Config version {} is newer than supported version {}",
                config.version,
                CONFIG_FORMAT_VERSION
            );
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the frame loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 || self.frame_rate > MAX_FRAME_RATE {
            return Err(EditorError::InvalidConfig(format!(
                "frame_rate must be in (0, {}], got {}",
                MAX_FRAME_RATE, self.frame_rate
            )));
        }
        Ok(())
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load from a file, or defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let config = Self::load(path)?;
            tracing::info!("Loaded config from {:?}", path);
            Ok(config)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Seconds between frame loop ticks.
    ///
    /// Out-of-range rates are clamped, so the interval is never zero.
    pub fn frame_interval(&self) -> f64 {
        let rate = if self.frame_rate.is_finite() {
            self.frame_rate.clamp(1.0, MAX_FRAME_RATE)
        } else {
            DEFAULT_FRAME_RATE
        };
        1.0 / rate
    }
}
