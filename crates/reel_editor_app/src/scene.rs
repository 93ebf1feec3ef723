// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene snapshot: everything needed to rebuild an edit session.

use crate::error::Result;
use crate::widget::WidgetInit;
use reel_editor_timeline::Tracks;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Exportable scene state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedData {
    /// Keyframe tracks keyed by `#<widget id>`
    pub tracks: Tracks,
    /// Base video source locator
    pub video_src: String,
    /// Widget init records in creation order
    pub widgets: Vec<WidgetInit>,
}

impl SerializedData {
    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a scene file
    pub fn read_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let data = Self::from_json(&content)?;
        tracing::info!("Read scene from {:?} ({} widgets)", path, data.widgets.len());
        Ok(data)
    }

    /// Write a scene file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        tracing::info!("Wrote scene to {:?}", path);
        Ok(())
    }
}
