// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for the timeline.

use crate::keyframe::{KeyframeEntry, TimeKey};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix that turns a widget id into its track key
pub const TRACK_KEY_PREFIX: char = '#';

/// Track key for a widget id (`"id0"` -> `"#id0"`)
pub fn track_key(widget_id: &str) -> String {
    format!("{TRACK_KEY_PREFIX}{widget_id}")
}

/// Widget id named by a track key, if the key carries the prefix
pub fn widget_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(TRACK_KEY_PREFIX)
}

/// Keyframes of one widget, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    entries: IndexMap<TimeKey, KeyframeEntry>,
}

impl Track {
    /// Create an empty track
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the keyframe at a time.
    ///
    /// Overwriting keeps the key's original insertion position. Returns the
    /// replaced entry, if any.
    pub fn set_keyframe(&mut self, time: impl Into<TimeKey>, entry: KeyframeEntry) -> Option<KeyframeEntry> {
        self.entries.insert(time.into(), entry)
    }

    /// Keyframe stored at exactly this time
    pub fn keyframe_at(&self, time: impl Into<TimeKey>) -> Option<&KeyframeEntry> {
        self.entries.get(&time.into())
    }

    /// Remove the keyframe at a time
    pub fn remove_keyframe(&mut self, time: impl Into<TimeKey>) -> Option<KeyframeEntry> {
        self.entries.shift_remove(&time.into())
    }

    /// Iterate keyframes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&TimeKey, &KeyframeEntry)> {
        self.entries.iter()
    }

    /// Get keyframe count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the track has no keyframes
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All tracks, keyed by [`track_key`]
pub type Tracks = IndexMap<String, Track>;
