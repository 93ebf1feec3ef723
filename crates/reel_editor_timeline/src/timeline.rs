// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline store: per-widget tracks plus the playback cursor.
//!
//! The store never changes tracks on its own. Its owner (the widget manager)
//! inserts and removes tracks and keyframes through [`Timeline::tracks_mut`]
//! and then calls [`Timeline::update_tracks`]. Both that call and
//! [`Timeline::set_time`] raise a dirty flag that the owner's frame loop
//! consumes with [`Timeline::take_dirty`] before re-applying widget state.

use crate::keyframe::KeyframeEntry;
use crate::track::{Track, Tracks};

/// Keyframe tracks and the current playback time
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    /// Per-widget tracks
    tracks: Tracks,
    /// Last time pushed by the frame loop
    current_time: f64,
    /// Resolved widget state is stale
    dirty: bool,
}

impl Timeline {
    /// Create an empty timeline at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the playback time.
    ///
    /// Always marks resolved state as stale, even when the time is unchanged.
    pub fn set_time(&mut self, time: f64) {
        self.current_time = time;
        self.dirty = true;
    }

    /// Last time set
    pub fn time(&self) -> f64 {
        self.current_time
    }

    /// Entry for a widget track at exactly `time`.
    ///
    /// There is no interpolation: when no keyframe sits on that exact key the
    /// result is `None` and the widget keeps whatever state was last applied.
    /// Also `None` when the track does not exist.
    pub fn resolve(&self, track_key: &str, time: f64) -> Option<&KeyframeEntry> {
        self.tracks.get(track_key)?.keyframe_at(time)
    }

    /// Entry for a widget track at the current time
    pub fn resolve_current(&self, track_key: &str) -> Option<&KeyframeEntry> {
        self.resolve(track_key, self.current_time)
    }

    /// Signal that tracks were added, removed or edited
    pub fn update_tracks(&mut self) {
        tracing::trace!(tracks = self.tracks.len(), "Tracks updated");
        self.dirty = true;
    }

    /// Consume the dirty flag, returning whether it was set
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Whether resolved state is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// All tracks
    pub fn tracks(&self) -> &Tracks {
        &self.tracks
    }

    /// Mutable access for the owner
    pub fn tracks_mut(&mut self) -> &mut Tracks {
        &mut self.tracks
    }

    /// Replace all tracks at once, returning the previous set
    pub fn replace_tracks(&mut self, tracks: Tracks) -> Tracks {
        std::mem::replace(&mut self.tracks, tracks)
    }

    /// Get a track
    pub fn track(&self, track_key: &str) -> Option<&Track> {
        self.tracks.get(track_key)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_key: &str) -> Option<&mut Track> {
        self.tracks.get_mut(track_key)
    }
}
