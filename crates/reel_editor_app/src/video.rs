// SPDX-License-Identifier: MIT OR Apache-2.0
//! Base video as seen by the editor: a time source and sink.
//!
//! Decoding and rendering happen elsewhere. The editor only reads the
//! playback position and intrinsic size, and writes the position and source.

/// Playback surface of the base video
pub trait VideoElement: Send {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Seek to a position in seconds
    fn set_current_time(&mut self, time: f64);

    /// Source locator
    fn src(&self) -> String;

    /// Replace the source
    fn set_src(&mut self, src: &str);

    /// Intrinsic size once metadata is known
    fn video_size(&self) -> Option<[u32; 2]>;
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
}

/// In-memory playback clock standing in for a real video element
#[derive(Debug, Clone, Default)]
pub struct HeadlessVideo {
    /// Source locator
    src: String,
    /// Current playback time
    time: f64,
    /// Playback state
    state: PlaybackState,
    /// Media duration, once known
    duration: Option<f64>,
    /// Intrinsic size, once known
    size: Option<[u32; 2]>,
}

impl HeadlessVideo {
    /// Create a stopped clock with no source
    pub fn new() -> Self {
        Self::default()
    }

    /// Report metadata, as a real element does once it can play
    pub fn with_metadata(mut self, size: [u32; 2], duration: f64) -> Self {
        self.size = Some(size);
        self.duration = Some(duration);
        self
    }

    /// Advance playback by a delta in seconds
    pub fn advance(&mut self, delta_time: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.time += delta_time;
        if let Some(end) = self.duration {
            if self.time >= end {
                self.time = end;
                self.state = PlaybackState::Stopped;
            }
        }
    }

    /// Play from current position
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Media duration, once known
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }
}

impl VideoElement for HeadlessVideo {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, time: f64) {
        let time = time.max(0.0);
        self.time = match self.duration {
            Some(end) => time.min(end),
            None => time,
        };
    }

    fn src(&self) -> String {
        self.src.clone()
    }

    fn set_src(&mut self, src: &str) {
        if self.src != src {
            self.src = src.to_string();
            self.time = 0.0;
            self.state = PlaybackState::Stopped;
        }
    }

    fn video_size(&self) -> Option<[u32; 2]> {
        self.size
    }
}
