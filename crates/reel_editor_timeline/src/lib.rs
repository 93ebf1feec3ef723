// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timeline for Reel Editor.
//!
//! This crate provides the time-indexed state of every overlay widget:
//! - Transform codec (rotation, scale, translation <-> style string)
//! - Keyframe entries keyed by playback time
//! - Per-widget tracks
//! - The timeline store holding the playback cursor
//!
//! ## Architecture
//!
//! The timeline is built on:
//! - Insertion-ordered tracks keyed by `#<widget id>`
//! - Exact time-key lookup (no tweening between keyframes)
//! - Dirty flags that tell the owning frame loop when to re-apply state

pub mod keyframe;
pub mod timeline;
pub mod track;
pub mod transform;

pub use keyframe::{KeyframeEntry, TimeKey, Visibility};
pub use timeline::Timeline;
pub use track::{track_key, widget_id_from_key, Track, Tracks};
pub use transform::{CodecError, Transform};
