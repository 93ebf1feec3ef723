// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reel Editor core.
//!
//! Overlay widgets (images, text) on a base video, animate them with
//! keyframed transforms and export the scene:
//! - Widget lifecycle and exclusive selection
//! - Gizmo controller for drag, rotate and scale gestures
//! - Frame loop keeping widget state in sync with video playback
//! - Scene save/load
//!
//! ## Architecture
//!
//! [`WidgetManager`] owns everything mutable. Gestures flow from the pointer
//! layer into the active [`Gizmo`], which writes transforms onto the
//! selected element and signals completion over a channel; the manager then
//! records a keyframe in the [`reel_editor_timeline::Timeline`]. Playback
//! time flows the other way: the frame loop reads the [`VideoElement`],
//! pushes the time into the timeline and applies each widget's entry.

pub mod config;
pub mod element;
pub mod error;
pub mod gizmo;
pub mod layout;
pub mod loader;
pub mod manager;
pub mod scene;
pub mod video;
pub mod widget;

pub use config::EditorConfig;
pub use element::{Element, ElementContent, ElementHandle, Surface};
pub use error::{EditorError, Result};
pub use gizmo::{Gesture, Gizmo, GizmoEvent, GizmoId, GizmoState, HandleLayout};
pub use layout::ContainerLayout;
pub use loader::{FsImageLoader, ImageInfo, ImageLoader, StaticImageLoader};
pub use manager::{EditorEvent, WidgetManager};
pub use scene::SerializedData;
pub use video::{HeadlessVideo, PlaybackState, VideoElement};
pub use widget::{InputEvent, Key, Widget, WidgetInit, WidgetKind};
