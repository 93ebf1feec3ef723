// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the timeline.

use crate::transform::{self, Transform};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Playback time in seconds used as a keyframe key.
///
/// Keys compare by exact value: two times that are equal as floats collide
/// and the later write overwrites the earlier one. Negative zero is folded
/// into zero so `-0` and `0` name the same key.
#[derive(Debug, Clone, Copy)]
pub struct TimeKey(f64);

impl TimeKey {
    /// Create a key from a time in seconds
    pub fn new(seconds: f64) -> Self {
        // -0.0 == 0.0 but their bit patterns differ
        if seconds == 0.0 {
            Self(0.0)
        } else {
            Self(seconds)
        }
    }

    /// Time in seconds
    pub fn seconds(&self) -> f64 {
        self.0
    }
}

impl From<f64> for TimeKey {
    fn from(seconds: f64) -> Self {
        Self::new(seconds)
    }
}

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for TimeKey {}

impl Hash for TimeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Keys are written as their decimal string so tracks stay valid JSON objects.
impl Serialize for TimeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimeKeyVisitor)
    }
}

struct TimeKeyVisitor;

impl<'de> Visitor<'de> for TimeKeyVisitor {
    type Value = TimeKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a time in seconds as a number or decimal string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TimeKey, E> {
        v.parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .map(TimeKey::new)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<TimeKey, E> {
        Ok(TimeKey::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TimeKey, E> {
        Ok(TimeKey::new(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TimeKey, E> {
        Ok(TimeKey::new(v as f64))
    }
}

/// Whether a widget is shown at a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Rendered
    #[default]
    Visible,
    /// Not rendered
    Hidden,
}

/// State of one widget at one time key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframeEntry {
    /// Serialized transform (see [`Transform::encode`])
    pub transform: String,
    /// Visibility at this keyframe
    pub visibility: Visibility,
}

impl KeyframeEntry {
    /// Create an entry from a structured transform
    pub fn new(transform: &Transform, visibility: Visibility) -> Self {
        Self {
            transform: transform.encode(),
            visibility,
        }
    }

    /// A visible entry, as written when a manipulation completes
    pub fn visible(transform: &Transform) -> Self {
        Self::new(transform, Visibility::Visible)
    }

    /// Decode the stored transform
    pub fn decode_transform(&self) -> transform::Result<Transform> {
        Transform::decode(&self.transform)
    }
}
