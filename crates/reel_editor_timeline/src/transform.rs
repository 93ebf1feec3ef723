// SPDX-License-Identifier: MIT OR Apache-2.0
//! Widget transform and its style-string codec.
//!
//! The serialized form is
//! `translate(<tx>px, <ty>px) rotate(<deg>deg) scale(<sx>, <sy>)`.
//! It is both the storage format inside keyframes and the text a rendering
//! front end applies to the widget element, so [`Transform::encode`] and
//! [`Transform::decode`] must agree byte-for-byte.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input does not match the transform grammar
    #[error("Malformed transform: {0:?}")]
    MalformedTransform(String),
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// 2D transform of a widget element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Rotation in degrees
    pub rotate: f64,
    /// Scale factors (x, y)
    pub scale: [f64; 2],
    /// Translation in pixels (x, y)
    pub translate: [f64; 2],
}

impl Transform {
    /// The identity transform
    pub const IDENTITY: Self = Self {
        rotate: 0.0,
        scale: [1.0, 1.0],
        translate: [0.0, 0.0],
    };

    /// Create a transform
    pub fn new(rotate: f64, scale: [f64; 2], translate: [f64; 2]) -> Self {
        Self {
            rotate,
            scale,
            translate,
        }
    }

    /// Serialize to the style string.
    ///
    /// Only finite values produce a string that [`Transform::decode`] accepts.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parse the exact style string produced by [`Transform::encode`].
    ///
    /// No partial recovery is attempted: any deviation from the grammar,
    /// including surrounding whitespace, is rejected.
    pub fn decode(css: &str) -> Result<Self> {
        parse(css).ok_or_else(|| CodecError::MalformedTransform(css.to_string()))
    }

    /// Map a point in the element's local box (origin at the box center)
    /// through this transform.
    ///
    /// Scale is applied first, then rotation, then translation, matching the
    /// right-to-left composition of the style string.
    pub fn apply(&self, point: [f64; 2]) -> [f64; 2] {
        let x = point[0] * self.scale[0];
        let y = point[1] * self.scale[1];
        let (sin, cos) = self.rotate.to_radians().sin_cos();
        [
            x * cos - y * sin + self.translate[0],
            x * sin + y * cos + self.translate[1],
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) rotate({}deg) scale({}, {})",
            self.translate[0], self.translate[1], self.rotate, self.scale[0], self.scale[1]
        )
    }
}

fn parse(css: &str) -> Option<Transform> {
    let rest = css.strip_prefix("translate(")?;
    let (tx, rest) = take_number(rest, "px, ")?;
    let (ty, rest) = take_number(rest, "px) rotate(")?;
    let (rotate, rest) = take_number(rest, "deg) scale(")?;
    let (sx, rest) = take_number(rest, ", ")?;
    let (sy, rest) = take_number(rest, ")")?;
    if !rest.is_empty() {
        return None;
    }
    Some(Transform {
        rotate,
        scale: [sx, sy],
        translate: [tx, ty],
    })
}

/// Read a number terminated by `terminator`, returning it and the remainder.
fn take_number<'a>(input: &'a str, terminator: &str) -> Option<(f64, &'a str)> {
    let end = input.find(terminator)?;
    let number = parse_number(&input[..end])?;
    Some((number, &input[end + terminator.len()..]))
}

/// Decimal number: optional leading minus, then digits and dots only.
fn parse_number(token: &str) -> Option<f64> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    token.parse().ok()
}
