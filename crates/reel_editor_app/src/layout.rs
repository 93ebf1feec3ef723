// SPDX-License-Identifier: MIT OR Apache-2.0
//! Aspect-fit sizing of the edit surface inside the viewport.

/// Placement of the edit surface.
///
/// The surface keeps the video's intrinsic pixel size and is scaled
/// uniformly so the whole video fits the viewport, centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerLayout {
    /// Unscaled width (video pixels)
    pub width: f64,
    /// Unscaled height (video pixels)
    pub height: f64,
    /// Uniform scale applied to the surface
    pub scale: f64,
    /// Left offset in viewport pixels
    pub left: f64,
    /// Top offset in viewport pixels
    pub top: f64,
}

impl ContainerLayout {
    /// Fit a video of `video_size` into `viewport`.
    ///
    /// A zero video dimension falls back to the matching `fallback` one.
    pub fn fit(video_size: Option<[u32; 2]>, fallback: [u32; 2], viewport: [f64; 2]) -> Self {
        let [video_w, video_h] = video_size.unwrap_or(fallback);
        let width = f64::from(if video_w == 0 { fallback[0] } else { video_w });
        let height = f64::from(if video_h == 0 { fallback[1] } else { video_h });
        let [viewport_w, viewport_h] = viewport;

        let video_aspect = width / height;
        let viewport_aspect = viewport_w / viewport_h;
        let scale = if video_aspect > viewport_aspect {
            viewport_w / width
        } else {
            viewport_h / height
        };

        Self {
            width,
            height,
            scale,
            left: (viewport_w - width * scale) / 2.0,
            top: (viewport_h - height * scale) / 2.0,
        }
    }

    /// Surface transform as a style string
    pub fn style_transform(&self) -> String {
        format!("translate(0px, 0px) scale({})", self.scale)
    }

    /// Map a viewport point into surface pixels
    pub fn to_surface(&self, point: [f64; 2]) -> [f64; 2] {
        [
            (point[0] - self.left) / self.scale,
            (point[1] - self.top) / self.scale,
        ]
    }
}
