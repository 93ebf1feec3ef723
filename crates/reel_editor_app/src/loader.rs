// SPDX-License-Identifier: MIT OR Apache-2.0
//! Image resource loading for image widgets.
//!
//! Creating an image widget waits for its resource to finish loading so the
//! element can be laid out at the image's natural size. No timeout is
//! applied; callers that need one wrap the widget call themselves.

use crate::error::{EditorError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::PathBuf;

/// Loaded image metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
}

impl ImageInfo {
    /// Natural size as a layout size
    pub fn size(&self) -> [f64; 2] {
        [f64::from(self.width), f64::from(self.height)]
    }
}

/// Source of image resources
pub trait ImageLoader: Send + Sync {
    /// Load the image named by `src`, resolving once it is decoded
    fn load(&self, src: &str) -> BoxFuture<'static, Result<ImageInfo>>;
}

/// Resolves every image immediately with a fixed size
#[derive(Debug, Clone, Copy)]
pub struct StaticImageLoader {
    info: ImageInfo,
}

impl StaticImageLoader {
    /// Loader reporting `width` x `height` for every source
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            info: ImageInfo { width, height },
        }
    }
}

impl Default for StaticImageLoader {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl ImageLoader for StaticImageLoader {
    fn load(&self, _src: &str) -> BoxFuture<'static, Result<ImageInfo>> {
        futures::future::ready(Ok(self.info)).boxed()
    }
}

/// Reads image headers from the filesystem
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    /// Directory relative sources are resolved against
    base_dir: PathBuf,
}

impl FsImageLoader {
    /// Loader resolving relative sources against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, src: &str) -> BoxFuture<'static, Result<ImageInfo>> {
        let path = self.base_dir.join(src);
        let src = src.to_string();
        async move {
            let dimensions = tokio::task::spawn_blocking(move || image::image_dimensions(&path))
                .await
                .map_err(|e| EditorError::ImageLoad {
                    src: src.clone(),
                    reason: e.to_string(),
                })?;
            let (width, height) = dimensions.map_err(|e| EditorError::ImageLoad {
                src: src.clone(),
                reason: e.to_string(),
            })?;
            tracing::debug!("Loaded image {} ({}x{})", src, width, height);
            Ok(ImageInfo { width, height })
        }
        .boxed()
    }
}
