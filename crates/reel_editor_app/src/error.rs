// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor error type.

use reel_editor_timeline::CodecError;
use thiserror::Error;

/// Editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Widget init names a type the editor cannot create
    #[error("Invalid widget init type")]
    InvalidWidgetType {
        /// Caller-supplied id, if any
        id: Option<String>,
    },

    /// A live widget already owns this id
    #[error("Widget id already exists: {0}")]
    DuplicateWidgetId(String),

    /// Transform string does not match the grammar
    #[error(transparent)]
    MalformedTransform(#[from] CodecError),

    /// Image resource could not be read
    #[error("Failed to load image {src}: {reason}")]
    ImageLoad {
        /// Image source locator
        src: String,
        /// Loader failure description
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene (de)serialization error
    #[error("Scene format error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config parse error
    #[error("Config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Config parsed but holds an unusable value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Config serialization error
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] ron::Error),
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
