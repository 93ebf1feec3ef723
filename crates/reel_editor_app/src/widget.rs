// SPDX-License-Identifier: MIT OR Apache-2.0
//! Overlay widgets and their creation records.

use crate::element::ElementHandle;
use serde::{Deserialize, Serialize};

/// What kind of widget to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetKind {
    /// Image overlay
    Image {
        /// Image source locator
        src: String,
    },
    /// Editable text overlay
    Text,
    /// Any type name this editor does not know
    #[serde(other)]
    Unsupported,
}

/// Creation record of a widget; this is what scenes persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetInit {
    /// Widget id; assigned by the manager when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Widget kind and its parameters
    #[serde(flatten)]
    pub kind: WidgetKind,
}

impl WidgetInit {
    /// Image widget
    pub fn image(src: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: WidgetKind::Image { src: src.into() },
        }
    }

    /// Text widget
    pub fn text() -> Self {
        Self {
            id: None,
            kind: WidgetKind::Text,
        }
    }

    /// Use an explicit id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A live widget: its init record plus the element rendering it
#[derive(Debug, Clone)]
pub struct Widget {
    id: String,
    init: WidgetInit,
    element: ElementHandle,
}

impl Widget {
    pub(crate) fn new(init: WidgetInit, element: ElementHandle) -> Self {
        let id = element.id();
        Self { id, init, element }
    }

    /// Widget id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Init record, with the assigned id filled in
    pub fn init(&self) -> &WidgetInit {
        &self.init
    }

    /// Rendering element
    pub fn element(&self) -> &ElementHandle {
        &self.element
    }
}

/// Key identifiers the widget bindings react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Delete key
    Delete,
    /// Anything else, by name
    Other(String),
}

/// Input delivered to a widget's element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Mouse press or touch start on the element
    PointerDown,
    /// Key press while the element is focused
    KeyDown(Key),
    /// Element gained focus
    Focus,
    /// Element lost focus
    Blur,
}
