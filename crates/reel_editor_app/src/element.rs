// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual elements and the edit surface that holds them.
//!
//! An element is the rendering-side handle of a widget: a box of known size
//! carrying a transform and a visibility. The structured [`Transform`] is
//! the in-memory value; [`Element::style_transform`] produces the string a
//! front end applies.

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use reel_editor_timeline::{Transform, Visibility};
use std::fmt;
use std::sync::Arc;

/// CSS-like class given to every widget element
pub const WIDGET_CLASS: &str = "widget";

/// Layout size of a freshly created text element
pub const TEXT_BOX_SIZE: [f64; 2] = [160.0, 48.0];

/// Placeholder content of a new text element
pub const DEFAULT_TEXT: &str = "Text";

/// What an element displays
#[derive(Debug, Clone, PartialEq)]
pub enum ElementContent {
    /// Bitmap image
    Image {
        /// Image source locator
        src: String,
    },
    /// Editable text block
    Text {
        /// Current text
        text: String,
    },
}

/// A rendered widget box
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element id (same as the widget id)
    pub id: String,
    /// Style class
    pub class_name: String,
    /// Keyboard focus order; 0 makes the element focusable
    pub tab_index: i32,
    /// Native drag-and-drop is disabled for widgets
    pub draggable: bool,
    /// Displayed content
    pub content: ElementContent,
    /// Untransformed layout size in container pixels
    pub size: [f64; 2],
    /// Current transform
    pub transform: Transform,
    /// Current visibility
    pub visibility: Visibility,
}

impl Element {
    /// Create an element with the widget defaults (identity transform, visible)
    pub fn new(id: impl Into<String>, content: ElementContent, size: [f64; 2]) -> Self {
        Self {
            id: id.into(),
            class_name: WIDGET_CLASS.to_string(),
            tab_index: 0,
            draggable: false,
            content,
            size,
            transform: Transform::IDENTITY,
            visibility: Visibility::Visible,
        }
    }

    /// Transform as a style string
    pub fn style_transform(&self) -> String {
        self.transform.encode()
    }

    /// The four box corners after the transform, clockwise from top-left.
    ///
    /// The transform origin is the box center and the untransformed box sits
    /// at the container origin.
    pub fn corners(&self) -> [[f64; 2]; 4] {
        let [w, h] = self.size;
        let (hw, hh) = (w / 2.0, h / 2.0);
        [[-hw, -hh], [hw, -hh], [hw, hh], [-hw, hh]].map(|[x, y]| {
            let [tx, ty] = self.transform.apply([x, y]);
            [tx + hw, ty + hh]
        })
    }
}

/// Shared handle to an element.
///
/// Widgets, the surface and the active gizmo all refer to the same element;
/// identity is pointer identity.
#[derive(Clone)]
pub struct ElementHandle(Arc<RwLock<Element>>);

impl ElementHandle {
    /// Wrap an element
    pub fn new(element: Element) -> Self {
        Self(Arc::new(RwLock::new(element)))
    }

    /// Lock for reading
    pub fn read(&self) -> RwLockReadGuard<'_, Element> {
        self.0.read()
    }

    /// Lock for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, Element> {
        self.0.write()
    }

    /// Element id
    pub fn id(&self) -> String {
        self.read().id.clone()
    }

    /// Current transform
    pub fn transform(&self) -> Transform {
        self.read().transform
    }

    /// Replace the transform
    pub fn set_transform(&self, transform: Transform) {
        self.write().transform = transform;
    }

    /// Current visibility
    pub fn visibility(&self) -> Visibility {
        self.read().visibility
    }

    /// Whether both handles point at the same element
    pub fn ptr_eq(&self, other: &ElementHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let element = self.read();
        f.debug_struct("ElementHandle")
            .field("id", &element.id)
            .field("transform", &element.style_transform())
            .field("visibility", &element.visibility)
            .finish()
    }
}

/// The container elements are attached to
#[derive(Debug, Default)]
pub struct Surface {
    elements: IndexMap<String, ElementHandle>,
}

impl Surface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an element as the last child
    pub fn append(&mut self, element: ElementHandle) {
        let id = element.id();
        self.elements.insert(id, element);
    }

    /// Detach an element
    pub fn remove(&mut self, element: &ElementHandle) -> bool {
        let id = element.id();
        match self.elements.get(&id) {
            Some(attached) if attached.ptr_eq(element) => {
                self.elements.shift_remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Whether this exact element is attached
    pub fn contains(&self, element: &ElementHandle) -> bool {
        self.elements
            .get(&element.id())
            .is_some_and(|attached| attached.ptr_eq(element))
    }

    /// Attached elements in document order
    pub fn iter(&self) -> impl Iterator<Item = &ElementHandle> {
        self.elements.values()
    }

    /// Number of attached elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing is attached
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
