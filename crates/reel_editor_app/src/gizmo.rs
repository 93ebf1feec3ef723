// SPDX-License-Identifier: MIT OR Apache-2.0
//! Gizmo controller: drag, rotate and scale handles around one element.
//!
//! A gizmo turns gesture events into transform writes on its element. Every
//! gesture is measured from a baseline captured at gesture start from the
//! element's current transform, so deltas never accumulate onto stale state.
//! When a gesture ends the gizmo emits [`GizmoEvent::Keyframe`]; listeners
//! read the element's final transform themselves.

use crate::element::ElementHandle;
use reel_editor_timeline::Transform;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;

/// Distance of the rotation handle above the top edge, in pixels
const ROTATION_HANDLE_OFFSET: f64 = 32.0;

static NEXT_GIZMO_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique gizmo identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GizmoId(u64);

impl GizmoId {
    fn next() -> Self {
        Self(NEXT_GIZMO_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Gesture the gizmo is currently tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoState {
    /// No gesture in progress
    #[default]
    Idle,
    /// Moving the element
    Dragging,
    /// Rotating the element
    Rotating,
    /// Scaling the element around a pivot
    Scaling,
}

impl GizmoState {
    /// Get the name of this state
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Dragging => "Dragging",
            Self::Rotating => "Rotating",
            Self::Scaling => "Scaling",
        }
    }
}

/// Gesture input from the pointer layer.
///
/// Update deltas are cumulative since the matching start event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Begin moving
    DragStart,
    /// Move by `translate` pixels from the start position
    Drag {
        /// Total translation since drag start
        translate: [f64; 2],
    },
    /// Begin rotating
    RotateStart,
    /// Rotate by `rotate` degrees from the start angle
    Rotate {
        /// Total rotation since rotate start
        rotate: f64,
    },
    /// Begin scaling
    ScaleStart,
    /// Scale by `scale` relative to the start scale; the pivot shift
    /// moves the element by `drag`
    Scale {
        /// Scale factor relative to the start scale
        scale: [f64; 2],
        /// Total translation since scale start
        drag: [f64; 2],
    },
    /// Finish the current gesture
    End,
}

/// Notification emitted by a gizmo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoEvent {
    /// A manipulation completed
    Keyframe,
    /// The gizmo was destroyed
    Destroy,
}

/// Hit-box geometry of the handles, in container pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandleLayout {
    /// Axis-aligned bounds (min corner)
    pub min: [f64; 2],
    /// Axis-aligned bounds (max corner)
    pub max: [f64; 2],
    /// Transformed box corners, clockwise from top-left
    pub corners: [[f64; 2]; 4],
    /// Anchor of the rotation handle
    pub rotation_handle: [f64; 2],
}

impl HandleLayout {
    /// Compute handle geometry for an element's current layout
    pub fn measure(element: &ElementHandle) -> Self {
        let corners = element.read().corners();

        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for corner in &corners {
            for axis in 0..2 {
                min[axis] = min[axis].min(corner[axis]);
                max[axis] = max[axis].max(corner[axis]);
            }
        }

        let center = [
            corners.iter().map(|c| c[0]).sum::<f64>() / 4.0,
            corners.iter().map(|c| c[1]).sum::<f64>() / 4.0,
        ];
        let top_mid = [
            (corners[0][0] + corners[1][0]) / 2.0,
            (corners[0][1] + corners[1][1]) / 2.0,
        ];
        let dir = [top_mid[0] - center[0], top_mid[1] - center[1]];
        let len = (dir[0] * dir[0] + dir[1] * dir[1]).sqrt();
        let rotation_handle = if len > f64::EPSILON {
            [
                top_mid[0] + dir[0] / len * ROTATION_HANDLE_OFFSET,
                top_mid[1] + dir[1] / len * ROTATION_HANDLE_OFFSET,
            ]
        } else {
            // Collapsed box
            top_mid
        };

        Self {
            min,
            max,
            corners,
            rotation_handle,
        }
    }

    /// Whether a point falls inside the axis-aligned bounds
    pub fn contains(&self, point: [f64; 2]) -> bool {
        (0..2).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }
}

/// Transform controller bound to one element
#[derive(Debug)]
pub struct Gizmo {
    id: GizmoId,
    element: ElementHandle,
    state: GizmoState,
    /// Element transform when the current gesture started
    baseline: Transform,
    layout: HandleLayout,
    listeners: Vec<mpsc::Sender<GizmoEvent>>,
}

impl Gizmo {
    /// Bind a gizmo to an element
    pub fn new(element: ElementHandle) -> Self {
        let layout = HandleLayout::measure(&element);
        let baseline = element.transform();
        Self {
            id: GizmoId::next(),
            element,
            state: GizmoState::Idle,
            baseline,
            layout,
            listeners: Vec::new(),
        }
    }

    /// Gizmo ID
    pub fn id(&self) -> GizmoId {
        self.id
    }

    /// Bound element
    pub fn element(&self) -> &ElementHandle {
        &self.element
    }

    /// Current gesture state
    pub fn state(&self) -> GizmoState {
        self.state
    }

    /// Handle geometry as of the last [`Gizmo::update`]
    pub fn layout(&self) -> &HandleLayout {
        &self.layout
    }

    /// Register a listener for gizmo events
    pub fn subscribe(&mut self) -> mpsc::Receiver<GizmoEvent> {
        let (sender, receiver) = mpsc::channel();
        self.listeners.push(sender);
        receiver
    }

    /// Feed one gesture event.
    ///
    /// Returns `false` when the gesture does not apply to the current state
    /// and was ignored.
    pub fn handle(&mut self, gesture: Gesture) -> bool {
        match (self.state, gesture) {
            (GizmoState::Idle, Gesture::DragStart) => self.begin(GizmoState::Dragging),
            (GizmoState::Idle, Gesture::RotateStart) => self.begin(GizmoState::Rotating),
            (GizmoState::Idle, Gesture::ScaleStart) => self.begin(GizmoState::Scaling),
            (GizmoState::Dragging, Gesture::Drag { translate }) => {
                self.write(Transform {
                    translate: offset(self.baseline.translate, translate),
                    ..self.element.transform()
                });
            }
            (GizmoState::Rotating, Gesture::Rotate { rotate }) => {
                self.write(Transform {
                    rotate: self.baseline.rotate + rotate,
                    ..self.element.transform()
                });
            }
            (GizmoState::Scaling, Gesture::Scale { scale, drag }) => {
                self.write(Transform {
                    scale: [
                        self.baseline.scale[0] * scale[0],
                        self.baseline.scale[1] * scale[1],
                    ],
                    translate: offset(self.baseline.translate, drag),
                    ..self.element.transform()
                });
            }
            (GizmoState::Dragging | GizmoState::Rotating | GizmoState::Scaling, Gesture::End) => {
                self.state = GizmoState::Idle;
                self.layout = HandleLayout::measure(&self.element);
                self.emit(GizmoEvent::Keyframe);
            }
            (state, gesture) => {
                tracing::trace!(gizmo = self.id.0, state = state.name(), ?gesture, "Ignoring gesture");
                return false;
            }
        }
        true
    }

    /// Re-measure handle geometry after the element moved or resized
    pub fn update(&mut self) {
        self.layout = HandleLayout::measure(&self.element);
    }

    /// Detach from the element and notify listeners
    pub fn destroy(mut self) {
        self.state = GizmoState::Idle;
        self.emit(GizmoEvent::Destroy);
    }

    fn begin(&mut self, state: GizmoState) {
        self.baseline = self.element.transform();
        self.state = state;
    }

    fn write(&mut self, transform: Transform) {
        self.element.set_transform(transform);
    }

    fn emit(&mut self, event: GizmoEvent) {
        self.listeners.retain(|listener| listener.send(event).is_ok());
    }
}

fn offset(base: [f64; 2], delta: [f64; 2]) -> [f64; 2] {
    [base[0] + delta[0], base[1] + delta[1]]
}
