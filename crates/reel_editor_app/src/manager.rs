// SPDX-License-Identifier: MIT OR Apache-2.0
//! Widget manager: widget lifecycle, selection and the frame loop.
//!
//! The manager exclusively owns the live widget list, the edit surface and
//! the timeline tracks, and keeps them in bijection: every live widget has
//! exactly one track under `#<id>` and every track belongs to a live widget.
//! At most one gizmo exists at a time and it is always bound to a live
//! widget's element. Replacing the selection destroys the old gizmo before
//! the new one is built.

use crate::config::EditorConfig;
use crate::element::{Element, ElementContent, ElementHandle, Surface, DEFAULT_TEXT, TEXT_BOX_SIZE};
use crate::error::{EditorError, Result};
use crate::gizmo::{Gesture, Gizmo, GizmoEvent, GizmoId};
use crate::layout::ContainerLayout;
use crate::loader::ImageLoader;
use crate::scene::SerializedData;
use crate::video::VideoElement;
use crate::widget::{InputEvent, Key, Widget, WidgetInit, WidgetKind};
use reel_editor_timeline::{track_key, widget_id_from_key, KeyframeEntry, Timeline, Track, Tracks};
use std::ops::ControlFlow;
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Notification emitted by the manager
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A widget was created
    WidgetAdded {
        /// Widget id
        widget_id: String,
    },
    /// A widget was destroyed
    WidgetDestroyed {
        /// Widget id
        widget_id: String,
    },
    /// A gizmo was bound to a widget
    GizmoCreated {
        /// Bound widget id
        widget_id: String,
        /// Gizmo id
        gizmo: GizmoId,
    },
    /// A gizmo was destroyed
    GizmoDestroyed {
        /// Bound widget id
        widget_id: String,
        /// Gizmo id
        gizmo: GizmoId,
    },
    /// A manipulation was written to a track
    KeyframeCommitted {
        /// Widget id
        widget_id: String,
        /// Time key the keyframe was written at
        time: f64,
    },
}

/// Active gizmo plus the receiving end of its events
#[derive(Debug)]
struct Selection {
    gizmo: Gizmo,
    events: mpsc::Receiver<GizmoEvent>,
}

/// Owner of widgets, selection, timeline and the frame loop
pub struct WidgetManager<V: VideoElement> {
    config: EditorConfig,
    video: V,
    loader: Arc<dyn ImageLoader>,
    surface: Surface,
    timeline: Timeline,
    selection: Option<Selection>,
    widgets: Vec<Widget>,
    id_counter: u64,
    viewport: [f64; 2],
    layout: ContainerLayout,
    listeners: Vec<mpsc::Sender<EditorEvent>>,
}

impl<V: VideoElement> WidgetManager<V> {
    /// Create a manager over a video and an image loader
    pub fn new(video: V, loader: impl ImageLoader + 'static, config: EditorConfig) -> Self {
        let viewport = config.viewport;
        let layout = ContainerLayout::fit(video.video_size(), config.fallback_video_size, viewport);
        let mut manager = Self {
            config,
            video,
            loader: Arc::new(loader),
            surface: Surface::new(),
            timeline: Timeline::new(),
            selection: None,
            widgets: Vec::new(),
            id_counter: 0,
            viewport,
            layout,
            listeners: Vec::new(),
        };
        manager.update();
        manager
    }

    /// Register a listener for manager events
    pub fn subscribe(&mut self) -> mpsc::Receiver<EditorEvent> {
        let (sender, receiver) = mpsc::channel();
        self.listeners.push(sender);
        receiver
    }

    // ------------------------------------------------------------------
    // Widgets
    // ------------------------------------------------------------------

    /// Create a widget.
    ///
    /// Image widgets wait for their resource to load. Fails without any
    /// mutation when the init type is unknown or its id is already live.
    /// An empty id counts as absent.
    pub async fn add_widget(&mut self, mut init: WidgetInit) -> Result<Widget> {
        if init.id.as_deref().is_some_and(str::is_empty) {
            init.id = None;
        }
        if init.kind == WidgetKind::Unsupported {
            return Err(EditorError::InvalidWidgetType { id: init.id });
        }
        if let Some(id) = &init.id {
            if self.timeline.track(&track_key(id)).is_some() {
                return Err(EditorError::DuplicateWidgetId(id.clone()));
            }
        }

        let (content, size) = match &init.kind {
            WidgetKind::Image { src } => {
                let info = self.loader.load(src).await?;
                (ElementContent::Image { src: src.clone() }, info.size())
            }
            WidgetKind::Text => (
                ElementContent::Text {
                    text: DEFAULT_TEXT.to_string(),
                },
                TEXT_BOX_SIZE,
            ),
            WidgetKind::Unsupported => return Err(EditorError::InvalidWidgetType { id: init.id }),
        };

        let id = match &init.id {
            Some(id) => id.clone(),
            None => self.next_widget_id(),
        };
        init.id = Some(id.clone());

        let element = ElementHandle::new(Element::new(id.as_str(), content, size));
        self.surface.append(element.clone());
        self.timeline.tracks_mut().insert(track_key(&id), Track::new());
        self.timeline.update_tracks();

        let widget = Widget::new(init, element);
        self.widgets.push(widget.clone());

        tracing::info!("Added widget {}", id);
        self.emit(EditorEvent::WidgetAdded { widget_id: id });
        Ok(widget)
    }

    /// Destroy a live widget, deselecting it first.
    ///
    /// The widget must be live; destroying it twice is a caller error and is
    /// ignored with a warning.
    pub fn destroy_widget(&mut self, widget: &Widget) {
        let Some(index) = self
            .widgets
            .iter()
            .position(|w| w.element().ptr_eq(widget.element()))
        else {
            tracing::warn!("Widget {} is not live", widget.id());
            return;
        };

        if self.is_selected(Some(widget)) {
            self.select_widget(None);
        }

        self.surface.remove(widget.element());
        self.timeline.tracks_mut().shift_remove(&track_key(widget.id()));
        self.timeline.update_tracks();
        self.widgets.remove(index);

        tracing::info!("Destroyed widget {}", widget.id());
        self.emit(EditorEvent::WidgetDestroyed {
            widget_id: widget.id().to_string(),
        });
    }

    /// Destroy every widget, newest first
    pub fn clear_widgets(&mut self) {
        while let Some(widget) = self.widgets.last().cloned() {
            self.destroy_widget(&widget);
        }
    }

    /// Live widgets in creation order
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Live widget by id
    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    fn next_widget_id(&mut self) -> String {
        loop {
            let candidate = format!("{}{}", self.config.id_prefix, self.id_counter);
            self.id_counter += 1;
            // Loaded scenes may already use generated-looking ids
            if self.timeline.track(&track_key(&candidate)).is_none() {
                return candidate;
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Make `widget` the only selection, or clear it with `None`.
    ///
    /// Selecting the current selection again does nothing.
    pub fn select_widget(&mut self, widget: Option<&Widget>) {
        if self.is_selected(widget) {
            return;
        }

        if let Some(previous) = self.selection.take() {
            let widget_id = previous.gizmo.element().id();
            let gizmo = previous.gizmo.id();
            previous.gizmo.destroy();
            for event in previous.events.try_iter() {
                if event == GizmoEvent::Destroy {
                    tracing::debug!("Deselected widget {}", widget_id);
                    self.emit(EditorEvent::GizmoDestroyed {
                        widget_id: widget_id.clone(),
                        gizmo,
                    });
                }
            }
        }

        if let Some(widget) = widget {
            let mut gizmo = Gizmo::new(widget.element().clone());
            let events = gizmo.subscribe();
            let id = gizmo.id();
            self.selection = Some(Selection { gizmo, events });
            tracing::debug!("Selected widget {}", widget.id());
            self.emit(EditorEvent::GizmoCreated {
                widget_id: widget.id().to_string(),
                gizmo: id,
            });
        }
    }

    /// Whether `widget` is the current selection (`None` matches no selection)
    pub fn is_selected(&self, widget: Option<&Widget>) -> bool {
        match (&self.selection, widget) {
            (None, None) => true,
            (Some(selection), Some(widget)) => selection.gizmo.element().ptr_eq(widget.element()),
            _ => false,
        }
    }

    /// Selected widget, if any
    pub fn selected(&self) -> Option<&Widget> {
        let selection = self.selection.as_ref()?;
        self.widgets
            .iter()
            .find(|w| w.element().ptr_eq(selection.gizmo.element()))
    }

    /// Active gizmo, if any
    pub fn gizmo(&self) -> Option<&Gizmo> {
        self.selection.as_ref().map(|s| &s.gizmo)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Dispatch an input event delivered to a widget's element
    pub fn handle_input(&mut self, widget_id: &str, event: InputEvent) {
        let Some(widget) = self.widget(widget_id).cloned() else {
            tracing::warn!("Input for unknown widget {}", widget_id);
            return;
        };

        match event {
            InputEvent::PointerDown => {
                // Grab: focus, then start dragging through the new gizmo
                self.select_widget(Some(&widget));
                self.handle_gesture(Gesture::DragStart);
            }
            InputEvent::KeyDown(Key::Delete) => self.destroy_widget(&widget),
            InputEvent::KeyDown(Key::Other(_)) => {}
            InputEvent::Focus => self.select_widget(Some(&widget)),
            InputEvent::Blur => {
                if self.is_selected(Some(&widget)) {
                    self.select_widget(None);
                }
            }
        }
    }

    /// Forward a gesture to the active gizmo.
    ///
    /// A completed manipulation is committed as a keyframe before this
    /// returns. Returns `false` when there is no gizmo or it ignored the
    /// gesture.
    pub fn handle_gesture(&mut self, gesture: Gesture) -> bool {
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        let handled = selection.gizmo.handle(gesture);
        let keyframes = selection
            .events
            .try_iter()
            .filter(|event| *event == GizmoEvent::Keyframe)
            .count();
        for _ in 0..keyframes {
            self.commit_keyframe();
        }
        handled
    }

    /// Write the selected element's transform at the current time
    fn commit_keyframe(&mut self) {
        let Some(selection) = &self.selection else {
            return;
        };
        let element = selection.gizmo.element();
        let widget_id = element.id();
        let entry = KeyframeEntry::visible(&element.transform());
        let time = self.timeline.time();

        let Some(track) = self.timeline.track_mut(&track_key(&widget_id)) else {
            tracing::warn!("No track for selected widget {}", widget_id);
            return;
        };
        track.set_keyframe(time, entry);
        self.timeline.update_tracks();

        tracing::debug!("Committed keyframe for {} at {}s", widget_id, time);
        self.emit(EditorEvent::KeyframeCommitted { widget_id, time });
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// One frame: sync playback time, apply resolved state, re-measure the
    /// gizmo.
    pub fn update(&mut self) {
        let time = self.video.current_time();
        if self.timeline.time() != time {
            self.timeline.set_time(time);
        }
        if self.timeline.take_dirty() {
            self.apply_timeline();
        }
        if let Some(selection) = &mut self.selection {
            selection.gizmo.update();
        }
    }

    /// Apply each widget's entry at the current time; widgets without one
    /// keep their state
    fn apply_timeline(&self) {
        for widget in &self.widgets {
            let Some(entry) = self.timeline.resolve_current(&track_key(widget.id())) else {
                continue;
            };
            match entry.decode_transform() {
                Ok(transform) => {
                    let mut element = widget.element().write();
                    element.transform = transform;
                    element.visibility = entry.visibility;
                }
                Err(e) => {
                    tracing::warn!("Skipping keyframe for {}: {}", widget.id(), e);
                }
            }
        }
    }

    /// Drive [`WidgetManager::update`] once per frame at the configured rate.
    ///
    /// `on_frame` runs after every update with the frame interval in seconds;
    /// the loop only ends when it returns [`ControlFlow::Break`].
    pub async fn run<F>(&mut self, mut on_frame: F)
    where
        F: FnMut(&mut Self, f64) -> ControlFlow<()>,
    {
        let delta = self.config.frame_interval();
        let mut interval = tokio::time::interval(Duration::from_secs_f64(delta));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            self.update();
            if on_frame(self, delta).is_break() {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Save / load
    // ------------------------------------------------------------------

    /// Snapshot tracks, video source and widget init records
    pub fn save(&self) -> SerializedData {
        SerializedData {
            tracks: self.timeline.tracks().clone(),
            video_src: self.video.src(),
            widgets: self.widgets.iter().map(|w| w.init().clone()).collect(),
        }
    }

    /// Replace the whole scene.
    ///
    /// Widgets are re-created in order with their stored ids, then the
    /// stored tracks replace the fresh empty ones.
    pub async fn load(&mut self, data: SerializedData) -> Result<()> {
        let SerializedData {
            tracks,
            video_src,
            widgets,
        } = data;

        self.video.set_src(&video_src);
        self.clear_widgets();
        for init in widgets {
            self.add_widget(init).await?;
        }

        let tracks = self.reconcile_tracks(tracks);
        self.timeline.replace_tracks(tracks);
        self.timeline.update_tracks();
        // Move the cursor away from zero and back so the next frame
        // re-applies every widget even if playback already sits at zero.
        self.timeline.set_time(1.0);
        self.timeline.set_time(0.0);
        self.video.set_current_time(0.0);

        tracing::info!("Loaded scene with {} widgets", self.widgets.len());
        Ok(())
    }

    /// Keep only tracks of live widgets and give every live widget a track
    fn reconcile_tracks(&self, mut tracks: Tracks) -> Tracks {
        tracks.retain(|key, _| {
            let live = widget_id_from_key(key).is_some_and(|id| self.widget(id).is_some());
            if !live {
                tracing::warn!("Dropping track {} with no widget", key);
            }
            live
        });
        for widget in &self.widgets {
            let key = track_key(widget.id());
            if !tracks.contains_key(&key) {
                tracing::warn!("Scene has no track for widget {}", widget.id());
                tracks.insert(key, Track::new());
            }
        }
        tracks
    }

    // ------------------------------------------------------------------
    // Surface layout
    // ------------------------------------------------------------------

    /// The video reported it can play; its intrinsic size may now be known
    pub fn on_video_ready(&mut self) {
        self.relayout();
    }

    /// The viewport changed size
    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.viewport = [width, height];
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout = ContainerLayout::fit(
            self.video.video_size(),
            self.config.fallback_video_size,
            self.viewport,
        );
        tracing::debug!(
            "Surface {}x{} at scale {}",
            self.layout.width,
            self.layout.height,
            self.layout.scale
        );
    }

    /// Current surface placement
    pub fn layout(&self) -> &ContainerLayout {
        &self.layout
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Timeline store
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Edit surface
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Base video
    pub fn video(&self) -> &V {
        &self.video
    }

    /// Base video, mutably
    pub fn video_mut(&mut self) -> &mut V {
        &mut self.video
    }

    fn emit(&mut self, event: EditorEvent) {
        self.listeners.retain(|listener| listener.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticImageLoader;
    use crate::video::HeadlessVideo;
    use reel_editor_timeline::{Transform, Visibility};
    use std::collections::BTreeSet;

    fn manager() -> WidgetManager<HeadlessVideo> {
        WidgetManager::new(
            HeadlessVideo::new().with_metadata([1920, 1080], 30.0),
            StaticImageLoader::new(200, 100),
            EditorConfig::default(),
        )
    }

    fn assert_bijection(manager: &WidgetManager<HeadlessVideo>) {
        let live: BTreeSet<&str> = manager.widgets().iter().map(|w| w.id()).collect();
        let tracked: BTreeSet<&str> = manager
            .timeline()
            .tracks()
            .keys()
            .map(|k| widget_id_from_key(k).unwrap())
            .collect();
        assert_eq!(live, tracked);
        assert_eq!(manager.surface().len(), manager.widgets().len());
    }

    #[tokio::test]
    async fn test_generated_ids() {
        let mut manager = manager();
        let a = manager.add_widget(WidgetInit::text()).await.unwrap();
        let b = manager.add_widget(WidgetInit::text()).await.unwrap();

        assert_eq!(a.id(), "id0");
        assert_eq!(b.id(), "id1");
        assert_eq!(a.init().id.as_deref(), Some("id0"));
        let keys: Vec<&String> = manager.timeline().tracks().keys().collect();
        assert_eq!(keys, vec!["#id0", "#id1"]);
        assert_bijection(&manager);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let mut manager = manager();
        manager
            .add_widget(WidgetInit::image("a.png").with_id("w1"))
            .await
            .unwrap();
        let err = manager
            .add_widget(WidgetInit::image("b.png").with_id("w1"))
            .await
            .unwrap_err();

        assert!(matches!(err, EditorError::DuplicateWidgetId(ref id) if id == "w1"));
        assert_eq!(manager.widgets().len(), 1);
        assert_eq!(manager.timeline().tracks().len(), 1);
        assert_eq!(
            manager.widget("w1").unwrap().init().kind,
            WidgetKind::Image { src: "a.png".to_string() }
        );
    }

    #[tokio::test]
    async fn test_invalid_type_rejected() {
        let mut manager = manager();
        let init: WidgetInit = serde_json::from_str(r#"{"type":"sticker"}"#).unwrap();
        let err = manager.add_widget(init).await.unwrap_err();

        assert!(matches!(err, EditorError::InvalidWidgetType { id: None }));
        assert!(manager.widgets().is_empty());
        assert!(manager.timeline().tracks().is_empty());

        // No id was consumed
        let widget = manager.add_widget(WidgetInit::text()).await.unwrap();
        assert_eq!(widget.id(), "id0");
    }

    #[tokio::test]
    async fn test_empty_id_is_generated() {
        let mut manager = manager();
        let widget = manager
            .add_widget(WidgetInit::text().with_id(""))
            .await
            .unwrap();

        assert_eq!(widget.id(), "id0");
        assert_eq!(widget.init().id.as_deref(), Some("id0"));
        assert!(manager.timeline().track("#").is_none());
        assert!(manager.timeline().track("#id0").is_some());
        assert_bijection(&manager);
    }

    #[tokio::test]
    async fn test_image_widget_uses_natural_size() {
        let mut manager = manager();
        let widget = manager.add_widget(WidgetInit::image("a.png")).await.unwrap();
        let element = widget.element().read();
        assert_eq!(element.size, [200.0, 100.0]);
        assert_eq!(element.transform, Transform::IDENTITY);
        assert_eq!(element.class_name, "widget");
    }

    #[tokio::test]
    async fn test_generated_ids_skip_loaded_ids() {
        let mut manager = manager();
        let data = SerializedData {
            widgets: vec![
                WidgetInit::text().with_id("id0"),
                WidgetInit::text().with_id("id1"),
            ],
            ..SerializedData::default()
        };
        manager.load(data).await.unwrap();

        let widget = manager.add_widget(WidgetInit::text()).await.unwrap();
        assert_eq!(widget.id(), "id2");
        assert_bijection(&manager);
    }

    #[tokio::test]
    async fn test_selection_replacement_order() {
        let mut manager = manager();
        let a = manager.add_widget(WidgetInit::text()).await.unwrap();
        let b = manager.add_widget(WidgetInit::text()).await.unwrap();
        let events = manager.subscribe();

        manager.select_widget(Some(&a));
        manager.select_widget(Some(&b));

        let events: Vec<EditorEvent> = events.try_iter().collect();
        assert_eq!(events.len(), 3);
        let EditorEvent::GizmoCreated { widget_id, gizmo: first } = &events[0] else {
            panic!("expected GizmoCreated, got {:?}", events[0]);
        };
        assert_eq!(widget_id, "id0");
        assert_eq!(
            events[1],
            EditorEvent::GizmoDestroyed {
                widget_id: "id0".to_string(),
                gizmo: *first,
            }
        );
        assert!(matches!(&events[2], EditorEvent::GizmoCreated { widget_id, .. } if widget_id == "id1"));
        assert!(manager.is_selected(Some(&b)));
        assert!(!manager.is_selected(Some(&a)));
    }

    #[tokio::test]
    async fn test_reselect_is_noop() {
        let mut manager = manager();
        let a = manager.add_widget(WidgetInit::text()).await.unwrap();
        manager.select_widget(Some(&a));
        let gizmo = manager.gizmo().unwrap().id();
        let events = manager.subscribe();

        manager.select_widget(Some(&a));
        assert_eq!(manager.gizmo().unwrap().id(), gizmo);
        assert!(events.try_recv().is_err());

        manager.select_widget(None);
        manager.select_widget(None);
        assert!(manager.gizmo().is_none());
        assert!(manager.is_selected(None));
        let events: Vec<EditorEvent> = events.try_iter().collect();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_commit_and_resolve() {
        let mut manager = manager();
        let widget = manager.add_widget(WidgetInit::text()).await.unwrap();
        manager.video_mut().set_current_time(2.5);
        manager.update();

        manager.handle_input(widget.id(), InputEvent::PointerDown);
        assert!(manager.handle_gesture(Gesture::Drag { translate: [10.0, -5.0] }));
        manager.handle_gesture(Gesture::End);
        manager.handle_gesture(Gesture::RotateStart);
        manager.handle_gesture(Gesture::Rotate { rotate: 45.0 });
        manager.handle_gesture(Gesture::End);

        let expected = Transform::new(45.0, [1.0, 1.0], [10.0, -5.0]);
        assert_eq!(
            manager.timeline().resolve("#id0", 2.5),
            Some(&KeyframeEntry {
                transform: "translate(10px, -5px) rotate(45deg) scale(1, 1)".to_string(),
                visibility: Visibility::Visible,
            })
        );
        assert_eq!(
            manager.timeline().resolve("#id0", 2.5).unwrap().decode_transform().unwrap(),
            expected
        );
        // Both commits landed on the same key
        assert_eq!(manager.timeline().track("#id0").unwrap().len(), 1);

        manager.destroy_widget(&widget);
        assert_eq!(manager.timeline().resolve("#id0", 2.5), None);
        assert!(manager.gizmo().is_none());
        assert_bijection(&manager);
    }

    #[tokio::test]
    async fn test_commit_event() {
        let mut manager = manager();
        let widget = manager.add_widget(WidgetInit::text()).await.unwrap();
        manager.select_widget(Some(&widget));
        let events = manager.subscribe();

        manager.handle_gesture(Gesture::ScaleStart);
        manager.handle_gesture(Gesture::Scale {
            scale: [2.0, 2.0],
            drag: [-80.0, -24.0],
        });
        manager.handle_gesture(Gesture::End);

        assert_eq!(
            events.try_recv(),
            Ok(EditorEvent::KeyframeCommitted {
                widget_id: "id0".to_string(),
                time: 0.0,
            })
        );
        let entry = manager.timeline().resolve("#id0", 0.0).unwrap();
        assert_eq!(
            entry.transform,
            "translate(-80px, -24px) rotate(0deg) scale(2, 2)"
        );
    }

    #[tokio::test]
    async fn test_input_bindings() {
        let mut manager = manager();
        let a = manager.add_widget(WidgetInit::text()).await.unwrap();
        let b = manager.add_widget(WidgetInit::text()).await.unwrap();

        manager.handle_input(a.id(), InputEvent::Focus);
        assert!(manager.is_selected(Some(&a)));

        // Blur of a widget that is not selected leaves the selection alone
        manager.handle_input(b.id(), InputEvent::Blur);
        assert!(manager.is_selected(Some(&a)));

        manager.handle_input(a.id(), InputEvent::KeyDown(Key::Other("a".to_string())));
        assert_eq!(manager.widgets().len(), 2);

        manager.handle_input(a.id(), InputEvent::Blur);
        assert!(manager.is_selected(None));

        manager.handle_input(b.id(), InputEvent::PointerDown);
        assert_eq!(
            manager.gizmo().unwrap().state(),
            crate::gizmo::GizmoState::Dragging
        );

        manager.handle_input(b.id(), InputEvent::KeyDown(Key::Delete));
        assert!(manager.gizmo().is_none());
        assert_eq!(manager.widgets().len(), 1);
        assert_bijection(&manager);
    }

    #[tokio::test]
    async fn test_clear_widgets_newest_first() {
        let mut manager = manager();
        for _ in 0..3 {
            manager.add_widget(WidgetInit::text()).await.unwrap();
        }
        let selected = manager.widget("id1").cloned().unwrap();
        manager.select_widget(Some(&selected));
        let events = manager.subscribe();

        manager.clear_widgets();

        let destroyed: Vec<String> = events
            .try_iter()
            .filter_map(|e| match e {
                EditorEvent::WidgetDestroyed { widget_id } => Some(widget_id),
                _ => None,
            })
            .collect();
        assert_eq!(destroyed, vec!["id2", "id1", "id0"]);
        assert!(manager.widgets().is_empty());
        assert!(manager.timeline().tracks().is_empty());
        assert!(manager.surface().is_empty());
        assert!(manager.gizmo().is_none());
    }

    #[tokio::test]
    async fn test_bijection_under_mixed_operations() {
        let mut manager = manager();
        let mut live = Vec::new();
        for step in 0..12 {
            if step % 3 == 2 {
                let widget: Widget = live.remove(step % live.len());
                manager.destroy_widget(&widget);
            } else if step % 2 == 0 {
                live.push(manager.add_widget(WidgetInit::text()).await.unwrap());
            } else {
                live.push(manager.add_widget(WidgetInit::image("x.png")).await.unwrap());
            }
            assert_bijection(&manager);
        }

        let ids: BTreeSet<&str> = manager.widgets().iter().map(|w| w.id()).collect();
        assert_eq!(ids.len(), manager.widgets().len());
    }

    #[tokio::test]
    async fn test_destroy_twice_is_ignored() {
        let mut manager = manager();
        let a = manager.add_widget(WidgetInit::text()).await.unwrap();
        manager.add_widget(WidgetInit::text()).await.unwrap();
        manager.destroy_widget(&a);
        manager.destroy_widget(&a);
        assert_eq!(manager.widgets().len(), 1);
        assert_bijection(&manager);
    }

    #[tokio::test]
    async fn test_frame_loop_applies_and_holds() {
        let mut manager = manager();
        let widget = manager.add_widget(WidgetInit::text()).await.unwrap();
        let moved = Transform::new(90.0, [1.0, 1.0], [50.0, 0.0]);

        let mut data = manager.save();
        let track = data.tracks.get_mut("#id0").unwrap();
        track.set_keyframe(1.0, KeyframeEntry::visible(&moved));
        track.set_keyframe(
            2.0,
            KeyframeEntry::new(&Transform::IDENTITY, Visibility::Hidden),
        );
        manager.load(data).await.unwrap();
        let widget = manager.widget(widget.id()).cloned().unwrap();

        manager.video_mut().set_current_time(1.0);
        manager.update();
        assert_eq!(widget.element().transform(), moved);

        // No key at 1.5: previous state holds
        manager.video_mut().set_current_time(1.5);
        manager.update();
        assert_eq!(widget.element().transform(), moved);
        assert_eq!(widget.element().visibility(), Visibility::Visible);

        manager.video_mut().set_current_time(2.0);
        manager.update();
        assert_eq!(widget.element().transform(), Transform::IDENTITY);
        assert_eq!(widget.element().visibility(), Visibility::Hidden);
    }

    #[tokio::test]
    async fn test_malformed_entry_is_skipped() {
        let mut manager = manager();
        let widget = manager.add_widget(WidgetInit::text()).await.unwrap();
        let mut data = manager.save();
        data.tracks.get_mut("#id0").unwrap().set_keyframe(
            0.0,
            KeyframeEntry {
                transform: "rotate(10deg)".to_string(),
                visibility: Visibility::Hidden,
            },
        );
        manager.load(data).await.unwrap();
        manager.update();

        let widget = manager.widget(widget.id()).unwrap();
        assert_eq!(widget.element().transform(), Transform::IDENTITY);
        assert_eq!(widget.element().visibility(), Visibility::Visible);
    }

    #[tokio::test]
    async fn test_save_load_idempotent() {
        let mut manager = manager();
        manager.video_mut().set_src("https://cdn.example/base.mp4");
        let text = manager.add_widget(WidgetInit::text()).await.unwrap();
        manager
            .add_widget(WidgetInit::image("sticker.png").with_id("sticker"))
            .await
            .unwrap();

        manager.video_mut().set_current_time(0.5);
        manager.update();
        manager.select_widget(Some(&text));
        manager.handle_gesture(Gesture::DragStart);
        manager.handle_gesture(Gesture::Drag { translate: [12.5, 3.0] });
        manager.handle_gesture(Gesture::End);

        let saved = manager.save();
        manager.load(saved.clone()).await.unwrap();
        let reloaded = manager.save();

        assert_eq!(reloaded, saved);
        assert_eq!(
            serde_json::to_string(&reloaded).unwrap(),
            serde_json::to_string(&saved).unwrap()
        );
        assert_eq!(manager.video().current_time(), 0.0);
        assert!(manager.gizmo().is_none());
        assert_bijection(&manager);
    }

    #[tokio::test]
    async fn test_load_reconciles_tracks() {
        let mut manager = manager();
        let data = SerializedData::from_json(
            r##"{
                "tracks": {"#ghost": {}, "#a": {"0": {"transform": "translate(1px, 1px) rotate(0deg) scale(1, 1)", "visibility": "visible"}}},
                "videoSrc": "v.mp4",
                "widgets": [{"type": "text", "id": "a"}, {"type": "text", "id": "b"}]
            }"##,
        )
        .unwrap();
        manager.load(data).await.unwrap();

        assert!(manager.timeline().track("#ghost").is_none());
        assert!(manager.timeline().track("#b").unwrap().is_empty());
        assert_eq!(manager.timeline().track("#a").unwrap().len(), 1);
        assert_bijection(&manager);

        manager.update();
        assert_eq!(
            manager.widget("a").unwrap().element().transform().translate,
            [1.0, 1.0]
        );
    }

    #[tokio::test]
    async fn test_load_propagates_errors() {
        let mut manager = manager();
        let data = SerializedData {
            widgets: vec![
                WidgetInit::text().with_id("dup"),
                WidgetInit::text().with_id("dup"),
            ],
            ..SerializedData::default()
        };
        let err = manager.load(data).await.unwrap_err();
        assert!(matches!(err, EditorError::DuplicateWidgetId(_)));
    }

    #[tokio::test]
    async fn test_gizmo_follows_external_moves() {
        let mut manager = manager();
        let widget = manager.add_widget(WidgetInit::text()).await.unwrap();
        manager.select_widget(Some(&widget));
        widget
            .element()
            .set_transform(Transform::new(0.0, [1.0, 1.0], [100.0, 100.0]));

        manager.update();
        assert_eq!(manager.gizmo().unwrap().layout().min, [100.0, 100.0]);
    }

    #[tokio::test]
    async fn test_gizmo_measured_after_keyframe_applied() {
        let mut manager = manager();
        let widget = manager.add_widget(WidgetInit::text()).await.unwrap();
        let mut data = manager.save();
        data.tracks.get_mut("#id0").unwrap().set_keyframe(
            1.0,
            KeyframeEntry::visible(&Transform::new(0.0, [1.0, 1.0], [300.0, 200.0])),
        );
        manager.load(data).await.unwrap();
        let widget = manager.widget(widget.id()).cloned().unwrap();
        manager.select_widget(Some(&widget));
        assert_eq!(manager.gizmo().unwrap().layout().min, [0.0, 0.0]);

        manager.video_mut().set_current_time(1.0);
        manager.update();

        let layout = manager.gizmo().unwrap().layout();
        assert_eq!(layout.min, [300.0, 200.0]);
        assert_eq!(layout.max, [460.0, 248.0]);
    }

    #[tokio::test]
    async fn test_layout_tracks_video_and_viewport() {
        let mut manager = WidgetManager::new(
            HeadlessVideo::new(),
            StaticImageLoader::default(),
            EditorConfig::default(),
        );
        assert_eq!(manager.layout().width, 1280.0);
        assert_eq!(manager.layout().scale, 1.0);

        manager.resize_viewport(640.0, 720.0);
        assert_eq!(manager.layout().scale, 0.5);
        assert_eq!(manager.layout().top, (720.0 - 360.0) / 2.0);

        *manager.video_mut() = HeadlessVideo::new().with_metadata([720, 1280], 10.0);
        manager.on_video_ready();
        assert_eq!(manager.layout().height, 1280.0);
        assert_eq!(manager.layout().scale, 720.0 / 1280.0);
    }

    #[tokio::test]
    async fn test_run_until_break() {
        let mut manager = WidgetManager::new(
            HeadlessVideo::new().with_metadata([640, 360], 10.0),
            StaticImageLoader::default(),
            EditorConfig {
                frame_rate: 240.0,
                ..EditorConfig::default()
            },
        );
        manager.video_mut().play();

        let mut frames = 0;
        manager
            .run(|manager, delta| {
                frames += 1;
                manager.video_mut().advance(delta);
                if frames == 4 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(frames, 4);
        // The last advance has not been synced yet
        assert!((manager.timeline().time() - 3.0 / 240.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_run_with_out_of_range_frame_rate() {
        let mut manager = WidgetManager::new(
            HeadlessVideo::new(),
            StaticImageLoader::default(),
            EditorConfig {
                frame_rate: 1e12,
                ..EditorConfig::default()
            },
        );

        let mut intervals = Vec::new();
        manager
            .run(|_, delta| {
                intervals.push(delta);
                if intervals.len() == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(intervals, vec![0.001, 0.001]);
    }
}
