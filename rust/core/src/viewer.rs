// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The viewer facade.
//!
//! [`Viewer`] wires the five components together behind the surface the
//! UI layers call: domain element ids in, scene/camera mutations and
//! drained [`ViewerEvent`]s out. The host keeps ownership of scene and
//! camera in `Rc<RefCell<_>>` cells; the viewer holds weak references
//! and upgrades per operation, so a missing collaborator turns the call
//! into a logged no-op instead of a crash. Initialization order between
//! the host panels and this core is therefore unconstrained.
//!
//! Scene identity is a generation counter: every [`Viewer::set_scene`]
//! bump invalidates the element index, the visibility side tables, the
//! bounds cache, the saved free pose and the in-flight animation in one
//! stroke.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bimview_scene::{ColorRamp, NodeKey, SceneGeneration, SceneGraph};

use crate::animation::{AnimationId, AnimationStatus};
use crate::camera::{CameraConfig, CameraMode, CameraRig};
use crate::events::{EventQueue, ViewerEvent};
use crate::ids::{resolve, ElementId, ResolveOptions};
use crate::index::ElementIndex;
use crate::selection::{HighlightStyle, SelectionController};
use crate::view_state::ViewStateManager;
use crate::visibility::{DisplayMode, VisibilityEngine, DEFAULT_GHOST_OPACITY};

/// UI-facing entry point over one scene and one camera.
pub struct Viewer<S: SceneGraph, C: CameraRig> {
    scene: Weak<RefCell<S>>,
    camera: Weak<RefCell<C>>,
    generation: SceneGeneration,
    resolve_options: ResolveOptions,
    index: Option<ElementIndex>,
    visibility: VisibilityEngine,
    selection: SelectionController,
    view_state: ViewStateManager,
    events: EventQueue,
}

impl<S: SceneGraph, C: CameraRig> Default for Viewer<S, C> {
    fn default() -> Self {
        Viewer::new()
    }
}

impl<S: SceneGraph, C: CameraRig> Viewer<S, C> {
    pub fn new() -> Self {
        Viewer::with_options(ResolveOptions::default(), CameraConfig::default())
    }

    pub fn with_options(resolve_options: ResolveOptions, camera: CameraConfig) -> Self {
        Viewer {
            scene: Weak::new(),
            camera: Weak::new(),
            generation: SceneGeneration::default(),
            resolve_options,
            index: None,
            visibility: VisibilityEngine::new(DEFAULT_GHOST_OPACITY),
            selection: SelectionController::new(HighlightStyle::default()),
            view_state: ViewStateManager::new(camera),
            events: EventQueue::default(),
        }
    }

    // --- Attachment ---

    /// Makes `scene` the current scene. Everything generation-bound is
    /// reset: animation, selection, visibility records, bounds, saved
    /// pose. The element index is rebuilt eagerly so the first lookup
    /// does not pay the traversal.
    pub fn set_scene(&mut self, scene: &Rc<RefCell<S>>) {
        self.generation = self.generation.next();
        self.scene = Rc::downgrade(scene);
        self.selection.clear();
        self.visibility.reset(self.generation);
        self.view_state.on_scene_changed(self.generation);
        self.index = Some(ElementIndex::build(
            &*scene.borrow(),
            &self.resolve_options,
            self.generation,
        ));
        tracing::debug!(%self.generation, "scene attached");
        self.events.push(ViewerEvent::SceneAttached {
            generation: self.generation,
        });
    }

    /// Drops the current scene without a replacement.
    pub fn clear_scene(&mut self) {
        self.generation = self.generation.next();
        self.scene = Weak::new();
        self.index = None;
        self.selection.clear();
        self.visibility.reset(self.generation);
        self.view_state.on_scene_changed(self.generation);
        self.events.push(ViewerEvent::SceneDetached);
    }

    /// Makes `camera` the current rig. Any in-flight transition is
    /// dropped; it was sampled against the old rig's pose.
    pub fn set_camera(&mut self, camera: &Rc<RefCell<C>>) {
        self.view_state.cancel_animation();
        self.camera = Rc::downgrade(camera);
    }

    /// Replaces the resolver configuration; the index is rebuilt on the
    /// next id operation so both always share one rule set.
    pub fn set_resolve_options(&mut self, options: ResolveOptions) {
        self.resolve_options = options;
        self.index = None;
    }

    // --- State accessors ---

    #[inline]
    pub fn generation(&self) -> SceneGeneration {
        self.generation
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.visibility.mode()
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.view_state.mode()
    }

    pub fn selected(&self) -> Option<NodeKey> {
        self.selection.selected()
    }

    pub fn is_animating(&self) -> bool {
        self.view_state.is_animating()
    }

    /// Drains the pending event queue, oldest first.
    pub fn take_events(&mut self) -> Vec<ViewerEvent> {
        self.events.take()
    }

    // --- Id surface ---

    /// Element id a scene node represents, if any.
    pub fn resolve_node(&self, node: NodeKey) -> Option<ElementId> {
        let scene = self.scene.upgrade()?;
        let scene = scene.borrow();
        resolve(&*scene, node, &self.resolve_options)
    }

    /// Scene nodes reachable under an element id. Unknown ids give an
    /// empty list, not an error.
    pub fn element_nodes(&mut self, id: &ElementId) -> Vec<NodeKey> {
        let Some(scene) = self.scene.upgrade() else {
            return Vec::new();
        };
        self.ensure_index(&scene.borrow());
        match self.index.as_ref().and_then(|index| index.nodes_for(id)) {
            Some(bucket) => bucket.iter().copied().collect(),
            None => Vec::new(),
        }
    }

    // --- Selection surface ---

    /// 3D-pick entry point: toggles on the already-selected node, swaps
    /// otherwise. Returns the id of the new selection, if any.
    pub fn click_node(&mut self, node: NodeKey) -> Option<ElementId> {
        let scene = self.upgrade_scene()?;
        let before = self.selection.selected();
        let (after, id) = {
            let mut scene = scene.borrow_mut();
            let selected = self.selection.click(&mut *scene, node);
            let id = selected.and_then(|n| resolve(&*scene, n, &self.resolve_options));
            (selected, id)
        };
        // a click that changed nothing (unselectable target, nothing to
        // toggle) must not notify the panels
        if after != before {
            self.events
                .push(ViewerEvent::SelectionChanged { id: id.clone() });
        }
        id
    }

    /// Selects an element by id (tree/panel entry point); with a
    /// multi-node element the lowest-keyed node carries the highlight.
    pub fn select_element(&mut self, id: &ElementId) -> bool {
        let Some(scene) = self.upgrade_scene() else {
            return false;
        };
        self.ensure_index(&scene.borrow());
        let node = self
            .index
            .as_ref()
            .and_then(|index| index.nodes_for(id))
            .and_then(|bucket| bucket.iter().copied().min());
        let Some(node) = node else {
            tracing::debug!(%id, "select target not found");
            return false;
        };
        let ok = self.selection.select(&mut *scene.borrow_mut(), node);
        if ok {
            self.events.push(ViewerEvent::SelectionChanged {
                id: Some(id.clone()),
            });
        }
        ok
    }

    /// Clears the selection, restoring the highlighted material.
    pub fn deselect(&mut self) {
        let Some(scene) = self.upgrade_scene() else {
            return;
        };
        if self.selection.deselect(&mut *scene.borrow_mut()) {
            self.events.push(ViewerEvent::SelectionChanged { id: None });
        }
    }

    // --- Visibility surface ---

    /// Shows only the given elements; everything else is hidden.
    /// Returns the matched node count (0 = nothing found).
    pub fn isolate(&mut self, ids: &[ElementId]) -> usize {
        self.apply_visibility(ids, DisplayMode::Isolate, |viewer, scene, index| {
            viewer.visibility.isolate(scene, index, ids)
        })
    }

    /// Ghosts everything but the given elements.
    pub fn focus(&mut self, ids: &[ElementId]) -> usize {
        let skip = self.selection.selected();
        self.apply_visibility(ids, DisplayMode::Focus, |viewer, scene, index| {
            viewer.visibility.focus(scene, index, ids, skip)
        })
    }

    /// Hides the given elements; unrelated nodes are untouched.
    pub fn hide(&mut self, ids: &[ElementId]) -> usize {
        let mode = self.visibility.mode();
        self.apply_visibility(ids, mode, |viewer, scene, index| {
            viewer.visibility.hide(scene, index, ids)
        })
    }

    /// Re-shows the given elements.
    pub fn show(&mut self, ids: &[ElementId]) -> usize {
        let mode = self.visibility.mode();
        self.apply_visibility(ids, mode, |viewer, scene, index| {
            viewer.visibility.show(scene, index, ids)
        })
    }

    /// Restores every node to its pre-engine visibility and material.
    pub fn show_all(&mut self) -> usize {
        let Some(scene) = self.upgrade_scene() else {
            return 0;
        };
        let restored = self.visibility.show_all(&mut *scene.borrow_mut());
        self.view_state.invalidate_bounds();
        self.events.push(ViewerEvent::IsolationChanged {
            ids: Vec::new(),
            mode: DisplayMode::Normal,
        });
        restored
    }

    /// Opacity override for the given elements (clone-before-mutate;
    /// `show_all` restores the originals).
    pub fn set_transparency(&mut self, ids: &[ElementId], opacity: f32) -> usize {
        let Some(scene) = self.upgrade_scene() else {
            return 0;
        };
        self.ensure_index(&scene.borrow());
        let Some(index) = self.index.as_ref() else {
            return 0;
        };
        let touched =
            self.visibility
                .set_transparency(&mut *scene.borrow_mut(), index, ids, opacity);
        touched
    }

    /// Bulk toggle by metadata category (e.g. hiding all `IfcSpace`).
    pub fn set_category_visible(&mut self, category: &str, visible: bool) -> usize {
        let Some(scene) = self.upgrade_scene() else {
            return 0;
        };
        let touched =
            self.visibility
                .set_category_visible(&mut *scene.borrow_mut(), category, visible);
        self.view_state.invalidate_bounds();
        touched
    }

    /// Batch metric presentation: puts the scene in `mode` for the
    /// listed elements and tints each element's nodes with the ramp
    /// color of its normalized value. Returns the recolored node count.
    pub fn colorize(
        &mut self,
        values: &[(ElementId, f64)],
        range: (f64, f64),
        ramp: &ColorRamp,
        mode: DisplayMode,
    ) -> usize {
        let Some(scene) = self.upgrade_scene() else {
            return 0;
        };
        self.ensure_index(&scene.borrow());
        let Some(index) = self.index.as_ref() else {
            return 0;
        };
        let ids: Vec<ElementId> = values.iter().map(|(id, _)| id.clone()).collect();
        let mut scene = scene.borrow_mut();
        match mode {
            DisplayMode::Isolate => {
                self.visibility.isolate(&mut *scene, index, &ids);
            }
            DisplayMode::Focus => {
                let skip = self.selection.selected();
                self.visibility.focus(&mut *scene, index, &ids, skip);
            }
            DisplayMode::Normal => {}
        }
        let recolored = self.selection.apply_metric_colors(
            &mut *scene,
            index,
            &mut self.visibility,
            values,
            range,
            ramp,
        );
        drop(scene);
        self.view_state.invalidate_bounds();
        self.events
            .push(ViewerEvent::IsolationChanged { ids, mode });
        recolored
    }

    // --- Camera surface ---

    /// Switches to a preset or free orbit, animated.
    pub fn set_view(&mut self, mode: CameraMode) -> Option<AnimationId> {
        let (scene, camera) = self.upgrade_scene_and_camera()?;
        let scene = scene.borrow();
        let mut camera = camera.borrow_mut();
        self.view_state.set_view(&*scene, &mut *camera, mode)
    }

    /// Animates to the oblique home view with generous padding.
    pub fn reset_view(&mut self) -> Option<AnimationId> {
        let (scene, camera) = self.upgrade_scene_and_camera()?;
        let scene = scene.borrow();
        let mut camera = camera.borrow_mut();
        self.view_state.reset_view(&*scene, &mut *camera)
    }

    /// Zoom to extents along the current view direction.
    pub fn fit_to_model(&mut self) -> Option<AnimationId> {
        let (scene, camera) = self.upgrade_scene_and_camera()?;
        let scene = scene.borrow();
        let mut camera = camera.borrow_mut();
        self.view_state.fit_to_model(&*scene, &mut *camera)
    }

    /// Frames the given elements without changing the view direction.
    pub fn focus_camera(&mut self, ids: &[ElementId]) -> Option<AnimationId> {
        let (scene, camera) = self.upgrade_scene_and_camera()?;
        self.ensure_index(&scene.borrow());
        let index = self.index.as_ref()?;
        let scene = scene.borrow();
        let mut camera = camera.borrow_mut();
        let (id, _matched) = self
            .view_state
            .focus_on(&*scene, &mut *camera, index, ids);
        id
    }

    /// Per-frame animation drive; call with a monotonic timestamp.
    pub fn tick(&mut self, now_ms: f64) -> AnimationStatus {
        let Some(camera) = self.camera.upgrade() else {
            return AnimationStatus::Idle;
        };
        let status = self.view_state.tick(&mut *camera.borrow_mut(), now_ms);
        status
    }

    /// Drops the in-flight camera transition, if any.
    pub fn cancel_animation(&mut self) {
        self.view_state.cancel_animation();
    }

    // --- Internals ---

    fn upgrade_scene(&self) -> Option<Rc<RefCell<S>>> {
        let scene = self.scene.upgrade();
        if scene.is_none() {
            tracing::debug!("operation ignored, no scene attached");
        }
        scene
    }

    fn upgrade_scene_and_camera(&self) -> Option<(Rc<RefCell<S>>, Rc<RefCell<C>>)> {
        let scene = self.upgrade_scene()?;
        let Some(camera) = self.camera.upgrade() else {
            tracing::warn!("camera operation aborted, no rig attached");
            return None;
        };
        Some((scene, camera))
    }

    /// Rebuilds the index when it does not belong to the current
    /// generation and rule set (scene swaps build eagerly; this covers
    /// resolver reconfiguration).
    fn ensure_index(&mut self, scene: &S) {
        let stale = self
            .index
            .as_ref()
            .map_or(true, |index| index.generation() != self.generation);
        if stale {
            self.index = Some(ElementIndex::build(
                scene,
                &self.resolve_options,
                self.generation,
            ));
        }
    }

    fn apply_visibility(
        &mut self,
        ids: &[ElementId],
        mode: DisplayMode,
        op: impl FnOnce(&mut Self, &mut S, &ElementIndex) -> usize,
    ) -> usize {
        let Some(scene) = self.upgrade_scene() else {
            return 0;
        };
        self.ensure_index(&scene.borrow());
        let Some(index) = self.index.take() else {
            return 0;
        };
        let matched = op(self, &mut *scene.borrow_mut(), &index);
        self.index = Some(index);
        self.view_state.invalidate_bounds();
        self.events.push(ViewerEvent::IsolationChanged {
            ids: ids.to_vec(),
            mode,
        });
        matched
    }
}

impl<S: SceneGraph, C: CameraRig> std::fmt::Debug for Viewer<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("generation", &self.generation)
            .field("display_mode", &self.visibility.mode())
            .field("camera_mode", &self.view_state.mode())
            .field("selected", &self.selection.selected())
            .field("indexed", &self.index.is_some())
            .finish()
    }
}
