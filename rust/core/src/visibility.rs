// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visibility and isolation state machine.
//!
//! Three presentation modes over the renderable nodes: `Normal` (host
//! state), `Focus` (targets normal, everything else ghosted), `Isolate`
//! (targets visible, everything else hidden). The engine never owns the
//! truth about visibility or materials; it records what it observed
//! before its first write to a node (capture-once, per scene generation)
//! and `show_all` plays those records back, so any operation sequence is
//! exactly reversible.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use bimview_scene::{MaterialRef, NodeKey, SceneGeneration, SceneGraph};

use crate::ids::{ElementId, CATEGORY_KEY};
use crate::index::ElementIndex;

/// Focus-mode translucency applied to non-matched elements.
pub const DEFAULT_GHOST_OPACITY: f32 = 0.1;

/// Presentation mode of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Normal,
    /// Matched elements normal, the rest ghosted.
    Focus,
    /// Matched elements visible, the rest hidden.
    Isolate,
}

/// Visibility/isolation engine with exact-restoration side tables.
#[derive(Debug, Default)]
pub struct VisibilityEngine {
    /// Visibility observed before the engine's first write to a node.
    originals: FxHashMap<NodeKey, bool>,
    /// Material observed before the engine's first swap on a node.
    material_originals: FxHashMap<NodeKey, MaterialRef>,
    mode: DisplayMode,
    generation: SceneGeneration,
    ghost_opacity: f32,
}

impl VisibilityEngine {
    /// Creates an engine; `ghost_opacity` is the focus-mode translucency.
    pub fn new(ghost_opacity: f32) -> Self {
        VisibilityEngine {
            ghost_opacity,
            ..Default::default()
        }
    }

    /// Current presentation mode.
    #[inline]
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Scene generation the side tables belong to.
    #[inline]
    pub fn generation(&self) -> SceneGeneration {
        self.generation
    }

    /// Number of nodes with a captured visibility record.
    pub fn record_count(&self) -> usize {
        self.originals.len()
    }

    /// Drops all records and returns to `Normal` for a new scene
    /// generation. Does not touch the (gone) old scene.
    pub fn reset(&mut self, generation: SceneGeneration) {
        self.originals.clear();
        self.material_originals.clear();
        self.mode = DisplayMode::Normal;
        self.generation = generation;
    }

    /// Shows only the matched elements and hides every other renderable.
    /// Returns the number of matched nodes (0 lets the caller surface
    /// "nothing found"; the scene is still isolated to nothing).
    pub fn isolate<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        index: &ElementIndex,
        ids: &[ElementId],
    ) -> usize {
        let matched = index.query(ids);
        self.restore_materials(scene);
        for node in scene.renderables() {
            self.capture_visibility(scene, node);
            scene.set_visible(node, matched.contains(&node));
        }
        self.mode = DisplayMode::Isolate;
        tracing::debug!(matched = matched.len(), requested = ids.len(), "isolate applied");
        matched.len()
    }

    /// Ghosts every renderable that is not matched; matched nodes keep
    /// their presentation. `skip` exempts one node (the active selection)
    /// from ghosting.
    pub fn focus<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        index: &ElementIndex,
        ids: &[ElementId],
        skip: Option<NodeKey>,
    ) -> usize {
        let matched = index.query(ids);
        self.restore_visibility(scene);
        self.restore_materials(scene);
        for node in scene.renderables() {
            if matched.contains(&node) || Some(node) == skip {
                continue;
            }
            let Some(original) = self.snapshot_material(scene, node) else {
                continue;
            };
            scene.set_material(node, original.ghosted(self.ghost_opacity).into_ref());
        }
        self.mode = DisplayMode::Focus;
        tracing::debug!(matched = matched.len(), requested = ids.len(), "focus applied");
        matched.len()
    }

    /// Hides the matched nodes. Incremental: does not change the mode.
    pub fn hide<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        index: &ElementIndex,
        ids: &[ElementId],
    ) -> usize {
        let matched = index.query(ids);
        for &node in &matched {
            self.capture_visibility(scene, node);
            scene.set_visible(node, false);
        }
        matched.len()
    }

    /// Shows the matched nodes. Incremental: does not change the mode.
    pub fn show<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        index: &ElementIndex,
        ids: &[ElementId],
    ) -> usize {
        let matched = index.query(ids);
        for &node in &matched {
            self.capture_visibility(scene, node);
            scene.set_visible(node, true);
        }
        matched.len()
    }

    /// Overrides the opacity of the matched nodes (clone-before-mutate).
    pub fn set_transparency<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        index: &ElementIndex,
        ids: &[ElementId],
        opacity: f32,
    ) -> usize {
        let matched = index.query(ids);
        let mut touched = 0;
        for &node in &matched {
            let Some(original) = self.snapshot_material(scene, node) else {
                continue;
            };
            scene.set_material(node, original.ghosted(opacity).into_ref());
            touched += 1;
        }
        touched
    }

    /// Toggles every element of a metadata category (subtree-wide), e.g.
    /// hiding all `IfcSpace` volumes.
    pub fn set_category_visible<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        category: &str,
        visible: bool,
    ) -> usize {
        let mut targets = Vec::new();
        scene.each_node(&mut |node| {
            if scene.meta_text(node, CATEGORY_KEY) == Some(category) {
                scene.visit_subtree(node, &mut |member| {
                    if scene.is_renderable(member) {
                        targets.push(member);
                    }
                });
            }
        });
        for &node in &targets {
            self.capture_visibility(scene, node);
            scene.set_visible(node, visible);
        }
        targets.len()
    }

    /// Returns every renderable to its captured original visibility
    /// (nodes never touched default to visible), restores material
    /// snapshots, clears the side tables, and re-enters `Normal`.
    pub fn show_all<S: SceneGraph>(&mut self, scene: &mut S) -> usize {
        let renderables = scene.renderables();
        for &node in &renderables {
            let original = self.originals.get(&node).copied().unwrap_or(true);
            scene.set_visible(node, original);
        }
        for (node, material) in self.material_originals.drain() {
            scene.set_material(node, material);
        }
        self.originals.clear();
        self.mode = DisplayMode::Normal;
        tracing::debug!(renderables = renderables.len(), "show all");
        renderables.len()
    }

    // --- Capture-once snapshots ---

    fn capture_visibility<S: SceneGraph>(&mut self, scene: &S, node: NodeKey) {
        self.originals
            .entry(node)
            .or_insert_with(|| scene.is_visible(node));
    }

    /// Records the pre-override material once and returns it. `None` for
    /// nodes without a material.
    pub(crate) fn snapshot_material<S: SceneGraph>(
        &mut self,
        scene: &S,
        node: NodeKey,
    ) -> Option<MaterialRef> {
        if let Some(existing) = self.material_originals.get(&node) {
            return Some(existing.clone());
        }
        let material = scene.material(node)?;
        self.material_originals.insert(node, material.clone());
        Some(material)
    }

    fn restore_visibility<S: SceneGraph>(&self, scene: &mut S) {
        for (&node, &visible) in &self.originals {
            scene.set_visible(node, visible);
        }
    }

    fn restore_materials<S: SceneGraph>(&self, scene: &mut S) {
        for (&node, material) in &self.material_originals {
            scene.set_material(node, material.clone());
        }
    }
}
