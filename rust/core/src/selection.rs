// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Click selection with exact material restoration.
//!
//! One node is selected at a time. Selecting stores the node's material
//! handle and swaps in a highlight clone; deselecting puts the stored
//! handle back, so the node ends up with the identical instance it had
//! before (pointer-equal, not just value-equal). The batch path recolors
//! whole id sets from a metric ramp and parks its snapshots in the
//! visibility engine's tables, where `show_all` reclaims them.

use serde::{Deserialize, Serialize};

use bimview_scene::{ColorRamp, MaterialRef, NodeKey, Rgba, SceneGraph};

use crate::ids::ElementId;
use crate::index::ElementIndex;
use crate::visibility::VisibilityEngine;

/// Colors applied to the selected node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightStyle {
    /// Replacement base color.
    pub color: Rgba,
    /// Emissive tint, applied only when the material carries the channel.
    pub emissive: Rgba,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        HighlightStyle {
            color: Rgba::rgb(0.12, 0.56, 1.0),
            emissive: Rgba::rgb(0.05, 0.22, 0.4),
        }
    }
}

#[derive(Debug)]
struct Selected {
    node: NodeKey,
    original: MaterialRef,
}

/// Single-selection controller.
#[derive(Debug, Default)]
pub struct SelectionController {
    current: Option<Selected>,
    pub style: HighlightStyle,
}

impl SelectionController {
    /// Creates a controller with the given highlight style.
    pub fn new(style: HighlightStyle) -> Self {
        SelectionController {
            current: None,
            style,
        }
    }

    /// Currently selected node, if any.
    pub fn selected(&self) -> Option<NodeKey> {
        self.current.as_ref().map(|s| s.node)
    }

    /// Selects a renderable node, replacing any previous selection
    /// atomically (the old node is restored first). Returns false when
    /// the node cannot be selected (stale key, group, no material);
    /// a previous selection is still cleared in that case.
    pub fn select<S: SceneGraph>(&mut self, scene: &mut S, node: NodeKey) -> bool {
        if self.selected() == Some(node) {
            return true;
        }
        self.deselect(scene);
        if !scene.is_renderable(node) {
            return false;
        }
        let Some(original) = scene.material(node) else {
            return false;
        };
        let highlighted = original.highlighted(self.style.color, self.style.emissive);
        scene.set_material(node, highlighted.into_ref());
        self.current = Some(Selected { node, original });
        tracing::debug!(?node, "node selected");
        true
    }

    /// Restores and clears the selection. Returns false when nothing was
    /// selected.
    pub fn deselect<S: SceneGraph>(&mut self, scene: &mut S) -> bool {
        let Some(sel) = self.current.take() else {
            return false;
        };
        if scene.contains(sel.node) {
            scene.set_material(sel.node, sel.original);
        }
        true
    }

    /// Click semantics: clicking the selected node toggles it off, any
    /// other node becomes the new selection. Returns the selection after
    /// the click.
    pub fn click<S: SceneGraph>(&mut self, scene: &mut S, node: NodeKey) -> Option<NodeKey> {
        if self.selected() == Some(node) {
            self.deselect(scene);
            None
        } else if self.select(scene, node) {
            Some(node)
        } else {
            None
        }
    }

    /// Drops the selection without touching the scene (used on scene
    /// swap, when the old nodes are gone).
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Batch path: recolors every node of every `(id, value)` pair with
    /// the ramp color of its normalized value. Snapshots ride the
    /// visibility engine's capture tables; the selected node is exempt.
    /// Returns the number of recolored nodes.
    pub fn apply_metric_colors<S: SceneGraph>(
        &self,
        scene: &mut S,
        index: &ElementIndex,
        visibility: &mut VisibilityEngine,
        values: &[(ElementId, f64)],
        range: (f64, f64),
        ramp: &ColorRamp,
    ) -> usize {
        let (min, max) = range;
        let mut recolored = 0;
        for (id, value) in values {
            let Some(bucket) = index.nodes_for(id) else {
                continue;
            };
            let color = ramp.sample(ColorRamp::normalize(*value, min, max));
            for &node in bucket {
                if self.selected() == Some(node) {
                    continue;
                }
                let Some(original) = visibility.snapshot_material(scene, node) else {
                    continue;
                };
                scene.set_material(node, original.tinted(color).into_ref());
                recolored += 1;
            }
        }
        recolored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ResolveOptions;
    use bimview_scene::{Aabb, Material, Point3, SceneArena, SceneGeneration};
    use std::sync::Arc;

    const WALL_ID: &str = "2O2Fr$t4X7Zf8NOew3FL9r";
    const SLAB_ID: &str = "1hOSvn6df7F8_7GcBWlRGQ";

    fn mesh(scene: &mut SceneArena, name: &str, material: Material) -> NodeKey {
        scene
            .add_mesh(None, name, Aabb::around(Point3::origin(), 1.0), material.into_ref())
            .unwrap()
    }

    #[test]
    fn select_highlights_and_deselect_restores_exact_instance() {
        let mut scene = SceneArena::new();
        let node = mesh(&mut scene, "wall", Material::new(Rgba::rgb(0.7, 0.7, 0.7)));
        let before = scene.material(node).unwrap();
        let mut sel = SelectionController::default();

        assert!(sel.select(&mut scene, node));
        let highlighted = scene.material(node).unwrap();
        assert!(!Arc::ptr_eq(&highlighted, &before));
        assert_eq!(highlighted.base_color, sel.style.color);
        // no emissive channel on the source material: none added
        assert_eq!(highlighted.emissive, None);

        assert!(sel.deselect(&mut scene));
        assert!(Arc::ptr_eq(&scene.material(node).unwrap(), &before));
        assert_eq!(sel.selected(), None);
    }

    #[test]
    fn select_swaps_atomically() {
        let mut scene = SceneArena::new();
        let a = mesh(&mut scene, "a", Material::new(Rgba::rgb(0.9, 0.1, 0.1)));
        let b = mesh(&mut scene, "b", Material::new(Rgba::rgb(0.1, 0.9, 0.1)));
        let a_before = scene.material(a).unwrap();
        let mut sel = SelectionController::default();

        sel.select(&mut scene, a);
        sel.select(&mut scene, b);

        // exactly one node highlighted, the first byte-for-byte restored
        assert_eq!(sel.selected(), Some(b));
        assert!(Arc::ptr_eq(&scene.material(a).unwrap(), &a_before));
        assert_eq!(scene.material(b).unwrap().base_color, sel.style.color);
    }

    #[test]
    fn click_toggles() {
        let mut scene = SceneArena::new();
        let node = mesh(&mut scene, "wall", Material::default());
        let before = scene.material(node).unwrap();
        let mut sel = SelectionController::default();

        assert_eq!(sel.click(&mut scene, node), Some(node));
        assert_eq!(sel.click(&mut scene, node), None);
        assert!(Arc::ptr_eq(&scene.material(node).unwrap(), &before));

        // double toggle is idempotent on the scene
        assert_eq!(sel.click(&mut scene, node), Some(node));
        assert_eq!(sel.click(&mut scene, node), None);
        assert!(Arc::ptr_eq(&scene.material(node).unwrap(), &before));
    }

    #[test]
    fn selecting_same_node_twice_is_stable() {
        let mut scene = SceneArena::new();
        let node = mesh(&mut scene, "wall", Material::default());
        let mut sel = SelectionController::default();

        sel.select(&mut scene, node);
        let highlighted = scene.material(node).unwrap();
        assert!(sel.select(&mut scene, node));
        // second select does not stack another highlight
        assert!(Arc::ptr_eq(&scene.material(node).unwrap(), &highlighted));
    }

    #[test]
    fn groups_and_stale_keys_are_not_selectable() {
        let mut scene = SceneArena::new();
        let group = scene.add_group(None, "storey").unwrap();
        let mut sel = SelectionController::default();

        assert!(!sel.select(&mut scene, group));
        assert!(!sel.select(&mut scene, NodeKey::default()));
        assert_eq!(sel.selected(), None);
        assert!(!sel.deselect(&mut scene));
    }

    #[test]
    fn failed_select_still_clears_previous() {
        let mut scene = SceneArena::new();
        let a = mesh(&mut scene, "a", Material::default());
        let group = scene.add_group(None, "storey").unwrap();
        let a_before = scene.material(a).unwrap();
        let mut sel = SelectionController::default();

        sel.select(&mut scene, a);
        assert!(!sel.select(&mut scene, group));
        assert_eq!(sel.selected(), None);
        assert!(Arc::ptr_eq(&scene.material(a).unwrap(), &a_before));
    }

    #[test]
    fn emissive_channel_preserved_when_supported() {
        let mut scene = SceneArena::new();
        let node = mesh(
            &mut scene,
            "lamp",
            Material::new(Rgba::WHITE).with_emissive(Rgba::rgb(1.0, 0.9, 0.6)),
        );
        let mut sel = SelectionController::default();

        sel.select(&mut scene, node);
        let highlighted = scene.material(node).unwrap();
        assert_eq!(highlighted.emissive, Some(sel.style.emissive));
    }

    #[test]
    fn metric_colors_follow_ramp_and_restore() {
        let mut scene = SceneArena::new();
        let wall = mesh(&mut scene, WALL_ID, Material::default());
        let slab = mesh(&mut scene, "slab", Material::default());
        scene.set_meta(slab, "globalId", SLAB_ID).unwrap();
        let wall_before = scene.material(wall).unwrap();
        let index = ElementIndex::build(&scene, &ResolveOptions::default(), SceneGeneration::default());
        let mut vis = VisibilityEngine::new(0.1);
        let sel = SelectionController::default();

        let ramp = ColorRamp::heat();
        let values = vec![
            (ElementId::new(WALL_ID), 0.0),
            (ElementId::new(SLAB_ID), 100.0),
        ];
        let recolored =
            sel.apply_metric_colors(&mut scene, &index, &mut vis, &values, (0.0, 100.0), &ramp);
        assert_eq!(recolored, 2);
        assert_eq!(scene.material(wall).unwrap().base_color, ramp.low);
        assert_eq!(scene.material(slab).unwrap().base_color, ramp.high);

        vis.show_all(&mut scene);
        assert!(Arc::ptr_eq(&scene.material(wall).unwrap(), &wall_before));
    }

    #[test]
    fn metric_colors_skip_selected_node() {
        let mut scene = SceneArena::new();
        let wall = mesh(&mut scene, WALL_ID, Material::default());
        let index = ElementIndex::build(&scene, &ResolveOptions::default(), SceneGeneration::default());
        let mut vis = VisibilityEngine::new(0.1);
        let mut sel = SelectionController::default();

        sel.select(&mut scene, wall);
        let highlighted = scene.material(wall).unwrap();

        let values = vec![(ElementId::new(WALL_ID), 50.0)];
        let recolored = sel.apply_metric_colors(
            &mut scene,
            &index,
            &mut vis,
            &values,
            (0.0, 100.0),
            &ColorRamp::heat(),
        );
        assert_eq!(recolored, 0);
        assert!(Arc::ptr_eq(&scene.material(wall).unwrap(), &highlighted));
    }
}
