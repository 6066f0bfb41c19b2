// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The traversal seam between viewer logic and host scenes.
//!
//! Rendering front ends own their scene graphs; the viewer layers only
//! need a narrow read/write surface over them. [`SceneGraph`] is that
//! surface. Adapters implement the required accessors over whatever the
//! host stores (a mirrored arena, an FFI bridge, a test double) and the
//! provided traversal helpers come for free.
//!
//! All traversals tolerate malformed graphs: stale keys resolve to
//! nothing and accidental parent/child cycles terminate via visited sets.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::aabb::Aabb;
use crate::keys::NodeKey;
use crate::material::MaterialRef;
use crate::metadata::Metadata;

/// Read/write access to a host-owned scene graph.
pub trait SceneGraph {
    /// Top-level nodes, in insertion order.
    fn roots(&self) -> Vec<NodeKey>;

    /// Returns true when the key refers to a live node.
    fn contains(&self, node: NodeKey) -> bool;

    /// Parent of a node, `None` for roots and stale keys.
    fn parent(&self, node: NodeKey) -> Option<NodeKey>;

    /// Children of a node, in insertion order.
    fn children(&self, node: NodeKey) -> Vec<NodeKey>;

    /// Display name, `None` when absent or the key is stale.
    fn name(&self, node: NodeKey) -> Option<&str>;

    /// Attached property map, if any.
    fn metadata(&self, node: NodeKey) -> Option<&Metadata>;

    /// True for leaf nodes that carry drawable geometry.
    fn is_renderable(&self, node: NodeKey) -> bool;

    /// Current visibility flag of a node.
    fn is_visible(&self, node: NodeKey) -> bool;

    /// Sets the visibility flag. Stale keys are ignored.
    fn set_visible(&mut self, node: NodeKey, visible: bool);

    /// Shared material handle of a renderable node.
    fn material(&self, node: NodeKey) -> Option<MaterialRef>;

    /// Swaps the material handle. Stale keys are ignored.
    fn set_material(&mut self, node: NodeKey, material: MaterialRef);

    /// World-space bounds of a renderable node. Groups return `None`.
    fn world_aabb(&self, node: NodeKey) -> Option<Aabb>;

    // --- Provided traversal helpers ---

    /// Returns the textual metadata value under `key`, if present.
    fn meta_text(&self, node: NodeKey, key: &str) -> Option<&str> {
        self.metadata(node)?.get(key)?.as_text()
    }

    /// Pre-order walk of the subtree rooted at `from` (inclusive).
    fn visit_subtree(&self, from: NodeKey, f: &mut dyn FnMut(NodeKey)) {
        if !self.contains(from) {
            return;
        }
        let mut visited: FxHashSet<NodeKey> = FxHashSet::default();
        let mut stack: SmallVec<[NodeKey; 32]> = SmallVec::new();
        stack.push(from);
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            f(node);
            let mut kids = self.children(node);
            kids.reverse();
            stack.extend(kids);
        }
    }

    /// Pre-order walk of the whole scene.
    fn each_node(&self, f: &mut dyn FnMut(NodeKey)) {
        for root in self.roots() {
            self.visit_subtree(root, f);
        }
    }

    /// Collects every renderable node in the scene.
    fn renderables(&self) -> Vec<NodeKey> {
        let mut out = Vec::new();
        self.each_node(&mut |node| {
            if self.is_renderable(node) {
                out.push(node);
            }
        });
        out
    }

    /// Display names from the root down to `node` (breadcrumb order).
    /// Unnamed levels appear as `"(unnamed)"`.
    fn node_path(&self, node: NodeKey) -> Vec<String> {
        if !self.contains(node) {
            return Vec::new();
        }
        let mut path = Vec::new();
        let mut visited: FxHashSet<NodeKey> = FxHashSet::default();
        let mut current = Some(node);
        while let Some(n) = current {
            if !visited.insert(n) {
                break;
            }
            path.push(self.name(n).unwrap_or("(unnamed)").to_string());
            current = self.parent(n);
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::SceneArena;
    use crate::material::Material;
    use nalgebra::Point3;

    fn sample_scene() -> (SceneArena, NodeKey, NodeKey, NodeKey) {
        let mut scene = SceneArena::new();
        let root = scene.add_group(None, "Scene").unwrap();
        let storey = scene.add_group(Some(root), "Level 1").unwrap();
        let mesh = scene
            .add_mesh(
                Some(storey),
                "wall-a",
                Aabb::around(Point3::origin(), 1.0),
                Material::default().into_ref(),
            )
            .unwrap();
        (scene, root, storey, mesh)
    }

    #[test]
    fn visit_subtree_is_preorder() {
        let (scene, root, storey, mesh) = sample_scene();
        let mut seen = Vec::new();
        scene.visit_subtree(root, &mut |n| seen.push(n));
        assert_eq!(seen, vec![root, storey, mesh]);
    }

    #[test]
    fn each_node_covers_all_roots() {
        let (mut scene, root, _, _) = sample_scene();
        let other_root = scene.add_group(None, "Annotations").unwrap();
        let mut seen = Vec::new();
        scene.each_node(&mut |n| seen.push(n));
        assert_eq!(seen.first(), Some(&root));
        assert!(seen.contains(&other_root));
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn renderables_filters_groups() {
        let (scene, _, _, mesh) = sample_scene();
        assert_eq!(scene.renderables(), vec![mesh]);
    }

    #[test]
    fn node_path_breadcrumb() {
        let (scene, _, _, mesh) = sample_scene();
        assert_eq!(scene.node_path(mesh), vec!["Scene", "Level 1", "wall-a"]);
    }

    #[test]
    fn node_path_unnamed_levels() {
        let mut scene = SceneArena::new();
        let root = scene.add_group(None, "").unwrap();
        let child = scene.add_group(Some(root), "Roof").unwrap();
        assert_eq!(scene.node_path(child), vec!["(unnamed)", "Roof"]);
    }

    #[test]
    fn stale_keys_are_harmless() {
        let (scene, ..) = sample_scene();
        let stale = NodeKey::default();
        let mut count = 0;
        scene.visit_subtree(stale, &mut |_| count += 1);
        assert_eq!(count, 0);
        assert!(scene.node_path(stale).is_empty());
        assert_eq!(scene.meta_text(stale, "globalId"), None);
    }
}
