// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-backed reference scene graph.
//!
//! [`SceneArena`] is the crate's own [`SceneGraph`] implementation. Host
//! adapters typically mirror their renderer's scene into one of these
//! (one node per group/mesh, world-space bounds precomputed), and every
//! test in the workspace builds its fixtures with it. Nodes live in a
//! slot map with stable generational keys; parent/child links are plain
//! key lists kept in insertion order.

use slotmap::SlotMap;

use crate::aabb::Aabb;
use crate::error::{Error, Result};
use crate::graph::SceneGraph;
use crate::keys::NodeKey;
use crate::material::MaterialRef;
use crate::metadata::{MetaValue, Metadata};

/// Data stored for one scene node.
///
/// Groups carry structure and metadata; renderable nodes additionally
/// carry a material and world-space bounds.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Display name; `None` when the exporter left it blank.
    pub name: Option<String>,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub metadata: Metadata,
    pub renderable: bool,
    pub visible: bool,
    pub material: Option<MaterialRef>,
    /// World-space bounds; populated for renderable nodes.
    pub aabb: Option<Aabb>,
}

/// Arena-backed scene graph.
///
/// # Example
///
/// ```
/// use bimview_scene::{Aabb, Material, Point3, SceneArena, SceneGraph};
///
/// let mut scene = SceneArena::new();
/// let root = scene.add_group(None, "Scene").unwrap();
/// let wall = scene
///     .add_mesh(
///         Some(root),
///         "2O2Fr$t4X7Zf8NOew3FL9r",
///         Aabb::around(Point3::new(0.0, 1.5, 0.0), 1.5),
///         Material::default().into_ref(),
///     )
///     .unwrap();
///
/// assert_eq!(scene.node_count(), 2);
/// assert!(scene.is_renderable(wall));
/// assert_eq!(scene.parent(wall), Some(root));
/// ```
#[derive(Debug, Default)]
pub struct SceneArena {
    nodes: SlotMap<NodeKey, NodeData>,
    roots: Vec<NodeKey>,
}

impl SceneArena {
    /// Creates a new, empty scene.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
        }
    }

    // --- Construction ---

    /// Adds a non-renderable group node. `parent = None` makes it a root.
    /// An empty name is stored as `None`.
    pub fn add_group(&mut self, parent: Option<NodeKey>, name: &str) -> Result<NodeKey> {
        self.insert_node(parent, name, false, None, None)
    }

    /// Adds a renderable mesh node with world-space bounds and a material.
    pub fn add_mesh(
        &mut self,
        parent: Option<NodeKey>,
        name: &str,
        aabb: Aabb,
        material: MaterialRef,
    ) -> Result<NodeKey> {
        self.insert_node(parent, name, true, Some(aabb), Some(material))
    }

    fn insert_node(
        &mut self,
        parent: Option<NodeKey>,
        name: &str,
        renderable: bool,
        aabb: Option<Aabb>,
        material: Option<MaterialRef>,
    ) -> Result<NodeKey> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(p) {
                return Err(Error::NodeNotFound(p));
            }
        }
        let key = self.nodes.insert(NodeData {
            name: (!name.is_empty()).then(|| name.to_string()),
            parent,
            children: Vec::new(),
            metadata: Metadata::default(),
            renderable,
            visible: true,
            material,
            aabb,
        });
        match parent {
            Some(p) => self.nodes[p].children.push(key),
            None => self.roots.push(key),
        }
        Ok(key)
    }

    /// Sets one metadata entry on a node.
    pub fn set_meta(
        &mut self,
        node: NodeKey,
        key: &str,
        value: impl Into<MetaValue>,
    ) -> Result<()> {
        let data = self.nodes.get_mut(node).ok_or(Error::NodeNotFound(node))?;
        data.metadata.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Replaces the world-space bounds of a node.
    pub fn set_aabb(&mut self, node: NodeKey, aabb: Aabb) -> Result<()> {
        let data = self.nodes.get_mut(node).ok_or(Error::NodeNotFound(node))?;
        data.aabb = Some(aabb);
        Ok(())
    }

    // --- Accessors ---

    /// Returns the node data for the given key, or `None` if not found.
    pub fn node(&self, key: NodeKey) -> Option<&NodeData> {
        self.nodes.get(key)
    }

    /// Returns the number of nodes in the scene.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the scene holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SceneGraph for SceneArena {
    fn roots(&self) -> Vec<NodeKey> {
        self.roots.clone()
    }

    fn contains(&self, node: NodeKey) -> bool {
        self.nodes.contains_key(node)
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.nodes.get(node)?.parent
    }

    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.nodes
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn name(&self, node: NodeKey) -> Option<&str> {
        self.nodes.get(node)?.name.as_deref()
    }

    fn metadata(&self, node: NodeKey) -> Option<&Metadata> {
        self.nodes.get(node).map(|n| &n.metadata)
    }

    fn is_renderable(&self, node: NodeKey) -> bool {
        self.nodes.get(node).map(|n| n.renderable).unwrap_or(false)
    }

    fn is_visible(&self, node: NodeKey) -> bool {
        self.nodes.get(node).map(|n| n.visible).unwrap_or(false)
    }

    fn set_visible(&mut self, node: NodeKey, visible: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.visible = visible;
        }
    }

    fn material(&self, node: NodeKey) -> Option<MaterialRef> {
        self.nodes.get(node)?.material.clone()
    }

    fn set_material(&mut self, node: NodeKey, material: MaterialRef) {
        if let Some(n) = self.nodes.get_mut(node) {
            if n.material.is_some() {
                n.material = Some(material);
            }
        }
    }

    fn world_aabb(&self, node: NodeKey) -> Option<Aabb> {
        self.nodes.get(node)?.aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::material::Material;
    use nalgebra::Point3;
    use std::sync::Arc;

    fn unit_box() -> Aabb {
        Aabb::around(Point3::origin(), 0.5)
    }

    // --- Construction ---

    #[test]
    fn build_small_hierarchy() {
        let mut scene = SceneArena::new();
        let root = scene.add_group(None, "Scene").unwrap();
        let storey = scene.add_group(Some(root), "EG").unwrap();
        let wall = scene
            .add_mesh(Some(storey), "wall", unit_box(), Material::default().into_ref())
            .unwrap();

        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.roots(), vec![root]);
        assert_eq!(scene.children(root), vec![storey]);
        assert_eq!(scene.parent(wall), Some(storey));
        assert!(scene.is_renderable(wall));
        assert!(!scene.is_renderable(storey));
        assert!(scene.is_visible(wall));
    }

    #[test]
    fn add_to_missing_parent_fails() {
        let mut scene = SceneArena::new();
        let err = scene.add_group(Some(NodeKey::default()), "orphan");
        assert!(matches!(err, Err(Error::NodeNotFound(_))));
        assert!(scene.is_empty());
    }

    #[test]
    fn empty_name_becomes_none() {
        let mut scene = SceneArena::new();
        let node = scene.add_group(None, "").unwrap();
        assert_eq!(scene.name(node), None);
    }

    #[test]
    fn metadata_written_and_read() {
        let mut scene = SceneArena::new();
        let node = scene.add_group(None, "Wall42").unwrap();
        scene.set_meta(node, "globalId", "0cqv$p3rj1GvB0DTzXqej6").unwrap();
        scene.set_meta(node, "storey", 3i64).unwrap();

        assert_eq!(scene.meta_text(node, "globalId"), Some("0cqv$p3rj1GvB0DTzXqej6"));
        assert_eq!(
            scene.metadata(node).unwrap().get("storey"),
            Some(&MetaValue::Int(3))
        );
        assert!(scene.set_meta(NodeKey::default(), "x", 1i64).is_err());
    }

    // --- Mutation ---

    #[test]
    fn visibility_toggles() {
        let mut scene = SceneArena::new();
        let mesh = scene
            .add_mesh(None, "m", unit_box(), Material::default().into_ref())
            .unwrap();
        scene.set_visible(mesh, false);
        assert!(!scene.is_visible(mesh));
        scene.set_visible(mesh, true);
        assert!(scene.is_visible(mesh));
        // stale key: silently ignored
        scene.set_visible(NodeKey::default(), false);
    }

    #[test]
    fn material_swap_only_on_material_nodes() {
        let mut scene = SceneArena::new();
        let group = scene.add_group(None, "g").unwrap();
        let mesh = scene
            .add_mesh(None, "m", unit_box(), Material::default().into_ref())
            .unwrap();

        let red = Material::new(Rgba::rgb(1.0, 0.0, 0.0)).into_ref();
        scene.set_material(mesh, Arc::clone(&red));
        assert!(Arc::ptr_eq(&scene.material(mesh).unwrap(), &red));

        // groups carry no material; the swap is a no-op
        scene.set_material(group, red);
        assert!(scene.material(group).is_none());
    }

    #[test]
    fn world_aabb_for_renderables_only() {
        let mut scene = SceneArena::new();
        let group = scene.add_group(None, "g").unwrap();
        let mesh = scene
            .add_mesh(Some(group), "m", unit_box(), Material::default().into_ref())
            .unwrap();
        assert!(scene.world_aabb(group).is_none());
        assert_eq!(scene.world_aabb(mesh), Some(unit_box()));

        let bigger = Aabb::around(Point3::origin(), 2.0);
        scene.set_aabb(mesh, bigger).unwrap();
        assert_eq!(scene.world_aabb(mesh), Some(bigger));
    }

    #[test]
    fn multiple_roots_keep_order() {
        let mut scene = SceneArena::new();
        let a = scene.add_group(None, "A").unwrap();
        let b = scene.add_group(None, "B").unwrap();
        let c = scene.add_group(None, "C").unwrap();
        assert_eq!(scene.roots(), vec![a, b, c]);
    }
}
