// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element id resolution.
//!
//! Scene nodes arrive from exporters with uneven naming: some carry the
//! domain element id (an IFC GlobalId) directly in their name, some carry
//! it in metadata, and deeply split meshes only inherit it from an
//! ancestor. [`resolve`] walks that ladder and returns the id a node
//! represents; [`candidate_ids`] enumerates every id a node is reachable
//! under, which is what the element index buckets by. Both share the same
//! per-level checks, so the resolver and the index cannot disagree.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use bimview_scene::{NodeKey, SceneGraph};

use crate::error::{Error, Result};

/// Metadata key carrying an explicit element id.
pub const GLOBAL_ID_KEY: &str = "globalId";

/// Metadata key carrying the element category (e.g. `"IfcWall"`).
pub const CATEGORY_KEY: &str = "category";

/// Synthetic root names stamped by export pipelines; never element ids.
pub const RESERVED_ROOT_NAMES: [&str; 2] = ["RootNode", "Scene"];

/// Default number of ancestor levels the resolver examines.
pub const DEFAULT_ANCESTOR_DEPTH: usize = 10;

/// Opaque domain element identifier.
///
/// The id is externally assigned (authoring tools mint them); the core
/// treats it as a plain token. [`ElementId::new`] accepts anything, which
/// the diagnostic name fallback relies on; use [`ElementId::validated`]
/// when the input must have the id shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wraps a raw string without shape checking.
    pub fn new(id: impl Into<String>) -> Self {
        ElementId(id.into())
    }

    /// Wraps a string after checking it against the id-shape heuristic.
    pub fn validated(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if looks_like_element_id(&id) {
            Ok(ElementId(id))
        } else {
            Err(Error::InvalidElementId(id))
        }
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the id satisfies the shape heuristic.
    pub fn is_wellformed(&self) -> bool {
        looks_like_element_id(&self.0)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        ElementId::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        ElementId(s)
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The id-shape heuristic: 20 to 24 characters, no hyphens, and not one
/// of the reserved synthetic root names.
///
/// IFC GlobalIds are 22-character base64 tokens; the window tolerates the
/// sibling id schemes seen in the wild while cheaply rejecting
/// human-authored names (which tend to be short or hyphenated).
pub fn looks_like_element_id(name: &str) -> bool {
    let len = name.chars().count();
    if !(20..=24).contains(&len) {
        return false;
    }
    if name.contains('-') {
        return false;
    }
    !RESERVED_ROOT_NAMES.contains(&name)
}

/// Tuning knobs for [`resolve`] and [`candidate_ids`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Ancestor levels examined, nearest first.
    pub max_depth: usize,
    /// During the ancestor walk, check explicit metadata before the name.
    pub prefer_metadata: bool,
    /// Gate on ancestor *names*: an ancestor whose name fails the
    /// predicate contributes no name-derived id (its explicit metadata id
    /// still counts).
    pub ancestor_filter: Option<fn(&str) -> bool>,
    /// When nothing matched, return the node's own raw name verbatim.
    /// Diagnostic aid, not a validated id.
    pub fallback_to_name: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            max_depth: DEFAULT_ANCESTOR_DEPTH,
            prefer_metadata: false,
            ancestor_filter: None,
            fallback_to_name: false,
        }
    }
}

/// Resolves the element id a scene node represents.
///
/// Order: the node's own heuristic name, then its own explicit metadata
/// id, then the ancestor chain up to `max_depth` levels (per ancestor in
/// the configured order), then the optional raw-name fallback. Returns
/// `None` when nothing matches or the key is stale.
pub fn resolve<S: SceneGraph>(scene: &S, node: NodeKey, opts: &ResolveOptions) -> Option<ElementId> {
    if !scene.contains(node) {
        return None;
    }
    if let Some(name) = heuristic_name(scene, node) {
        return Some(ElementId::new(name));
    }
    if let Some(id) = explicit_id(scene, node) {
        return Some(ElementId::new(id));
    }

    // Ancestor walk, nearest first. The depth bound also guarantees
    // termination on graphs with accidental parent cycles.
    let mut current = node;
    for _ in 0..opts.max_depth {
        let Some(parent) = scene.parent(current) else {
            break;
        };
        if let Some(id) = ancestor_id(scene, parent, opts) {
            return Some(id);
        }
        current = parent;
    }

    if opts.fallback_to_name {
        if let Some(name) = scene.name(node).filter(|n| !n.is_empty()) {
            return Some(ElementId::new(name));
        }
    }
    None
}

/// Enumerates every id `node` is reachable under: its own ids plus the
/// eligible ids of each ancestor within `max_depth`. Duplicates are
/// collapsed. The element index buckets a renderable node under each of
/// these.
pub fn candidate_ids<S: SceneGraph>(
    scene: &S,
    node: NodeKey,
    opts: &ResolveOptions,
) -> SmallVec<[ElementId; 4]> {
    let mut out: SmallVec<[ElementId; 4]> = SmallVec::new();
    if !scene.contains(node) {
        return out;
    }
    if let Some(name) = heuristic_name(scene, node) {
        push_unique(&mut out, ElementId::new(name));
    }
    if let Some(id) = explicit_id(scene, node) {
        push_unique(&mut out, ElementId::new(id));
    }
    let mut current = node;
    for _ in 0..opts.max_depth {
        let Some(parent) = scene.parent(current) else {
            break;
        };
        if let Some(name) = eligible_ancestor_name(scene, parent, opts) {
            push_unique(&mut out, ElementId::new(name));
        }
        if let Some(id) = explicit_id(scene, parent) {
            push_unique(&mut out, ElementId::new(id));
        }
        current = parent;
    }
    out
}

// --- Per-level checks (shared by resolver and index) ---

fn heuristic_name(scene: &impl SceneGraph, node: NodeKey) -> Option<&str> {
    scene.name(node).filter(|n| looks_like_element_id(n))
}

fn explicit_id(scene: &impl SceneGraph, node: NodeKey) -> Option<&str> {
    scene.meta_text(node, GLOBAL_ID_KEY).filter(|v| !v.is_empty())
}

fn eligible_ancestor_name<'a>(
    scene: &'a impl SceneGraph,
    node: NodeKey,
    opts: &ResolveOptions,
) -> Option<&'a str> {
    let name = heuristic_name(scene, node)?;
    match opts.ancestor_filter {
        Some(filter) if !filter(name) => None,
        _ => Some(name),
    }
}

fn ancestor_id(scene: &impl SceneGraph, node: NodeKey, opts: &ResolveOptions) -> Option<ElementId> {
    if opts.prefer_metadata {
        explicit_id(scene, node)
            .map(ElementId::new)
            .or_else(|| eligible_ancestor_name(scene, node, opts).map(ElementId::new))
    } else {
        eligible_ancestor_name(scene, node, opts)
            .map(ElementId::new)
            .or_else(|| explicit_id(scene, node).map(ElementId::new))
    }
}

fn push_unique(out: &mut SmallVec<[ElementId; 4]>, id: ElementId) {
    if !out.contains(&id) {
        out.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bimview_scene::{Aabb, Material, Metadata, Point3, SceneArena};

    const WALL_ID: &str = "2O2Fr$t4X7Zf8NOew3FL9r";
    const SLAB_ID: &str = "1hOSvn6df7F8_7GcBWlRGQ";

    fn mesh(scene: &mut SceneArena, parent: Option<NodeKey>, name: &str) -> NodeKey {
        scene
            .add_mesh(
                parent,
                name,
                Aabb::around(Point3::origin(), 1.0),
                Material::default().into_ref(),
            )
            .unwrap()
    }

    // --- Heuristic ---

    #[test]
    fn test_heuristic_accepts_global_id_shapes() {
        assert!(looks_like_element_id("A1b2C3d4E5f6G7h8I9J0"));
        assert!(looks_like_element_id(WALL_ID));
        assert!(looks_like_element_id("abcdefghijklmnopqrst")); // 20
        assert!(looks_like_element_id("abcdefghijklmnopqrstuvwx")); // 24
    }

    #[test]
    fn test_heuristic_rejects_length_outliers() {
        assert!(!looks_like_element_id(""));
        assert!(!looks_like_element_id("abcdefghijklmnopqrs")); // 19
        assert!(!looks_like_element_id("abcdefghijklmnopqrstuvwxy")); // 25
    }

    #[test]
    fn test_heuristic_rejects_hyphens_and_reserved() {
        assert!(!looks_like_element_id("wall-opening-01"));
        assert!(!looks_like_element_id("aaaaaaaaaa-aaaaaaaaaa"));
        assert!(!looks_like_element_id("RootNode"));
        assert!(!looks_like_element_id("Scene"));
    }

    #[test]
    fn test_validated_constructor() {
        assert!(ElementId::validated(WALL_ID).is_ok());
        let err = ElementId::validated("wall-opening-01");
        assert!(matches!(err, Err(Error::InvalidElementId(_))));
    }

    // --- Resolution order ---

    #[test]
    fn test_own_name_wins() {
        let mut scene = SceneArena::new();
        let node = mesh(&mut scene, None, WALL_ID);
        scene.set_meta(node, GLOBAL_ID_KEY, SLAB_ID).unwrap();

        let id = resolve(&scene, node, &ResolveOptions::default()).unwrap();
        assert_eq!(id.as_str(), WALL_ID);
    }

    #[test]
    fn test_metadata_when_name_not_id_shaped() {
        let mut scene = SceneArena::new();
        let node = mesh(&mut scene, None, "Basic Wall 200mm");
        scene.set_meta(node, GLOBAL_ID_KEY, WALL_ID).unwrap();

        let id = resolve(&scene, node, &ResolveOptions::default()).unwrap();
        assert_eq!(id.as_str(), WALL_ID);
    }

    #[test]
    fn test_ancestor_name_inherited() {
        let mut scene = SceneArena::new();
        let element = scene.add_group(None, WALL_ID).unwrap();
        let part = scene.add_group(Some(element), "solid").unwrap();
        let leaf = mesh(&mut scene, Some(part), "mesh_0");

        let id = resolve(&scene, leaf, &ResolveOptions::default()).unwrap();
        assert_eq!(id.as_str(), WALL_ID);
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let mut scene = SceneArena::new();
        let outer = scene.add_group(None, SLAB_ID).unwrap();
        let inner = scene.add_group(Some(outer), WALL_ID).unwrap();
        let leaf = mesh(&mut scene, Some(inner), "mesh_0");

        let id = resolve(&scene, leaf, &ResolveOptions::default()).unwrap();
        assert_eq!(id.as_str(), WALL_ID);
    }

    #[test]
    fn test_prefer_metadata_inverts_ancestor_order() {
        let mut scene = SceneArena::new();
        let parent = scene.add_group(None, WALL_ID).unwrap();
        scene.set_meta(parent, GLOBAL_ID_KEY, SLAB_ID).unwrap();
        let leaf = mesh(&mut scene, Some(parent), "mesh_0");

        let by_name = resolve(&scene, leaf, &ResolveOptions::default()).unwrap();
        assert_eq!(by_name.as_str(), WALL_ID);

        let opts = ResolveOptions {
            prefer_metadata: true,
            ..Default::default()
        };
        let by_meta = resolve(&scene, leaf, &opts).unwrap();
        assert_eq!(by_meta.as_str(), SLAB_ID);
    }

    #[test]
    fn test_ancestor_filter_gates_names_not_metadata() {
        fn no_uppercase_start(name: &str) -> bool {
            !name.starts_with(|c: char| c.is_ascii_uppercase())
        }

        let mut scene = SceneArena::new();
        let parent = scene.add_group(None, WALL_ID).unwrap(); // starts with '2', passes
        let blocked = scene.add_group(Some(parent), "ABCDEFGHIJKLMNOPQRSTUV").unwrap();
        scene.set_meta(blocked, GLOBAL_ID_KEY, SLAB_ID).unwrap();
        let leaf = mesh(&mut scene, Some(blocked), "mesh_0");

        let opts = ResolveOptions {
            ancestor_filter: Some(no_uppercase_start),
            ..Default::default()
        };
        // blocked's name is filtered out, but its metadata id still counts
        let id = resolve(&scene, leaf, &opts).unwrap();
        assert_eq!(id.as_str(), SLAB_ID);
    }

    #[test]
    fn test_depth_bound() {
        let mut scene = SceneArena::new();
        let top = scene.add_group(None, WALL_ID).unwrap();
        let mut parent = top;
        for i in 0..10 {
            parent = scene.add_group(Some(parent), &format!("split_{i}")).unwrap();
        }
        let leaf = mesh(&mut scene, Some(parent), "mesh_0");

        // the id sits 11 levels up: out of reach at the default depth of 10
        assert_eq!(resolve(&scene, leaf, &ResolveOptions::default()), None);

        let opts = ResolveOptions {
            max_depth: 11,
            ..Default::default()
        };
        assert_eq!(resolve(&scene, leaf, &opts).unwrap().as_str(), WALL_ID);
    }

    #[test]
    fn test_name_fallback() {
        let mut scene = SceneArena::new();
        let node = mesh(&mut scene, None, "Duct section 12");

        assert_eq!(resolve(&scene, node, &ResolveOptions::default()), None);

        let opts = ResolveOptions {
            fallback_to_name: true,
            ..Default::default()
        };
        let id = resolve(&scene, node, &opts).unwrap();
        assert_eq!(id.as_str(), "Duct section 12");
        assert!(!id.is_wellformed());
    }

    #[test]
    fn test_unnamed_node_resolves_to_none_even_with_fallback() {
        let mut scene = SceneArena::new();
        let node = mesh(&mut scene, None, "");
        let opts = ResolveOptions {
            fallback_to_name: true,
            ..Default::default()
        };
        assert_eq!(resolve(&scene, node, &opts), None);
    }

    #[test]
    fn test_stale_key_resolves_to_none() {
        let scene = SceneArena::new();
        assert_eq!(resolve(&scene, NodeKey::default(), &ResolveOptions::default()), None);
    }

    // --- Candidates ---

    #[test]
    fn test_candidates_collect_all_levels() {
        let mut scene = SceneArena::new();
        let storey = scene.add_group(None, "Level 1").unwrap();
        scene.set_meta(storey, GLOBAL_ID_KEY, SLAB_ID).unwrap();
        let element = scene.add_group(Some(storey), WALL_ID).unwrap();
        let leaf = mesh(&mut scene, Some(element), "mesh_0");

        let ids = candidate_ids(&scene, leaf, &ResolveOptions::default());
        let ids: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec![WALL_ID, SLAB_ID]);
    }

    #[test]
    fn test_candidates_deduplicate() {
        let mut scene = SceneArena::new();
        let node = mesh(&mut scene, None, WALL_ID);
        scene.set_meta(node, GLOBAL_ID_KEY, WALL_ID).unwrap();

        let ids = candidate_ids(&scene, node, &ResolveOptions::default());
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_first_candidate_matches_resolve() {
        let mut scene = SceneArena::new();
        let parent = scene.add_group(None, SLAB_ID).unwrap();
        let node = mesh(&mut scene, Some(parent), "mesh part");
        scene.set_meta(node, GLOBAL_ID_KEY, WALL_ID).unwrap();

        let opts = ResolveOptions::default();
        let ids = candidate_ids(&scene, node, &opts);
        assert_eq!(Some(ids[0].clone()), resolve(&scene, node, &opts));
    }

    // --- Cyclic graphs ---

    /// Minimal adapter with a deliberate parent cycle a → b → a.
    struct LoopScene;

    impl SceneGraph for LoopScene {
        fn roots(&self) -> Vec<NodeKey> {
            Vec::new()
        }
        fn contains(&self, _node: NodeKey) -> bool {
            true
        }
        fn parent(&self, node: NodeKey) -> Option<NodeKey> {
            Some(node)
        }
        fn children(&self, _node: NodeKey) -> Vec<NodeKey> {
            Vec::new()
        }
        fn name(&self, _node: NodeKey) -> Option<&str> {
            Some("looped node")
        }
        fn metadata(&self, _node: NodeKey) -> Option<&Metadata> {
            None
        }
        fn is_renderable(&self, _node: NodeKey) -> bool {
            true
        }
        fn is_visible(&self, _node: NodeKey) -> bool {
            true
        }
        fn set_visible(&mut self, _node: NodeKey, _visible: bool) {}
        fn material(&self, _node: NodeKey) -> Option<bimview_scene::MaterialRef> {
            None
        }
        fn set_material(&mut self, _node: NodeKey, _material: bimview_scene::MaterialRef) {}
        fn world_aabb(&self, _node: NodeKey) -> Option<Aabb> {
            None
        }
    }

    #[test]
    fn test_cyclic_parents_terminate() {
        let scene = LoopScene;
        let node = NodeKey::default();
        assert_eq!(resolve(&scene, node, &ResolveOptions::default()), None);
        assert!(candidate_ids(&scene, node, &ResolveOptions::default()).is_empty());
    }
}
