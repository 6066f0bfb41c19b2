// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element-to-nodes index.
//!
//! Click handling resolves node → id; everything else (isolation,
//! coloring, camera focus) goes the other way and needs id → nodes
//! without re-walking the scene per lookup. [`ElementIndex::build`] does
//! exactly one traversal and buckets every renderable node under every id
//! it is reachable by ([`candidate_ids`]). The index is immutable after
//! the build and tied to one scene generation; the facade rebuilds it
//! when the host swaps scenes, never on visibility or material churn.

use rustc_hash::{FxHashMap, FxHashSet};

use bimview_scene::{NodeKey, SceneGeneration, SceneGraph};

use crate::ids::{candidate_ids, ElementId, ResolveOptions};

/// Immutable id → node-set buckets for one scene generation.
#[derive(Debug, Clone)]
pub struct ElementIndex {
    buckets: FxHashMap<ElementId, FxHashSet<NodeKey>>,
    node_count: usize,
    generation: SceneGeneration,
}

impl ElementIndex {
    /// Builds the index in a single pre-order traversal of the scene.
    pub fn build<S: SceneGraph>(
        scene: &S,
        opts: &ResolveOptions,
        generation: SceneGeneration,
    ) -> Self {
        let mut buckets: FxHashMap<ElementId, FxHashSet<NodeKey>> = FxHashMap::default();
        let mut node_count = 0usize;
        scene.each_node(&mut |node| {
            if !scene.is_renderable(node) {
                return;
            }
            node_count += 1;
            for id in candidate_ids(scene, node, opts) {
                buckets.entry(id).or_default().insert(node);
            }
        });
        tracing::debug!(
            buckets = buckets.len(),
            renderables = node_count,
            %generation,
            "element index built"
        );
        ElementIndex {
            buckets,
            node_count,
            generation,
        }
    }

    /// Returns the union of the buckets for the given ids. Unknown ids
    /// contribute nothing.
    pub fn query(&self, ids: &[ElementId]) -> FxHashSet<NodeKey> {
        let mut out = FxHashSet::default();
        for id in ids {
            if let Some(bucket) = self.buckets.get(id) {
                out.extend(bucket.iter().copied());
            }
        }
        out
    }

    /// Returns the bucket for a single id, if present.
    pub fn nodes_for(&self, id: &ElementId) -> Option<&FxHashSet<NodeKey>> {
        self.buckets.get(id)
    }

    /// Returns true when at least one node is reachable under the id.
    pub fn contains_id(&self, id: &ElementId) -> bool {
        self.buckets.contains_key(id)
    }

    /// Iterates over every indexed id.
    pub fn ids(&self) -> impl Iterator<Item = &ElementId> {
        self.buckets.keys()
    }

    /// Scene generation the index was built for.
    #[inline]
    pub fn generation(&self) -> SceneGeneration {
        self.generation
    }

    /// Number of id buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true when no renderable node produced a candidate id.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of renderable nodes visited during the build.
    pub fn node_count(&self) -> usize {
        self.node_count
    }
}
