// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for scene entities
//!
//! Nodes are addressed by generational [`NodeKey`]s handed out by the
//! arena. A key outlives the node it points at: lookups with a stale key
//! return `None` instead of touching recycled storage, which is what lets
//! the viewer layers hold node references without owning the scene.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for scene-graph nodes (groups and renderable meshes)
    pub struct NodeKey;
}

/// Identity of one attached scene.
///
/// The viewer bumps the generation every time the host swaps the current
/// scene. Side tables (visibility records, index buckets, bounds caches)
/// remember the generation they were built for and are discarded when it
/// no longer matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneGeneration(u64);

impl SceneGeneration {
    /// Returns the next generation in sequence.
    #[inline]
    pub fn next(self) -> Self {
        SceneGeneration(self.0 + 1)
    }

    /// Returns the raw counter value.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SceneGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_advances() {
        let g0 = SceneGeneration::default();
        let g1 = g0.next();
        let g2 = g1.next();
        assert_ne!(g0, g1);
        assert_ne!(g1, g2);
        assert!(g0 < g1 && g1 < g2);
        assert_eq!(g2.value(), 2);
    }

    #[test]
    fn test_generation_display() {
        assert_eq!(SceneGeneration::default().to_string(), "gen#0");
    }

    #[test]
    fn test_default_node_key_is_null() {
        use slotmap::Key;
        let key = NodeKey::default();
        assert!(key.is_null());
    }
}
