// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visible-extent bounds for camera fitting.
//!
//! The camera manager frames the model against the merged world-space
//! box of the visible renderable nodes (or an explicit subset when
//! focusing on elements). Computing that means touching every node, so
//! the result is cached per scene generation and only recomputed on
//! generation change, explicit invalidation, or a forced refresh.
//! An empty or fully hidden model yields `None`, the "no bounds"
//! sentinel every caller aborts on.

use rustc_hash::FxHashSet;

use bimview_scene::{Aabb, NodeKey, Point3, SceneGeneration, SceneGraph, Vector3};

/// Derived metrics of the visible extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub aabb: Aabb,
    pub center: Point3<f64>,
    pub size: Vector3<f64>,
    /// Bounding-sphere radius (half the diagonal).
    pub radius: f64,
    /// Largest single-axis extent.
    pub max_dimension: f64,
}

impl ViewBounds {
    /// Precomputes the derived metrics of a box.
    pub fn from_aabb(aabb: Aabb) -> Self {
        ViewBounds {
            aabb,
            center: aabb.center(),
            size: aabb.size(),
            radius: aabb.radius(),
            max_dimension: aabb.max_dimension(),
        }
    }
}

/// Merges the world boxes of the relevant renderables.
///
/// With `subset = None` every *visible* renderable counts; an explicit
/// subset is framed regardless of visibility (focusing an element that
/// is currently hidden still has to aim at it). Returns `None` when
/// nothing contributes.
pub fn compute_view_bounds<S: SceneGraph>(
    scene: &S,
    subset: Option<&FxHashSet<NodeKey>>,
) -> Option<ViewBounds> {
    let mut merged: Option<Aabb> = None;
    match subset {
        Some(keys) => {
            for &node in keys {
                if !scene.is_renderable(node) {
                    continue;
                }
                if let Some(aabb) = scene.world_aabb(node) {
                    merged = merge_opt(merged, aabb);
                }
            }
        }
        None => {
            scene.each_node(&mut |node| {
                if scene.is_renderable(node) && scene.is_visible(node) {
                    if let Some(aabb) = scene.world_aabb(node) {
                        merged = merge_opt(merged, aabb);
                    }
                }
            });
        }
    }
    merged.map(ViewBounds::from_aabb)
}

fn merge_opt(acc: Option<Aabb>, next: Aabb) -> Option<Aabb> {
    Some(match acc {
        Some(aabb) => aabb.merge(&next),
        None => next,
    })
}

/// Generation-aware cache for the whole-scene bounds.
#[derive(Debug, Default)]
pub struct BoundsCache {
    bounds: Option<ViewBounds>,
    generation: SceneGeneration,
    valid: bool,
}

impl BoundsCache {
    /// Returns the cached bounds, recomputing when stale (generation
    /// mismatch), invalidated, or explicitly forced.
    pub fn get_or_compute<S: SceneGraph>(
        &mut self,
        scene: &S,
        generation: SceneGeneration,
        force: bool,
    ) -> Option<ViewBounds> {
        if force || !self.valid || self.generation != generation {
            self.bounds = compute_view_bounds(scene, None);
            self.generation = generation;
            self.valid = true;
        }
        self.bounds
    }

    /// Marks the cache stale without recomputing.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Last computed value, without triggering a recompute.
    pub fn cached(&self) -> Option<ViewBounds> {
        if self.valid {
            self.bounds
        } else {
            None
        }
    }
}
