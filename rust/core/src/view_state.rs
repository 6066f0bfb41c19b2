// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera view-state manager.
//!
//! The camera is either locked to a named preset or in free orbit.
//! Leaving free mode saves the live pose so the user's hand-tuned view
//! survives a round trip through the preset buttons; returning restores
//! it. Every mode change animates; starting a new transition cancels the
//! one already in flight, so the manager drives at most one animation.
//!
//! All operations fail soft: no computable bounds (empty or fully hidden
//! model), an empty focus set, a stale scene — each aborts with a warn
//! log and leaves the pose untouched.

use rustc_hash::FxHashSet;

use bimview_scene::{SceneGeneration, SceneGraph};

use crate::animation::{AnimationId, AnimationIds, AnimationStatus, CameraAnimation};
use crate::bounds::{compute_view_bounds, BoundsCache, ViewBounds};
use crate::camera::{
    fit_distance, oblique_pose, preset_pose, CameraConfig, CameraMode, CameraRig, ViewPose,
    ViewPreset,
};
use crate::ids::ElementId;
use crate::index::ElementIndex;

/// Named-preset / free-orbit state machine over a host camera rig.
#[derive(Debug)]
pub struct ViewStateManager {
    mode: CameraMode,
    saved_free_pose: Option<ViewPose>,
    bounds: BoundsCache,
    active: Option<CameraAnimation>,
    ids: AnimationIds,
    generation: SceneGeneration,
    config: CameraConfig,
}

impl Default for ViewStateManager {
    fn default() -> Self {
        ViewStateManager::new(CameraConfig::default())
    }
}

impl ViewStateManager {
    pub fn new(config: CameraConfig) -> Self {
        ViewStateManager {
            mode: CameraMode::Free,
            saved_free_pose: None,
            bounds: BoundsCache::default(),
            active: None,
            ids: AnimationIds::default(),
            generation: SceneGeneration::default(),
            config,
        }
    }

    /// Current camera mode.
    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Manager tunables.
    #[inline]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// True while a transition is in flight.
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// True when the given transition is still the active one.
    pub fn is_animation_active(&self, id: AnimationId) -> bool {
        self.active.as_ref().map(CameraAnimation::id) == Some(id)
    }

    /// Scene swap: cancel the in-flight animation (its destination pose
    /// belongs to the old model), drop the saved free pose, invalidate
    /// the bounds cache, adopt the new generation. The mode itself is
    /// kept; a preset stays meaningful across models.
    pub fn on_scene_changed(&mut self, generation: SceneGeneration) {
        self.active = None;
        self.saved_free_pose = None;
        self.bounds.invalidate();
        self.generation = generation;
    }

    /// Marks the whole-scene bounds stale (visible set changed).
    pub fn invalidate_bounds(&mut self) {
        self.bounds.invalidate();
    }

    /// Whole-scene bounds of the visible renderables, cached per
    /// generation. `force` recomputes even with a warm cache.
    pub fn view_bounds<S: SceneGraph>(&mut self, scene: &S, force: bool) -> Option<ViewBounds> {
        self.bounds.get_or_compute(scene, self.generation, force)
    }

    /// Switches to a named preset or back to free orbit, animated.
    pub fn set_view<S: SceneGraph, C: CameraRig>(
        &mut self,
        scene: &S,
        rig: &mut C,
        mode: CameraMode,
    ) -> Option<AnimationId> {
        match mode {
            CameraMode::Preset(preset) => self.set_preset(scene, rig, preset),
            CameraMode::Free => self.set_free(scene, rig),
        }
    }

    fn set_preset<S: SceneGraph, C: CameraRig>(
        &mut self,
        scene: &S,
        rig: &mut C,
        preset: ViewPreset,
    ) -> Option<AnimationId> {
        let Some(bounds) = self.view_bounds(scene, false) else {
            tracing::warn!(%preset, "no visible bounds, preset view aborted");
            return None;
        };
        // leaving free orbit: remember the hand-tuned pose
        if self.mode == CameraMode::Free {
            self.saved_free_pose = Some(rig.pose());
        }
        let distance = fit_distance(
            bounds.radius,
            rig.projection(),
            self.config.padding_factor,
            self.config.min_distance,
        );
        let to = preset_pose(preset, bounds.center, distance);
        self.mode = CameraMode::Preset(preset);
        Some(self.start(rig, to, self.config.transition_ms))
    }

    fn set_free<S: SceneGraph, C: CameraRig>(
        &mut self,
        scene: &S,
        rig: &mut C,
    ) -> Option<AnimationId> {
        if self.mode == CameraMode::Free {
            return None;
        }
        let to = match self.saved_free_pose {
            Some(pose) => pose,
            None => {
                let Some(bounds) = self.view_bounds(scene, false) else {
                    tracing::warn!("no visible bounds, free view aborted");
                    return None;
                };
                let distance = fit_distance(
                    bounds.radius,
                    rig.projection(),
                    self.config.padding_factor,
                    self.config.min_distance,
                );
                oblique_pose(bounds.center, distance)
            }
        };
        self.mode = CameraMode::Free;
        Some(self.start(rig, to, self.config.transition_ms))
    }

    /// Home view: the default oblique pose with generous padding.
    pub fn reset_view<S: SceneGraph, C: CameraRig>(
        &mut self,
        scene: &S,
        rig: &mut C,
    ) -> Option<AnimationId> {
        let Some(bounds) = self.view_bounds(scene, false) else {
            tracing::warn!("no visible bounds, reset view aborted");
            return None;
        };
        let distance = fit_distance(
            bounds.radius,
            rig.projection(),
            self.config.reset_padding,
            self.config.min_distance,
        );
        let to = oblique_pose(bounds.center, distance);
        self.mode = CameraMode::Free;
        self.saved_free_pose = None;
        Some(self.start(rig, to, self.config.transition_ms))
    }

    /// Zoom to extents: keep the current view direction, force a bounds
    /// recompute (visibility may have changed since the cache was
    /// built), retarget to the new center, and move only along the
    /// unchanged direction.
    pub fn fit_to_model<S: SceneGraph, C: CameraRig>(
        &mut self,
        scene: &S,
        rig: &mut C,
    ) -> Option<AnimationId> {
        let Some(bounds) = self.view_bounds(scene, true) else {
            tracing::warn!("no visible bounds, fit to model aborted");
            return None;
        };
        let to = self.frame_along_current_direction(rig, &bounds);
        Some(self.start(rig, to, self.config.fit_ms))
    }

    /// Frames a set of elements: subset bounds over the index buckets,
    /// current direction kept. Returns the handle and the matched node
    /// count (0 when the ids are unknown; the camera does not move).
    pub fn focus_on<S: SceneGraph, C: CameraRig>(
        &mut self,
        scene: &S,
        rig: &mut C,
        index: &ElementIndex,
        ids: &[ElementId],
    ) -> (Option<AnimationId>, usize) {
        let subset: FxHashSet<_> = index.query(ids);
        if subset.is_empty() {
            tracing::warn!(requested = ids.len(), "focus ids matched nothing");
            return (None, 0);
        }
        let matched = subset.len();
        let Some(bounds) = compute_view_bounds(scene, Some(&subset)) else {
            tracing::warn!(matched, "focus subset has no bounds");
            return (None, matched);
        };
        let to = self.frame_along_current_direction(rig, &bounds);
        (Some(self.start(rig, to, self.config.transition_ms)), matched)
    }

    /// Advances the active transition and applies the sampled pose to
    /// the rig. Call once per host frame with a monotonic timestamp.
    pub fn tick<C: CameraRig>(&mut self, rig: &mut C, now_ms: f64) -> AnimationStatus {
        let Some(anim) = self.active.as_mut() else {
            return AnimationStatus::Idle;
        };
        let id = anim.id();
        let (pose, t) = anim.sample(now_ms);
        rig.set_pose(&pose);
        if t >= 1.0 {
            self.active = None;
            AnimationStatus::Finished { id }
        } else {
            AnimationStatus::Running { id, progress: t }
        }
    }

    /// Drops the in-flight transition without snapping to either end.
    pub fn cancel_animation(&mut self) {
        self.active = None;
    }

    fn frame_along_current_direction<C: CameraRig>(
        &self,
        rig: &C,
        bounds: &ViewBounds,
    ) -> ViewPose {
        let current = rig.pose();
        let distance = fit_distance(
            bounds.radius,
            rig.projection(),
            self.config.padding_factor,
            self.config.min_distance,
        );
        ViewPose::look_at(
            bounds.center + current.offset_direction() * distance,
            bounds.center,
            current.up,
        )
    }

    // At most one transition in flight: starting replaces the previous.
    fn start<C: CameraRig>(&mut self, rig: &C, to: ViewPose, duration_ms: f64) -> AnimationId {
        let id = self.ids.next();
        self.active = Some(CameraAnimation::new(id, rig.pose(), to, duration_ms));
        tracing::debug!(?id, duration_ms, "camera transition started");
        id
    }
}
