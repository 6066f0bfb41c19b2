// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tick-driven camera transitions.
//!
//! A transition is an explicit value with a handle, not a closure
//! captured by a frame callback: the view-state manager owns at most one
//! [`CameraAnimation`] and drives it from the host's frame tick. Position
//! and target are interpolated with cubic ease-in-out, the up vector is
//! lerped and renormalized, and the final tick snaps to the exact
//! destination so repeated transitions accumulate no drift. Orientation
//! is realized every tick (the rig receives a full pose each time);
//! orienting only on completion produces a visible snap at the end.

use nalgebra::Point3;

use crate::camera::ViewPose;

/// Handle of one started transition, monotonically increasing per
/// manager. Lets callers ask "is *my* animation still running" after
/// later operations may have replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(pub(crate) u64);

/// Outcome of one animation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationStatus {
    /// No transition in flight.
    Idle,
    /// Transition advanced; `progress` is the raw (un-eased) 0..1 ratio.
    Running { id: AnimationId, progress: f64 },
    /// Transition reached its destination this tick and was cleared.
    Finished { id: AnimationId },
}

/// Cubic ease-in-out: slow start, fast middle, slow stop.
///
/// `t < 0.5: 4t³`, else `1 - (-2t + 2)³ / 2`. Exact at the endpoints
/// (`f(0) = 0`, `f(0.5) = 0.5`, `f(1) = 1`).
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// One in-flight camera transition.
#[derive(Debug, Clone)]
pub struct CameraAnimation {
    id: AnimationId,
    from: ViewPose,
    to: ViewPose,
    duration_ms: f64,
    /// Wall-clock start, captured on the first tick so a transition
    /// created mid-frame does not lose its opening samples.
    start_ms: Option<f64>,
}

impl CameraAnimation {
    pub fn new(id: AnimationId, from: ViewPose, to: ViewPose, duration_ms: f64) -> Self {
        CameraAnimation {
            id,
            from,
            to,
            duration_ms,
            start_ms: None,
        }
    }

    #[inline]
    pub fn id(&self) -> AnimationId {
        self.id
    }

    /// Destination pose of the transition.
    #[inline]
    pub fn destination(&self) -> ViewPose {
        self.to
    }

    /// Samples the pose at `now_ms`. The first call pins the start time.
    /// Returns the pose and the raw progress in 0..=1; progress 1 yields
    /// the destination pose exactly (snap, no residual interpolation).
    pub fn sample(&mut self, now_ms: f64) -> (ViewPose, f64) {
        let start = *self.start_ms.get_or_insert(now_ms);
        let t = if self.duration_ms > 0.0 {
            ((now_ms - start) / self.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if t >= 1.0 {
            return (self.to, 1.0);
        }
        let e = ease_in_out_cubic(t);
        (lerp_pose(&self.from, &self.to, e), t)
    }
}

fn lerp_pose(from: &ViewPose, to: &ViewPose, e: f64) -> ViewPose {
    let up = from.up.lerp(&to.up, e);
    ViewPose {
        position: lerp_point(from.position, to.position, e),
        target: lerp_point(from.target, to.target, e),
        up: up.try_normalize(1e-12).unwrap_or(from.up),
    }
}

fn lerp_point(from: Point3<f64>, to: Point3<f64>, e: f64) -> Point3<f64> {
    from + (to - from) * e
}

/// Allocates [`AnimationId`]s for one manager.
#[derive(Debug, Default)]
pub(crate) struct AnimationIds(u64);

impl AnimationIds {
    pub fn next(&mut self) -> AnimationId {
        self.0 += 1;
        AnimationId(self.0)
    }
}
