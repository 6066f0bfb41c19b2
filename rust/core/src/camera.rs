// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera poses, view presets and fit-distance math.
//!
//! The viewer works in a Y-up frame. A pose is position/target/up; the
//! host rig turns that into its own view matrix via look-at. Named
//! presets carry a fixed unit offset (center → camera) and up vector;
//! the fitted distance places the camera so the model's bounding sphere
//! fills the frustum with a padding margin.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Camera pose: where the camera sits, what it looks at, which way is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPose {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
}

impl ViewPose {
    /// Builds a pose, renormalizing `up` (degenerate vectors fall back
    /// to +Y).
    pub fn look_at(position: Point3<f64>, target: Point3<f64>, up: Vector3<f64>) -> Self {
        ViewPose {
            position,
            target,
            up: up.try_normalize(1e-12).unwrap_or_else(Vector3::y),
        }
    }

    /// Unit vector from the camera toward the target.
    pub fn view_direction(&self) -> Vector3<f64> {
        (self.target - self.position)
            .try_normalize(1e-12)
            .unwrap_or_else(|| -Vector3::z())
    }

    /// Unit vector from the target toward the camera (the preset-offset
    /// convention).
    pub fn offset_direction(&self) -> Vector3<f64> {
        (self.position - self.target)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::z)
    }

    /// Distance between camera and target.
    pub fn distance(&self) -> f64 {
        (self.position - self.target).norm()
    }
}

/// Named orthogonal views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPreset {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
}

impl ViewPreset {
    /// All presets, in UI order.
    pub const ALL: [ViewPreset; 6] = [
        ViewPreset::Top,
        ViewPreset::Bottom,
        ViewPreset::Front,
        ViewPreset::Back,
        ViewPreset::Left,
        ViewPreset::Right,
    ];

    /// Unit offset from the model center toward the camera.
    pub fn offset(self) -> Vector3<f64> {
        match self {
            ViewPreset::Top => Vector3::y(),
            ViewPreset::Bottom => -Vector3::y(),
            ViewPreset::Front => Vector3::z(),
            ViewPreset::Back => -Vector3::z(),
            ViewPreset::Left => -Vector3::x(),
            ViewPreset::Right => Vector3::x(),
        }
    }

    /// Up vector paired with the preset (vertical views pick a horizontal
    /// up so the look-at stays well-defined).
    pub fn up(self) -> Vector3<f64> {
        match self {
            ViewPreset::Top => -Vector3::z(),
            ViewPreset::Bottom => Vector3::z(),
            _ => Vector3::y(),
        }
    }

    /// Lowercase preset name.
    pub fn as_str(self) -> &'static str {
        match self {
            ViewPreset::Top => "top",
            ViewPreset::Bottom => "bottom",
            ViewPreset::Front => "front",
            ViewPreset::Back => "back",
            ViewPreset::Left => "left",
            ViewPreset::Right => "right",
        }
    }
}

impl std::fmt::Display for ViewPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ViewPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(ViewPreset::Top),
            "bottom" => Ok(ViewPreset::Bottom),
            "front" => Ok(ViewPreset::Front),
            "back" => Ok(ViewPreset::Back),
            "left" => Ok(ViewPreset::Left),
            "right" => Ok(ViewPreset::Right),
            _ => Err(Error::UnknownPreset(s.to_string())),
        }
    }
}

/// Camera state of the view manager: locked to a preset, or free orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    Preset(ViewPreset),
    Free,
}

/// Projection model of the host camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Full vertical field of view, radians.
        fov_y: f64,
    },
    Orthographic,
}

/// Host camera seam. The rig applies a pose however its renderer wants
/// (three.js `lookAt`, a wgpu view matrix); the manager only deals in
/// poses.
pub trait CameraRig {
    fn pose(&self) -> ViewPose;
    fn set_pose(&mut self, pose: &ViewPose);
    fn projection(&self) -> Projection;
}

/// Plain stored-pose rig, good for tests and headless hosts.
#[derive(Debug, Clone)]
pub struct BasicCamera {
    pub pose: ViewPose,
    pub projection: Projection,
}

impl Default for BasicCamera {
    fn default() -> Self {
        BasicCamera {
            pose: ViewPose::look_at(Point3::new(10.0, 8.0, 10.0), Point3::origin(), Vector3::y()),
            projection: Projection::Perspective {
                fov_y: std::f64::consts::FRAC_PI_3,
            },
        }
    }
}

impl CameraRig for BasicCamera {
    fn pose(&self) -> ViewPose {
        self.pose
    }

    fn set_pose(&mut self, pose: &ViewPose) {
        self.pose = *pose;
    }

    fn projection(&self) -> Projection {
        self.projection
    }
}

/// Tunables of the camera manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Margin multiplier applied to the fitted distance.
    pub padding_factor: f64,
    /// Floor for the fitted distance.
    pub min_distance: f64,
    /// Padding used by reset-view (more generous framing).
    pub reset_padding: f64,
    /// Mode-transition animation length, milliseconds.
    pub transition_ms: f64,
    /// Fit-to-model animation length, milliseconds.
    pub fit_ms: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            padding_factor: 1.2,
            min_distance: 5.0,
            reset_padding: 1.5,
            transition_ms: 600.0,
            fit_ms: 500.0,
        }
    }
}

/// Default oblique view offset (the "home" three-quarter view).
pub fn default_oblique_offset() -> Vector3<f64> {
    Vector3::new(1.0, 0.8, 1.0).normalize()
}

/// Distance that makes a bounding sphere of `radius` fill the frustum.
///
/// Perspective: `radius * padding / sin(fov/2)`. Orthographic (or a
/// degenerate field of view): `radius * 2 * padding`. Clamped below by
/// `min_distance`.
pub fn fit_distance(radius: f64, projection: Projection, padding: f64, min_distance: f64) -> f64 {
    let fitted = match projection {
        Projection::Perspective { fov_y } => {
            let half_sin = (fov_y / 2.0).sin();
            if half_sin > f64::EPSILON {
                radius * padding / half_sin
            } else {
                radius * 2.0 * padding
            }
        }
        Projection::Orthographic => radius * 2.0 * padding,
    };
    fitted.max(min_distance)
}

/// Pose looking at `center` from the preset's direction.
pub fn preset_pose(preset: ViewPreset, center: Point3<f64>, distance: f64) -> ViewPose {
    ViewPose::look_at(center + preset.offset() * distance, center, preset.up())
}

/// Default oblique pose around `center`.
pub fn oblique_pose(center: Point3<f64>, distance: f64) -> ViewPose {
    ViewPose::look_at(center + default_oblique_offset() * distance, center, Vector3::y())
}
