// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes in world space.
//!
//! Every constructor keeps `min <= max` per component, and the empty case
//! is expressed as `Option<Aabb>` rather than an inverted sentinel box,
//! so no invalid extent ever reaches the camera math.

use nalgebra::{Point3, Vector3};

/// World-space axis-aligned bounding box (f64, matching the camera math).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a box from two corners, normalizing the component order.
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Aabb {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates a cube of the given half-extent centered on a point.
    pub fn around(center: Point3<f64>, half_extent: f64) -> Self {
        let h = Vector3::new(half_extent.abs(), half_extent.abs(), half_extent.abs());
        Aabb {
            min: center - h,
            max: center + h,
        }
    }

    /// Computes the bounding box of a point set. `None` when empty.
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Aabb::new(*first, *first);
        for p in rest {
            aabb.expand_point(*p);
        }
        Some(aabb)
    }

    /// Grows the box to contain a point.
    pub fn expand_point(&mut self, p: Point3<f64>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Returns the smallest box containing both operands.
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis.
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Radius of the bounding sphere (half the diagonal).
    #[inline]
    pub fn radius(&self) -> f64 {
        self.size().norm() * 0.5
    }

    /// Largest single-axis extent.
    pub fn max_dimension(&self) -> f64 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// Returns true when the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true when the two boxes overlap (boundary contact counts).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}
