// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIMView Scene
//!
//! Scene-graph access layer for BIM viewers. The rendering front end
//! (three.js, wgpu, anything else) keeps ownership of its scene; this
//! crate defines the narrow surface the viewer logic reads and writes:
//!
//! - **[`SceneGraph`]**: the traversal trait host adapters implement
//! - **[`SceneArena`]**: the slotmap-backed reference implementation
//! - **[`Material`]** / **[`Rgba`]**: immutable shared materials with
//!   clone-before-mutate override derivation
//! - **[`Metadata`]**: typed per-node properties (element ids, categories)
//! - **[`Aabb`]**: world-space bounds feeding the camera math
//!
//! ## Quick Start
//!
//! ```
//! use bimview_scene::{Aabb, Material, Point3, SceneArena, SceneGraph};
//!
//! let mut scene = SceneArena::new();
//! let root = scene.add_group(None, "Scene").unwrap();
//! let slab = scene
//!     .add_mesh(
//!         Some(root),
//!         "1hOSvn6df7F8_7GcBWlRGQ",
//!         Aabb::around(Point3::new(0.0, 0.1, 0.0), 4.0),
//!         Material::for_category("IfcSlab").into_ref(),
//!     )
//!     .unwrap();
//! scene.set_meta(slab, "category", "IfcSlab").unwrap();
//!
//! assert_eq!(scene.renderables(), vec![slab]);
//! assert_eq!(scene.node_path(slab), vec!["Scene", "1hOSvn6df7F8_7GcBWlRGQ"]);
//! ```

pub mod aabb;
pub mod arena;
pub mod color;
pub mod error;
pub mod graph;
pub mod keys;
pub mod material;
pub mod metadata;

pub use aabb::Aabb;
pub use arena::{NodeData, SceneArena};
pub use color::{ColorRamp, Rgba};
pub use error::{Error, Result};
pub use graph::SceneGraph;
pub use keys::{NodeKey, SceneGeneration};
pub use material::{Material, MaterialRef};
pub use metadata::{MetaValue, Metadata};

// Re-export the math types used across the public API.
pub use nalgebra::{Point3, Vector3};
