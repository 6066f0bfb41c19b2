// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIMView Core
//!
//! Viewer-state core for BIM models: the part of a model viewer that
//! makes it a spatial tool rather than a static picture. Five
//! components cooperate over one host-owned scene:
//!
//! - **[`ids`]**: maps scene nodes to stable domain element ids (and
//!   enumerates every id a node is reachable under)
//! - **[`index`]**: one-traversal id → node-set buckets for O(1) lookup
//! - **[`visibility`]**: NORMAL / FOCUS (ghost) / ISOLATE presentation
//!   with capture-once side tables and exact restoration
//! - **[`selection`]**: single click-selection with byte-for-byte
//!   material restore, plus batch metric coloring
//! - **[`view_state`]**: named view presets, free-pose save/restore,
//!   visible-extent bounds, fit-distance math and eased camera
//!   transitions
//!
//! [`Viewer`] is the facade UI layers talk to; everything underneath is
//! also public for hosts that want to compose the pieces themselves.
//!
//! The core fails soft by design: a missing scene makes operations
//! no-ops, unknown ids produce empty result sets, and camera requests
//! without a rig abort with a warning. A viewer must never crash on
//! missing state.
//!
//! ## Quick Start
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use bimview_core::{BasicCamera, CameraMode, ElementId, Viewer, ViewPreset};
//! use bimview_scene::{Aabb, Material, Point3, SceneArena};
//!
//! // host-owned scene and camera
//! let mut arena = SceneArena::new();
//! let root = arena.add_group(None, "RootNode").unwrap();
//! let wall = arena.add_group(Some(root), "2O2Fr$t4X7Zf8NOew3FL9r").unwrap();
//! arena
//!     .add_mesh(
//!         Some(wall),
//!         "mesh_0",
//!         Aabb::around(Point3::origin(), 2.0),
//!         Material::for_category("IfcWall").into_ref(),
//!     )
//!     .unwrap();
//! let scene = Rc::new(RefCell::new(arena));
//! let camera = Rc::new(RefCell::new(BasicCamera::default()));
//!
//! let mut viewer: Viewer<SceneArena, BasicCamera> = Viewer::new();
//! viewer.set_scene(&scene);
//! viewer.set_camera(&camera);
//!
//! // isolate the wall, frame it, and drive the transition
//! let wall_id = ElementId::new("2O2Fr$t4X7Zf8NOew3FL9r");
//! assert_eq!(viewer.isolate(&[wall_id.clone()]), 1);
//! viewer.set_view(CameraMode::Preset(ViewPreset::Front));
//! viewer.tick(0.0);
//! viewer.tick(600.0);
//! assert!(!viewer.is_animating());
//! ```

pub mod animation;
pub mod bounds;
pub mod camera;
pub mod error;
pub mod events;
pub mod ids;
pub mod index;
pub mod selection;
pub mod view_state;
pub mod viewer;
pub mod visibility;

pub use animation::{ease_in_out_cubic, AnimationId, AnimationStatus, CameraAnimation};
pub use bounds::{compute_view_bounds, BoundsCache, ViewBounds};
pub use camera::{
    fit_distance, BasicCamera, CameraConfig, CameraMode, CameraRig, Projection, ViewPose,
    ViewPreset,
};
pub use error::{Error, Result};
pub use events::{EventQueue, ViewerEvent};
pub use ids::{
    candidate_ids, looks_like_element_id, resolve, ElementId, ResolveOptions, CATEGORY_KEY,
    DEFAULT_ANCESTOR_DEPTH, GLOBAL_ID_KEY, RESERVED_ROOT_NAMES,
};
pub use index::ElementIndex;
pub use selection::{HighlightStyle, SelectionController};
pub use view_state::ViewStateManager;
pub use viewer::Viewer;
pub use visibility::{DisplayMode, VisibilityEngine, DEFAULT_GHOST_OPACITY};
