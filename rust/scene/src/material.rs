// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Materials as immutable shared values.
//!
//! Renderable nodes reference a [`Material`] through an [`Arc`]. The
//! viewer layers never mutate a material in place: every visual override
//! (highlight, ghost, tint, transparency) derives a fresh value and swaps
//! the reference, so a stored [`MaterialRef`] is always an exact snapshot
//! of what the node looked like before the override.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Shared material handle. Cloning is a pointer copy.
pub type MaterialRef = Arc<Material>;

/// Render material description, deliberately renderer-agnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub base_color: Rgba,
    /// Emissive channel; `None` means the material has no emissive support.
    pub emissive: Option<Rgba>,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
}

impl Material {
    /// Creates an opaque single-sided material.
    pub fn new(base_color: Rgba) -> Self {
        Material {
            base_color,
            emissive: None,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
        }
    }

    /// Builder-style opacity override (`opacity < 1` implies transparent).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = opacity < 1.0;
        self
    }

    /// Builder-style emissive channel.
    pub fn with_emissive(mut self, emissive: Rgba) -> Self {
        self.emissive = Some(emissive);
        self
    }

    /// Builder-style double-sided flag.
    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// Wraps the material in a shared handle.
    pub fn into_ref(self) -> MaterialRef {
        Arc::new(self)
    }

    /// Derives the selection-highlight variant: base color replaced,
    /// emissive set only when the source material carries the channel.
    pub fn highlighted(&self, color: Rgba, emissive: Rgba) -> Material {
        let mut out = self.clone();
        out.base_color = color;
        if out.emissive.is_some() {
            out.emissive = Some(emissive);
        }
        out
    }

    /// Derives the ghost variant used by focus mode: original color kept,
    /// forced translucent.
    pub fn ghosted(&self, opacity: f32) -> Material {
        let mut out = self.clone();
        out.opacity = opacity;
        out.transparent = true;
        out
    }

    /// Derives a recolored variant for metric overlays.
    pub fn tinted(&self, color: Rgba) -> Material {
        let mut out = self.clone();
        out.base_color = color;
        out
    }

    /// Default material for a BIM element category, the style applied when
    /// a model arrives without per-object materials. Unknown categories get
    /// a neutral gray.
    pub fn for_category(category: &str) -> Material {
        match category {
            "IfcWall" | "IfcWallStandardCase" => Material::new(Rgba::rgb(0.85, 0.84, 0.81)),
            "IfcSlab" | "IfcFooting" => Material::new(Rgba::rgb(0.62, 0.62, 0.64)),
            "IfcRoof" => Material::new(Rgba::rgb(0.58, 0.32, 0.26)),
            "IfcColumn" | "IfcBeam" | "IfcMember" => Material::new(Rgba::rgb(0.52, 0.54, 0.58)),
            "IfcDoor" => Material::new(Rgba::rgb(0.65, 0.45, 0.27)),
            "IfcWindow" | "IfcPlate" | "IfcCurtainWall" => {
                Material::new(Rgba::new(0.45, 0.67, 0.85, 0.3)).with_opacity(0.3)
            }
            "IfcStair" | "IfcStairFlight" | "IfcRamp" => Material::new(Rgba::rgb(0.7, 0.68, 0.6)),
            "IfcRailing" => Material::new(Rgba::rgb(0.4, 0.4, 0.42)),
            "IfcFurnishingElement" => Material::new(Rgba::rgb(0.55, 0.43, 0.3)),
            "IfcSpace" => Material::new(Rgba::new(0.75, 0.8, 0.92, 0.15)).with_opacity(0.15),
            "IfcSite" => Material::new(Rgba::rgb(0.42, 0.58, 0.36)),
            "IfcPipeSegment" | "IfcDuctSegment" | "IfcFlowSegment" => {
                Material::new(Rgba::rgb(0.35, 0.52, 0.68))
            }
            _ => Material::new(Rgba::rgb(0.68, 0.68, 0.68)),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::new(Rgba::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_respects_emissive_support() {
        let plain = Material::new(Rgba::rgb(0.5, 0.5, 0.5));
        let hi = plain.highlighted(Rgba::rgb(0.1, 0.5, 1.0), Rgba::rgb(0.0, 0.2, 0.4));
        assert_eq!(hi.base_color, Rgba::rgb(0.1, 0.5, 1.0));
        assert_eq!(hi.emissive, None);

        let glowing = Material::new(Rgba::WHITE).with_emissive(Rgba::BLACK);
        let hi = glowing.highlighted(Rgba::rgb(0.1, 0.5, 1.0), Rgba::rgb(0.0, 0.2, 0.4));
        assert_eq!(hi.emissive, Some(Rgba::rgb(0.0, 0.2, 0.4)));
    }

    #[test]
    fn ghost_keeps_color_and_forces_transparency() {
        let brick = Material::new(Rgba::rgb(0.6, 0.3, 0.2));
        let ghost = brick.ghosted(0.1);
        assert_eq!(ghost.base_color, brick.base_color);
        assert_eq!(ghost.opacity, 0.1);
        assert!(ghost.transparent);
        // source untouched
        assert_eq!(brick.opacity, 1.0);
        assert!(!brick.transparent);
    }

    #[test]
    fn category_palette_known_and_fallback() {
        let window = Material::for_category("IfcWindow");
        assert!(window.transparent);
        assert!(window.opacity < 1.0);

        let wall = Material::for_category("IfcWall");
        assert!(!wall.transparent);

        let unknown = Material::for_category("IfcFlux");
        assert_eq!(unknown.base_color, Rgba::rgb(0.68, 0.68, 0.68));
    }

    #[test]
    fn shared_handles_compare_by_pointer() {
        let mat = Material::default().into_ref();
        let same = Arc::clone(&mat);
        let equal_value = Material::default().into_ref();
        assert!(Arc::ptr_eq(&mat, &same));
        assert!(!Arc::ptr_eq(&mat, &equal_value));
        assert_eq!(*mat, *equal_value);
    }
}
