// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Style descriptors for output collections
//!
//! Nothing is rendered here. A collection carries a [`LayerStyle`] that a
//! host turns into its own renderer: plain, or one rule per semantic surface
//! type plus a fallback rule.

use crate::feature::SEMANTIC_SURFACE_FIELD;
use cityjson_lite_model::LoadOptions;
use serde::{Deserialize, Serialize};

/// Filter of the rule that catches every other feature
pub const ELSE_FILTER: &str = "ELSE";

/// 8-bit RGB colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Phong material colours of one surface type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    pub diffuse: Rgb,
    pub ambient: Option<Rgb>,
    pub specular: Option<Rgb>,
}

impl SurfaceMaterial {
    /// Material with diffuse and ambient colours
    pub const fn new(diffuse: Rgb, ambient: Rgb) -> Self {
        Self {
            diffuse,
            ambient: Some(ambient),
            specular: None,
        }
    }

    /// Material with only a diffuse colour
    pub const fn diffuse(diffuse: Rgb) -> Self {
        Self {
            diffuse,
            ambient: None,
            specular: None,
        }
    }
}

/// Colour table for semantic surface types
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemanticColors {
    /// Materials per surface type, in rule order
    pub surfaces: Vec<(String, SurfaceMaterial)>,
    /// Material of surfaces not in the table
    pub fallback: SurfaceMaterial,
}

impl Default for SemanticColors {
    fn default() -> Self {
        let table = [
            ("RoofSurface", Rgb(255, 0, 0), Rgb(255, 0, 0)),
            ("WallSurface", Rgb(200, 200, 200), Rgb(255, 255, 255)),
            ("GroundSurface", Rgb(0, 0, 0), Rgb(0, 0, 0)),
            ("Door", Rgb(255, 200, 0), Rgb(255, 200, 0)),
            ("Window", Rgb(0, 100, 255), Rgb(0, 100, 255)),
        ];

        Self {
            surfaces: table
                .iter()
                .map(|(name, diffuse, ambient)| (name.to_string(), SurfaceMaterial::new(*diffuse, *ambient)))
                .collect(),
            fallback: SurfaceMaterial::diffuse(Rgb(255, 0, 255)),
        }
    }
}

impl SemanticColors {
    /// Material of a surface type
    pub fn get(&self, surface_type: &str) -> Option<&SurfaceMaterial> {
        self.surfaces
            .iter()
            .find(|(name, _)| name == surface_type)
            .map(|(_, material)| material)
    }

    /// Set (or replace) the material of a surface type
    pub fn set(&mut self, surface_type: impl Into<String>, material: SurfaceMaterial) {
        let surface_type = surface_type.into();
        match self.surfaces.iter_mut().find(|(name, _)| *name == surface_type) {
            Some((_, existing)) => *existing = material,
            None => self.surfaces.push((surface_type, material)),
        }
    }

    /// Number of surface types in the table
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

/// One rule of a rule-based style
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Filter expression on the feature fields
    pub filter: String,
    pub material: SurfaceMaterial,
}

/// Style attached to an output collection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "colors", rename_all = "snake_case")]
pub enum LayerStyle {
    /// Host default
    #[default]
    Plain,
    /// One rule per semantic surface type
    SemanticSurfaces(SemanticColors),
}

impl LayerStyle {
    /// Style requested by the options
    ///
    /// Semantic styling needs features split by semantic surface.
    pub fn for_options(options: &LoadOptions, colors: &SemanticColors) -> Self {
        if options.load_semantic_surfaces && options.style_semantic_surfaces {
            LayerStyle::SemanticSurfaces(colors.clone())
        } else {
            LayerStyle::Plain
        }
    }

    /// Rules of a rule-based style, the fallback rule last
    pub fn rules(&self) -> Vec<StyleRule> {
        let LayerStyle::SemanticSurfaces(colors) = self else {
            return Vec::new();
        };

        colors
            .surfaces
            .iter()
            .map(|(surface, material)| StyleRule {
                filter: surface_filter(surface),
                material: *material,
            })
            .chain(std::iter::once(StyleRule {
                filter: ELSE_FILTER.to_string(),
                material: colors.fallback,
            }))
            .collect()
    }
}

/// Filter expression selecting one surface type
pub fn surface_filter(surface_type: &str) -> String {
    format!("\"{}\" = '{}'", SEMANTIC_SURFACE_FIELD, surface_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_colors() {
        let colors = SemanticColors::default();
        assert_eq!(colors.len(), 5);

        let wall = colors.get("WallSurface").unwrap();
        assert_eq!(wall.diffuse, Rgb(200, 200, 200));
        assert_eq!(wall.ambient, Some(Rgb(255, 255, 255)));
        assert_eq!(wall.specular, None);
        assert_eq!(colors.get("Door").unwrap().diffuse, Rgb(255, 200, 0));
        assert!(colors.get("TrafficArea").is_none());
    }

    #[test]
    fn test_rules() {
        let style = LayerStyle::SemanticSurfaces(SemanticColors::default());
        let rules = style.rules();

        assert_eq!(rules.len(), 6);
        assert_eq!(rules[0].filter, "\"semantic_surface\" = 'RoofSurface'");
        assert_eq!(rules[5].filter, "ELSE");
        assert_eq!(rules[5].material.diffuse, Rgb(255, 0, 255));
        assert!(LayerStyle::Plain.rules().is_empty());
    }

    #[test]
    fn test_injected_colors() {
        let mut colors = SemanticColors::default();
        colors.set("RoofSurface", SurfaceMaterial::diffuse(Rgb(10, 20, 30)));
        colors.set("TrafficArea", SurfaceMaterial::diffuse(Rgb(50, 50, 50)));

        let style = LayerStyle::SemanticSurfaces(colors);
        let rules = style.rules();
        assert_eq!(rules.len(), 7);
        assert_eq!(rules[0].material.diffuse, Rgb(10, 20, 30));
        assert_eq!(rules[5].filter, surface_filter("TrafficArea"));
    }

    #[test]
    fn test_style_for_options() {
        let colors = SemanticColors::default();
        let styled = LoadOptions::new()
            .with_semantic_surfaces(true)
            .with_semantic_styling(true);
        assert!(matches!(
            LayerStyle::for_options(&styled, &colors),
            LayerStyle::SemanticSurfaces(_)
        ));

        let unsplit = LoadOptions::new().with_semantic_styling(true);
        assert_eq!(LayerStyle::for_options(&unsplit, &colors), LayerStyle::Plain);
    }
}
