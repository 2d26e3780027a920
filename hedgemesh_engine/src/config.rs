// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::mesh::halfedge::subdivision::SubdivisionScheme;

/// The color given to vertices when the input does not specify one.
pub const DEFAULT_COLOR: Vec3 = Vec3::new(0.5, 0.5, 0.5);

/// Profile points closer than this to the rotation axis collapse into a single
/// vertex when building a surface of revolution.
pub const AXIS_EPSILON: f32 = 1e-5;

/// Constants consumed by the rendering collaborator when it draws debug
/// overlays on top of a mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Overlays are drawn twice, once with positions scaled by this factor and
    /// once by its inverse, so they are visible from both sides of the surface.
    pub draw_offset: f32,
    pub line_width: f32,
    /// RGB color for traversal results.
    pub traversal_color: [f32; 3],
    /// RGB color for boundary cycles.
    pub boundary_color: [f32; 3],
    /// RGB color for the queried vertex or face.
    pub highlight_color: [f32; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            draw_offset: 1.001,
            line_width: 4.0,
            traversal_color: [0.0, 1.0, 1.0],
            boundary_color: [0.0, 1.0, 0.5],
            highlight_color: [1.0, 0.0, 0.0],
        }
    }
}

/// Controls the normalization steps applied when a polygon mesh is imported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Flip face windings so every face agrees with its neighbours.
    pub consistently_orient: bool,
    /// Translate the mesh so the mean of its vertices sits at the origin.
    pub center_at_centroid: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            consistently_orient: true,
            center_at_centroid: true,
        }
    }
}

/// Default parameter values for the operators, as shown by a parameter panel
/// or used by the command line when no explicit value is given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorDefaults {
    /// In [-1, 1]. Positive values inflate.
    pub inflation_factor: f32,
    /// In (0, 1).
    pub truncation_factor: f32,
    /// Number of angular steps for surfaces of revolution. At least 3.
    pub revolution_angles: u32,
    pub smoothing_iterations: i32,
    pub subdivision_scheme: SubdivisionScheme,
}

impl Default for OperatorDefaults {
    fn default() -> Self {
        Self {
            inflation_factor: 0.1,
            truncation_factor: 0.5,
            revolution_angles: 20,
            smoothing_iterations: 1,
            subdivision_scheme: SubdivisionScheme::Loop,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub display: DisplayConfig,
    pub import: ImportOptions,
    pub operators: OperatorDefaults,
}

impl EngineConfig {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).context("Could not parse engine configuration")
    }

    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Could not serialize engine configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = std::io::BufReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("Could not open config file {}", path.display()))?,
        );
        let config: EngineConfig = ron::de::from_reader(reader)
            .with_context(|| format!("Could not parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_ron_string()?)
            .with_context(|| format!("Could not write config file {}", path.display()))?;
        Ok(())
    }
}
