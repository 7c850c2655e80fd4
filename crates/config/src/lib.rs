//! Shared configuration for WorldSketch
//!
//! This crate provides the single source of truth for the tunable parameters
//! of the sketch-to-3D pipeline: the sky sphere radius, the terrain grid
//! resolution, the deformation falloff radius, and stroke capture settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default radius of the sphere that sky strokes are projected onto.
///
/// This should be as large as possible while staying inside the view
/// frustum; the camera's far clipping distance must be adjusted with it.
pub const DEFAULT_SKY_RADIUS: f32 = 225.0;

/// Default radius of the radial falloff applied when blending a silhouette
/// curve into the terrain, in world units
pub const DEFAULT_FALLOFF_RADIUS: f32 = 5.0;

/// Default half-width of the live stroke ribbon, in normalized device units
pub const DEFAULT_STROKE_WIDTH: f32 = 0.02;

/// Default minimum number of successfully projected curve points required
/// before a ground stroke is allowed to reshape the terrain
pub const DEFAULT_MIN_GROUND_POINTS: usize = 6;

/// Default world-space width of the terrain grid
pub const DEFAULT_TERRAIN_SIZE: f32 = 100.0;

/// Default number of grid cells along each terrain axis
pub const DEFAULT_TERRAIN_SEGMENTS: u32 = 200;

/// Configuration errors reported by [`SketchConfig::validate`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sky radius must be positive and finite, got {0}")]
    InvalidSkyRadius(f32),
    #[error("falloff radius must be positive and finite, got {0}")]
    InvalidFalloffRadius(f32),
    #[error("stroke width must be positive and finite, got {0}")]
    InvalidStrokeWidth(f32),
    #[error("minimum ground points must be at least 2, got {0}")]
    InvalidMinGroundPoints(usize),
    #[error("terrain size must be positive and finite, got {0}")]
    InvalidTerrainSize(f32),
    #[error("terrain segments must be at least 1")]
    InvalidTerrainSegments,
}

/// Tunable parameters for the sketch-to-3D pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SketchConfig {
    /// Radius of the sky sphere used for sky stroke projection
    pub sky_radius: f32,
    /// Radius of the radial falloff for terrain deformation, in world units
    pub falloff_radius: f32,
    /// Half-width of the live stroke ribbon, in normalized device units
    pub stroke_width: f32,
    /// Minimum projected curve points for a terrain edit to be accepted
    pub min_ground_points: usize,
    /// World-space width of the terrain grid
    pub terrain_size: f32,
    /// Number of grid cells along each terrain axis
    pub terrain_segments: u32,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            sky_radius: DEFAULT_SKY_RADIUS,
            falloff_radius: DEFAULT_FALLOFF_RADIUS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            min_ground_points: DEFAULT_MIN_GROUND_POINTS,
            terrain_size: DEFAULT_TERRAIN_SIZE,
            terrain_segments: DEFAULT_TERRAIN_SEGMENTS,
        }
    }
}

impl SketchConfig {
    /// Create a config with the given terrain dimensions and defaults for
    /// everything else
    pub fn with_terrain(size: f32, segments: u32) -> Self {
        Self {
            terrain_size: size,
            terrain_segments: segments,
            ..Self::default()
        }
    }

    /// Check that every parameter is in its valid range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sky_radius.is_finite() || self.sky_radius <= 0.0 {
            return Err(ConfigError::InvalidSkyRadius(self.sky_radius));
        }
        if !self.falloff_radius.is_finite() || self.falloff_radius <= 0.0 {
            return Err(ConfigError::InvalidFalloffRadius(self.falloff_radius));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ConfigError::InvalidStrokeWidth(self.stroke_width));
        }
        if self.min_ground_points < 2 {
            return Err(ConfigError::InvalidMinGroundPoints(self.min_ground_points));
        }
        if !self.terrain_size.is_finite() || self.terrain_size <= 0.0 {
            return Err(ConfigError::InvalidTerrainSize(self.terrain_size));
        }
        if self.terrain_segments == 0 {
            return Err(ConfigError::InvalidTerrainSegments);
        }
        Ok(())
    }
}
