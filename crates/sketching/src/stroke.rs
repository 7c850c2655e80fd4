//! 2D stroke capture with a live triangulated ribbon.
//!
//! While the user drags, screen points in normalized device coordinates are
//! accumulated into an ordered polyline. A ribbon of two triangles per
//! segment is rebuilt incrementally so the in-progress stroke can be drawn
//! on screen; the same ribbon index list is later reused when the stroke is
//! projected into 3D.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A stroke being drawn on screen.
///
/// All points are in normalized device coordinates (-1,-1) to (1,1). The
/// stroke is mutable while the drag is in flight and is consumed at commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke2D {
    /// Ordered mouse samples
    path: Vec<Vec2>,
    /// Ribbon vertices, two per path sample
    vertices: Vec<Vec2>,
    /// Ribbon indices, two triangles per segment
    indices: Vec<u32>,
    /// Ribbon half-width in normalized device units
    width: f32,
    /// Crayon color, carried onto meshes built from this stroke
    color: [f32; 4],
}

impl Stroke2D {
    /// Create an empty stroke with the given ribbon half-width and color
    pub fn new(width: f32, color: [f32; 4]) -> Self {
        Self {
            path: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            width: width.max(f32::EPSILON),
            color,
        }
    }

    /// Append a screen point and extend the ribbon.
    ///
    /// A point equal to the previous sample is kept in the path but adds no
    /// ribbon geometry, so degenerate quads are never produced.
    pub fn add_point(&mut self, point: Vec2) {
        let prev = self.path.last().copied();
        self.path.push(point);

        let Some(prev) = prev else {
            return;
        };

        let delta = point - prev;
        if delta.length_squared() < f32::EPSILON {
            debug!("duplicate stroke sample at {:?}, ribbon unchanged", point);
            return;
        }

        // Offset perpendicular to the segment by the half-width
        let dir = delta.normalize();
        let offset = Vec2::new(-dir.y, dir.x) * self.width;

        // The first segment also emits the pair for the stroke start
        if self.vertices.is_empty() {
            self.vertices.push(prev + offset);
            self.vertices.push(prev - offset);
        }

        let base = self.vertices.len() as u32;
        self.vertices.push(point + offset);
        self.vertices.push(point - offset);

        self.indices
            .extend_from_slice(&[base - 2, base - 1, base, base, base - 1, base + 1]);
    }

    /// Ordered mouse samples in normalized device coordinates
    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    /// Ribbon vertices for live feedback and 3D projection
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Ribbon triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// First screen point of the drag, if any
    pub fn start(&self) -> Option<Vec2> {
        self.path.first().copied()
    }

    /// Most recent screen point of the drag, if any
    pub fn end(&self) -> Option<Vec2> {
        self.path.last().copied()
    }

    /// Number of path samples
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Whether any point has been recorded
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Ribbon half-width in normalized device units
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Crayon color of this stroke
    pub fn color(&self) -> [f32; 4] {
        self.color
    }
}
