//! Standalone triangle meshes built from projected strokes.
//!
//! A [`SketchMesh`] is a flat-colored, double-sided mesh handed to the
//! render collaborator as plain vertex/index arrays. No normals are stored;
//! sketch drawings are rendered unlit.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A mesh created from a projected stroke
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SketchMesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    color: [f32; 4],
}

impl SketchMesh {
    /// Build a mesh from per-input projection results and the ribbon index
    /// list of the original stroke.
    ///
    /// `samples` has one slot per ribbon vertex; `None` marks a vertex whose
    /// pick ray missed the target. Surviving vertices are compacted and any
    /// triangle that references a dropped vertex is discarded, which keeps
    /// the reused index list consistent with the shorter vertex list.
    pub fn from_projected_ribbon(
        samples: &[Option<Vec3>],
        indices: &[u32],
        color: [f32; 4],
    ) -> Self {
        // Compact the vertex list, remembering where each sample went
        let mut remap: Vec<Option<u32>> = Vec::with_capacity(samples.len());
        let mut positions = Vec::with_capacity(samples.len());
        for sample in samples {
            match sample {
                Some(world) => {
                    remap.push(Some(positions.len() as u32));
                    positions.push(*world);
                }
                None => remap.push(None),
            }
        }

        let mut kept_indices = Vec::with_capacity(indices.len());
        let mut dropped_triangles = 0usize;
        for tri in indices.chunks_exact(3) {
            match (
                remap.get(tri[0] as usize).copied().flatten(),
                remap.get(tri[1] as usize).copied().flatten(),
                remap.get(tri[2] as usize).copied().flatten(),
            ) {
                (Some(a), Some(b), Some(c)) => kept_indices.extend_from_slice(&[a, b, c]),
                _ => dropped_triangles += 1,
            }
        }

        if dropped_triangles > 0 {
            debug!(
                "mesh build dropped {dropped_triangles} triangles referencing missed samples"
            );
        }

        Self {
            positions,
            indices: kept_indices,
            color,
        }
    }

    /// Vertex positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle indices, three per triangle
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Flat color of the drawing
    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh holds no renderable geometry
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Vertex positions as raw bytes for GPU upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Triangle indices as raw bytes for GPU upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
