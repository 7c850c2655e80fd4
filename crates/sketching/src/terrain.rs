//! Height-field terrain and the silhouette-curve deformation pass.
//!
//! The terrain is a regular grid of (segments+1)^2 vertices. Only vertex Y
//! is ever mutated after construction; X/Z and the triangle index list are
//! fixed for the lifetime of the terrain. A committed ground stroke is
//! projected onto a vertical sketch plane to form a silhouette curve, and
//! the curve's height profile is blended into the grid with radial falloff.

use glam::Vec3;
use thiserror::Error;
use tracing::{debug, info};

use worldsketch_config::{DEFAULT_FALLOFF_RADIUS, DEFAULT_MIN_GROUND_POINTS};

use crate::camera::SketchCamera;
use crate::projection::{ProjectionTarget, project_points};
use crate::raycast::{EPSILON, Plane3, Ray, ray_triangle_intersection};
use crate::stroke::Stroke2D;

/// Height of the probe ray origin used by [`Terrain::height_at`]
const HEIGHT_PROBE_Y: f32 = 500.0;

/// Errors from terrain construction
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("terrain size must be positive and finite, got {0}")]
    InvalidSize(f32),
    #[error("terrain must have at least one segment")]
    InvalidSegments,
}

/// Tunables for a single reshape pass
#[derive(Debug, Clone, Copy)]
pub struct ReshapeOptions {
    /// Radius of the radial falloff, in world units
    pub falloff_radius: f32,
    /// Minimum projected silhouette points for the edit to be accepted
    pub min_curve_points: usize,
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self {
            falloff_radius: DEFAULT_FALLOFF_RADIUS,
            min_curve_points: DEFAULT_MIN_GROUND_POINTS,
        }
    }
}

/// Result of a reshape pass.
///
/// The grid is only mutated on the `Applied` path; every other variant
/// leaves the height field untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReshapeOutcome {
    /// The height field was updated and normals were recomputed
    Applied {
        /// Number of silhouette points the stroke projected to
        curve_points: usize,
    },
    /// Drag start and end coincide in XZ; no sketch plane can be derived
    ZeroLengthDrag,
    /// Too few stroke samples projected onto the sketch plane
    CurveTooShort { points: usize, required: usize },
}

impl ReshapeOutcome {
    /// Whether the pass mutated the terrain
    pub fn applied(&self) -> bool {
        matches!(self, ReshapeOutcome::Applied { .. })
    }
}

/// A regular-grid height field with CPU-resident geometry
#[derive(Debug, Clone)]
pub struct Terrain {
    size: f32,
    segments: u32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Terrain {
    /// Create a flat grid of `size` x `size` world units with `segments`
    /// cells along each axis
    pub fn new(size: f32, segments: u32) -> Result<Self, TerrainError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(TerrainError::InvalidSize(size));
        }
        if segments == 0 {
            return Err(TerrainError::InvalidSegments);
        }

        let rows = (segments + 1) as usize;
        let increment = size / segments as f32;
        let half = size / 2.0;

        let mut positions = Vec::with_capacity(rows * rows);
        let mut normals = Vec::with_capacity(rows * rows);
        for i in 0..rows {
            let x = -half + i as f32 * increment;
            for j in 0..rows {
                let z = -half + j as f32 * increment;
                positions.push(Vec3::new(x, 0.0, z));
                normals.push(Vec3::Y);
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
        for i in 0..segments {
            for j in 0..segments {
                // First triangle
                indices.push(i * stride + j);
                indices.push(i * stride + (j + 1));
                indices.push((i + 1) * stride + j);
                // Second triangle
                indices.push((i + 1) * stride + j);
                indices.push(i * stride + (j + 1));
                indices.push((i + 1) * stride + (j + 1));
            }
        }

        Ok(Self {
            size,
            segments,
            positions,
            normals,
            indices,
        })
    }

    /// World-space width of the grid
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Number of cells along each axis
    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Vertex positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex normals
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Triangle indices, three per triangle
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex positions as raw bytes for GPU upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Vertex normals as raw bytes for GPU upload
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Triangle indices as raw bytes for GPU upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Reshape the height field from a committed ground stroke.
    ///
    /// `start` and `end` are the ground points under the drag's first and
    /// last screen positions. The pass derives a vertical sketch plane from
    /// them, re-projects the live stroke onto it to build the silhouette
    /// curve, and blends the curve's height profile into every vertex within
    /// the falloff radius. The pass either fully applies or fully no-ops.
    ///
    /// Overlapping strokes compound rather than converge: the blend adds the
    /// silhouette's height delta on top of the already-modified grid, which
    /// is the intended incremental-sculpting behavior.
    pub fn reshape(
        &mut self,
        stroke: &Stroke2D,
        start: Vec3,
        end: Vec3,
        camera: &SketchCamera,
        opts: &ReshapeOptions,
    ) -> ReshapeOutcome {
        // A zero-length drag has no direction to build the plane from
        let mut direction = end - start;
        direction.y = 0.0;
        if direction.length_squared() < EPSILON {
            info!("zero-length ground drag, terrain unchanged");
            return ReshapeOutcome::ZeroLengthDrag;
        }
        let direction = direction.normalize();

        // Vertical sketch plane through the drag start
        let normal = direction.cross(Vec3::Y).normalize();
        let plane = Plane3::new(start, normal);

        // Re-project the live stroke onto the plane to form the silhouette
        let curve = project_points(stroke.path(), camera, &ProjectionTarget::Plane(plane));
        let required = opts.min_curve_points.max(2);
        if curve.len() < required {
            info!(
                "silhouette too short to reshape terrain: {} of {} required points",
                curve.len(),
                required
            );
            return ReshapeOutcome::CurveTooShort {
                points: curve.len(),
                required,
            };
        }

        // Plane-space basis for evaluating the height profile
        let plane_x = Vec3::Y.cross(normal).normalize();
        let origin = curve.points()[0];

        let radius = opts.falloff_radius;
        let mut touched = 0usize;
        for k in 0..self.positions.len() {
            let vertex = self.positions[k];

            // Perpendicular foot point of the vertex on the sketch plane;
            // the plane normal has zero Y, so the foot keeps the vertex's Y
            let foot = plane.project_point(vertex);

            let h = silhouette_height(foot, curve.points(), plane_x, origin);
            if h == 0.0 {
                continue;
            }

            let dist = vertex.distance(foot);
            let ratio = dist / radius;
            let weight = (1.0 - ratio * ratio).max(0.0);
            if weight == 0.0 {
                continue;
            }

            self.positions[k].y = (1.0 - weight) * vertex.y + weight * (vertex.y + h);
            touched += 1;
        }

        self.recompute_normals();
        debug!(
            "reshaped terrain from {} silhouette points ({} samples dropped), {touched} vertices moved",
            curve.len(),
            curve.dropped()
        );

        ReshapeOutcome::Applied {
            curve_points: curve.len(),
        }
    }

    /// Recompute all vertex normals from scratch.
    ///
    /// Each triangle's unit face normal is accumulated into its three
    /// vertices, then each vertex normal is divided by its incident triangle
    /// count. This is a uniform average, not area-weighted.
    fn recompute_normals(&mut self) {
        for n in &mut self.normals {
            *n = Vec3::ZERO;
        }
        let mut counts = vec![0u32; self.normals.len()];

        for tri in self.indices.chunks_exact(3) {
            let v0 = self.positions[tri[0] as usize];
            let v1 = self.positions[tri[1] as usize];
            let v2 = self.positions[tri[2] as usize];

            let face = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            for &i in tri {
                self.normals[i as usize] += face;
                counts[i as usize] += 1;
            }
        }

        for (normal, &count) in self.normals.iter_mut().zip(counts.iter()) {
            if count > 0 {
                *normal /= count as f32;
            }
        }
    }

    /// Grid cell under the world XZ position, or `None` outside the grid
    fn cell_at(&self, x: f32, z: f32) -> Option<(u32, u32)> {
        let i = ((x / self.size + 0.5) * self.segments as f32).floor();
        let j = ((z / self.size + 0.5) * self.segments as f32).floor();
        if i < 0.0 || j < 0.0 || i >= self.segments as f32 || j >= self.segments as f32 {
            return None;
        }
        Some((i as u32, j as u32))
    }

    /// Vertex positions of the grid triangle directly under the world XZ
    /// position.
    ///
    /// Each cell holds two triangles; the one whose right-angle corner is
    /// nearest to the query point is returned. Returns `None` outside the
    /// grid.
    pub fn triangle_at(&self, x: f32, z: f32) -> Option<[Vec3; 3]> {
        let (first, second) = self.cell_triangles(x, z)?;

        let position = Vec3::new(x, 0.0, z);
        let corner1 = Vec3::new(first[0].x, 0.0, first[0].z);
        let corner2 = Vec3::new(second[2].x, 0.0, second[2].z);
        if position.distance(corner1) <= position.distance(corner2) {
            Some(first)
        } else {
            Some(second)
        }
    }

    /// Terrain height under the world XZ position, via a downward probe ray
    /// against the cell's triangle pair. `None` outside the grid or if the
    /// probe misses (a vertex pulled above the probe origin).
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let (first, second) = self.cell_triangles(x, z)?;

        let ray = Ray::new(Vec3::new(x, HEIGHT_PROBE_Y, z), Vec3::NEG_Y);
        for tri in [first, second] {
            if let Some(hit) = ray_triangle_intersection(ray.origin, ray.dir, tri[0], tri[1], tri[2])
            {
                return Some(ray.at(hit.t).y);
            }
        }
        None
    }

    fn cell_triangles(&self, x: f32, z: f32) -> Option<([Vec3; 3], [Vec3; 3])> {
        let (i, j) = self.cell_at(x, z)?;
        let stride = self.segments + 1;

        let first = [
            self.positions[(i * stride + j) as usize],
            self.positions[(i * stride + j + 1) as usize],
            self.positions[((i + 1) * stride + j) as usize],
        ];
        let second = [
            self.positions[((i + 1) * stride + j) as usize],
            self.positions[(i * stride + j + 1) as usize],
            self.positions[((i + 1) * stride + j + 1) as usize],
        ];
        Some((first, second))
    }
}

/// Height of the silhouette curve above a foot point in the sketch plane.
///
/// Finds the first curve segment whose endpoints bracket the foot point's
/// plane-space x, interpolates that segment's Y at the target x, and returns
/// the delta to the foot point's Y. Returns 0 when no segment brackets the
/// target, leaving the vertex untouched.
fn silhouette_height(foot: Vec3, curve: &[Vec3], plane_x: Vec3, origin: Vec3) -> f32 {
    let x_target = (foot - origin).dot(plane_x);

    for pair in curve.windows(2) {
        let x_start = (pair[0] - origin).dot(plane_x);
        let x_end = (pair[1] - origin).dot(plane_x);

        if x_start <= x_target && x_target <= x_end {
            let span = x_end - x_start;
            if span.abs() < f32::EPSILON {
                return pair[0].y - foot.y;
            }
            let alpha = (x_target - x_start) / span;
            let y_curve = pair[0].y + alpha * (pair[1].y - pair[0].y);
            return y_curve - foot.y;
        } else if x_end <= x_target && x_target <= x_start {
            let span = x_start - x_end;
            if span.abs() < f32::EPSILON {
                return pair[1].y - foot.y;
            }
            let alpha = (x_target - x_end) / span;
            let y_curve = pair[1].y + alpha * (pair[0].y - pair[1].y);
            return y_curve - foot.y;
        }
    }

    // The foot point does not lie under the curve
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    /// Camera on the +X axis at ground level, looking at the origin. Pick
    /// rays through the NDC of a point on the x=0 plane hit the plane at
    /// exactly that point.
    fn side_camera() -> SketchCamera {
        SketchCamera::look_at(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::ZERO,
            60f32.to_radians(),
            1.0,
            0.1,
            1000.0,
        )
    }

    /// Build a stroke whose silhouette on the x=0 plane passes through the
    /// given world points, by projecting them back to screen space.
    fn stroke_through(camera: &SketchCamera, targets: &[Vec3]) -> Stroke2D {
        let mut stroke = Stroke2D::new(0.02, WHITE);
        for &world in targets {
            let ndc = camera.world_to_ndc(world);
            stroke.add_point(Vec2::new(ndc.x, ndc.y));
        }
        stroke
    }

    /// Seven-point tent silhouette over z in [-2, 2] peaking at +3
    fn tent_targets() -> Vec<Vec3> {
        (0..7)
            .map(|i| {
                let z = 2.0 - i as f32 * (4.0 / 6.0);
                let y = 3.0 * (1.0 - z.abs() / 2.0);
                Vec3::new(0.0, y, z)
            })
            .collect()
    }

    #[test]
    fn test_grid_construction() {
        let terrain = Terrain::new(8.0, 4).unwrap();
        assert_eq!(terrain.vertex_count(), 25);
        assert_eq!(terrain.triangle_count(), 32);

        // Corners span the full size, all flat, all normals up
        assert_eq!(terrain.positions()[0], Vec3::new(-4.0, 0.0, -4.0));
        assert_eq!(terrain.positions()[24], Vec3::new(4.0, 0.0, 4.0));
        for v in terrain.positions() {
            assert_eq!(v.y, 0.0);
        }
        for n in terrain.normals() {
            assert_eq!(*n, Vec3::Y);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            Terrain::new(0.0, 4),
            Err(TerrainError::InvalidSize(_))
        ));
        assert!(matches!(
            Terrain::new(8.0, 0),
            Err(TerrainError::InvalidSegments)
        ));
    }

    #[test]
    fn test_zero_length_drag_is_noop() {
        let mut terrain = Terrain::new(8.0, 4).unwrap();
        let camera = side_camera();
        let stroke = stroke_through(&camera, &tent_targets());
        let before = terrain.position_bytes().to_vec();

        let outcome = terrain.reshape(
            &stroke,
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, 2.0),
            &camera,
            &ReshapeOptions::default(),
        );

        assert_eq!(outcome, ReshapeOutcome::ZeroLengthDrag);
        assert_eq!(terrain.position_bytes(), &before[..]);
    }

    #[test]
    fn test_short_curve_is_noop() {
        let mut terrain = Terrain::new(8.0, 4).unwrap();
        let camera = side_camera();
        let stroke = stroke_through(&camera, &tent_targets()[..3]);
        let before = terrain.position_bytes().to_vec();

        let outcome = terrain.reshape(
            &stroke,
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, -2.0),
            &camera,
            &ReshapeOptions::default(),
        );

        assert_eq!(
            outcome,
            ReshapeOutcome::CurveTooShort {
                points: 3,
                required: 6
            }
        );
        assert_eq!(terrain.position_bytes(), &before[..]);
    }

    #[test]
    fn test_tent_silhouette_blends_with_falloff() {
        // 4x4-segment grid of size 8; stroke start (0,0,2), end (0,0,-2)
        // with a +3 silhouette peak at the midpoint and R=5
        let mut terrain = Terrain::new(8.0, 4).unwrap();
        let camera = side_camera();
        let stroke = stroke_through(&camera, &tent_targets());

        let outcome = terrain.reshape(
            &stroke,
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, -2.0),
            &camera,
            &ReshapeOptions {
                falloff_radius: 5.0,
                min_curve_points: 6,
            },
        );
        assert!(outcome.applied());

        let expect = |x: f32| {
            let w = (1.0 - (x / 5.0) * (x / 5.0)).max(0.0);
            w * 3.0
        };

        // The z=0 row lies under the peak; height follows the falloff in x
        for &x in &[0.0f32, 2.0, 4.0, -2.0, -4.0] {
            let y = terrain
                .positions()
                .iter()
                .find(|v| v.x == x && v.z == 0.0)
                .unwrap()
                .y;
            assert!(
                (y - expect(x.abs())).abs() < 1e-3,
                "vertex at x={x} has y={y}, expected {}",
                expect(x.abs())
            );
        }

        // Rows off the silhouette's footprint are untouched (h == 0 there)
        for v in terrain.positions().iter().filter(|v| v.z.abs() >= 2.0) {
            assert!(v.y.abs() < 1e-4, "vertex at ({}, {}) moved", v.x, v.z);
        }
    }

    #[test]
    fn test_overlapping_strokes_compound() {
        let mut terrain = Terrain::new(8.0, 4).unwrap();
        let camera = side_camera();
        let stroke = stroke_through(&camera, &tent_targets());
        let start = Vec3::new(0.0, 0.0, 2.0);
        let end = Vec3::new(0.0, 0.0, -2.0);
        let opts = ReshapeOptions::default();

        terrain.reshape(&stroke, start, end, &camera, &opts);
        let first_pass = terrain
            .positions()
            .iter()
            .find(|v| v.x == 2.0 && v.z == 0.0)
            .unwrap()
            .y;

        terrain.reshape(&stroke, start, end, &camera, &opts);
        let second_pass = terrain
            .positions()
            .iter()
            .find(|v| v.x == 2.0 && v.z == 0.0)
            .unwrap()
            .y;

        // The blend adds onto the already-modified height
        assert!(second_pass > first_pass);
    }

    #[test]
    fn test_flat_silhouette_preserves_heights_and_normals() {
        let mut terrain = Terrain::new(8.0, 4).unwrap();
        let camera = side_camera();

        // Silhouette at ground level everywhere: zero height delta
        let targets: Vec<Vec3> = (0..7)
            .map(|i| Vec3::new(0.0, 0.0, 2.0 - i as f32 * (4.0 / 6.0)))
            .collect();
        let stroke = stroke_through(&camera, &targets);

        let outcome = terrain.reshape(
            &stroke,
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, -2.0),
            &camera,
            &ReshapeOptions::default(),
        );
        assert!(outcome.applied());

        for v in terrain.positions() {
            assert!(v.y.abs() < 1e-4);
        }
        // Flat grid normals recompute to exactly +Y, unit length
        for n in terrain.normals() {
            assert!((*n - Vec3::Y).length() < 1e-6);
            assert!((n.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_triangle_at() {
        let terrain = Terrain::new(8.0, 4).unwrap();

        // Near the lower corner of the first cell
        let tri = terrain.triangle_at(-3.9, -3.9).unwrap();
        assert_eq!(tri[0], Vec3::new(-4.0, 0.0, -4.0));

        // Outside the grid
        assert!(terrain.triangle_at(10.0, 0.0).is_none());
    }

    #[test]
    fn test_height_at_tracks_deformation() {
        let mut terrain = Terrain::new(8.0, 4).unwrap();
        assert!(terrain.height_at(1.0, 1.0).unwrap().abs() < 1e-4);

        let camera = side_camera();
        let stroke = stroke_through(&camera, &tent_targets());
        terrain.reshape(
            &stroke,
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, -2.0),
            &camera,
            &ReshapeOptions::default(),
        );

        // The vertex at the peak was raised to +3
        let h = terrain.height_at(0.0, 0.0).unwrap();
        assert!((h - 3.0).abs() < 1e-3);
    }
}
