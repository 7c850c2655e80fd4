//! Screen-to-world projection of 2D point sequences.
//!
//! Every stroke vertex gets a camera-origin pick ray which is intersected
//! with a target surface: a plane, the origin-centered sky sphere, or a
//! CPU-resident triangle mesh. Misses are dropped silently, so the output
//! curve may be shorter than the input; the drop count is surfaced as a
//! diagnostic only.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::SketchCamera;
use crate::raycast::{
    Plane3, ray_plane_intersection, ray_sphere_intersection, raycast_triangles,
};

/// Surface a 2D point sequence is projected onto
#[derive(Debug, Clone, Copy)]
pub enum ProjectionTarget<'a> {
    /// An infinite plane in point-normal form
    Plane(Plane3),
    /// A sphere of the given radius centered at the world origin
    Sphere { radius: f32 },
    /// A triangle mesh given as flat vertex/index arrays
    Mesh {
        positions: &'a [Vec3],
        indices: &'a [u32],
    },
}

/// An ordered 3D point sequence produced by projecting a stroke.
///
/// Order matches the input stroke; points whose rays missed the target are
/// absent, so the curve may be shorter than the stroke that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedCurve {
    points: Vec<Vec3>,
    dropped: usize,
}

impl ProjectedCurve {
    /// Projected points in stroke order
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of projected points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point projected successfully
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of input points whose rays missed the target
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Consume the curve, yielding its points
    pub fn into_points(self) -> Vec<Vec3> {
        self.points
    }
}

/// Project a single NDC point onto the target, if its pick ray hits
pub fn project_point(
    camera: &SketchCamera,
    ndc: Vec2,
    target: &ProjectionTarget<'_>,
) -> Option<Vec3> {
    let ray = camera.pick_ray(ndc);
    match target {
        ProjectionTarget::Plane(plane) => ray_plane_intersection(&ray, plane),
        ProjectionTarget::Sphere { radius } => ray_sphere_intersection(&ray, *radius),
        ProjectionTarget::Mesh { positions, indices } => {
            raycast_triangles(&ray, positions, indices)
        }
    }
}

/// Project an ordered 2D point sequence onto the target, compacting misses.
///
/// A miss silently shortens the output curve; no interpolated substitute is
/// inserted. Order is preserved.
pub fn project_points(
    points: &[Vec2],
    camera: &SketchCamera,
    target: &ProjectionTarget<'_>,
) -> ProjectedCurve {
    let mut projected = Vec::with_capacity(points.len());
    let mut dropped = 0usize;

    for &ndc in points {
        match project_point(camera, ndc, target) {
            Some(world) => projected.push(world),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            "projection dropped {dropped} of {} samples",
            points.len()
        );
    }

    ProjectedCurve {
        points: projected,
        dropped,
    }
}

/// Project an ordered 2D point sequence onto the target, keeping one output
/// slot per input point.
///
/// Unlike [`project_points`], misses stay in place as `None`, which lets a
/// caller reuse an index list built over the input points and discard the
/// triangles that lost a vertex.
pub fn project_points_sparse(
    points: &[Vec2],
    camera: &SketchCamera,
    target: &ProjectionTarget<'_>,
) -> Vec<Option<Vec3>> {
    points
        .iter()
        .map(|&ndc| project_point(camera, ndc, target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_above_origin() -> SketchCamera {
        SketchCamera::look_at(
            Vec3::new(0.0, 2.0, 5.0),
            Vec3::ZERO,
            60f32.to_radians(),
            1.0,
            0.1,
            1000.0,
        )
    }

    #[test]
    fn test_sphere_projection_never_drops() {
        // A sky sphere big enough that every pick ray from inside hits it
        let camera = camera_above_origin();
        let points: Vec<Vec2> = (0..10)
            .map(|i| Vec2::new(-0.9 + 0.2 * i as f32, 0.5))
            .collect();

        let curve = project_points(&points, &camera, &ProjectionTarget::Sphere { radius: 225.0 });

        assert_eq!(curve.len(), points.len());
        assert_eq!(curve.dropped(), 0);
        for p in curve.points() {
            assert!((p.length() - 225.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_mesh_projection_drops_misses() {
        let camera = camera_above_origin();

        // One small triangle near the origin; only the center ray can hit
        let positions = vec![
            Vec3::new(-0.6, 0.0, -0.6),
            Vec3::new(0.6, 0.0, -0.6),
            Vec3::new(0.0, 0.0, 0.6),
        ];
        let indices = vec![0, 1, 2];
        let target = ProjectionTarget::Mesh {
            positions: &positions,
            indices: &indices,
        };

        // Aim one point at the triangle and one well above the horizon
        let on = camera.world_to_ndc(Vec3::new(0.0, 0.0, -0.2));
        let points = vec![Vec2::new(on.x, on.y), Vec2::new(0.0, 0.9)];

        let curve = project_points(&points, &camera, &target);
        assert_eq!(curve.len(), 1);
        assert_eq!(curve.dropped(), 1);
    }

    #[test]
    fn test_sparse_projection_keeps_slots() {
        let camera = camera_above_origin();
        let positions = vec![
            Vec3::new(-0.6, 0.0, -0.6),
            Vec3::new(0.6, 0.0, -0.6),
            Vec3::new(0.0, 0.0, 0.6),
        ];
        let indices = vec![0, 1, 2];
        let target = ProjectionTarget::Mesh {
            positions: &positions,
            indices: &indices,
        };

        let on = camera.world_to_ndc(Vec3::new(0.0, 0.0, -0.2));
        let points = vec![Vec2::new(0.0, 0.9), Vec2::new(on.x, on.y)];

        let sparse = project_points_sparse(&points, &camera, &target);
        assert_eq!(sparse.len(), 2);
        assert!(sparse[0].is_none());
        assert!(sparse[1].is_some());
    }

    #[test]
    fn test_plane_projection_lands_on_plane() {
        let camera = camera_above_origin();
        let plane = Plane3::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));

        let curve = project_points(
            &[Vec2::new(0.0, 0.0), Vec2::new(0.2, 0.1)],
            &camera,
            &ProjectionTarget::Plane(plane),
        );

        assert_eq!(curve.len(), 2);
        for p in curve.points() {
            assert!(p.z.abs() < 1e-4);
        }
    }
}
