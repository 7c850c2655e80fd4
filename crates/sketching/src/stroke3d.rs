//! Factories that turn a finished stroke into standalone 3D geometry.
//!
//! Sky strokes are projected onto the origin-centered sky sphere; new
//! billboards are projected onto a vertical plane through their ground
//! anchor. Both reuse the stroke's ribbon index list against the projected
//! vertex list, discarding triangles that lost a vertex to a ray miss.

use glam::Vec3;
use tracing::{debug, warn};

use crate::billboard::Billboard;
use crate::camera::SketchCamera;
use crate::mesh::SketchMesh;
use crate::projection::{ProjectionTarget, project_points_sparse};
use crate::raycast::{EPSILON, Plane3};
use crate::stroke::Stroke2D;

/// Project a stroke onto the sky sphere and build a mesh from it.
///
/// Each ribbon vertex gets a pick ray intersected with a sphere of
/// `sky_radius` centered at the world origin; misses are dropped. Returns
/// `None` when nothing projected onto the sphere.
pub fn create_sky_stroke_mesh(
    stroke: &Stroke2D,
    camera: &SketchCamera,
    sky_radius: f32,
) -> Option<SketchMesh> {
    let samples = project_points_sparse(
        stroke.vertices(),
        camera,
        &ProjectionTarget::Sphere { radius: sky_radius },
    );

    let mesh = SketchMesh::from_projected_ribbon(&samples, stroke.indices(), stroke.color());
    if mesh.is_empty() {
        warn!("sky stroke produced no geometry");
        return None;
    }

    debug!(
        "sky stroke mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Some(mesh)
}

/// Project a stroke onto a vertical plane through `anchor` and wrap the
/// result as a billboard.
///
/// The plane normal points from the anchor toward the camera but with no
/// variation in Y, since billboards are always vertical. Returns `None`
/// when the camera stands directly above the anchor (no horizontal facing
/// direction exists) or when nothing projected onto the plane.
pub fn create_billboard(
    stroke: &Stroke2D,
    camera: &SketchCamera,
    anchor: Vec3,
) -> Option<Billboard> {
    let mut to_camera = camera.position() - anchor;
    to_camera.y = 0.0;
    if to_camera.length_squared() < EPSILON {
        warn!("camera directly above billboard anchor, stroke discarded");
        return None;
    }
    let normal = to_camera.normalize();

    let plane = Plane3::new(anchor, normal);
    let samples = project_points_sparse(stroke.vertices(), camera, &ProjectionTarget::Plane(plane));

    let mesh = SketchMesh::from_projected_ribbon(&samples, stroke.indices(), stroke.color());
    if mesh.is_empty() {
        warn!("billboard stroke produced no geometry");
        return None;
    }

    debug!(
        "billboard mesh: {} vertices, {} triangles, anchored at {:?}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        anchor
    );
    Some(Billboard::new(mesh, anchor, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const GREEN: [f32; 4] = [0.13, 0.62, 0.13, 1.0];

    fn drawn_stroke() -> Stroke2D {
        let mut stroke = Stroke2D::new(0.02, GREEN);
        stroke.add_point(Vec2::new(-0.3, 0.0));
        stroke.add_point(Vec2::new(0.0, 0.2));
        stroke.add_point(Vec2::new(0.3, 0.0));
        stroke
    }

    fn camera() -> SketchCamera {
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
    fn test_sky_stroke_keeps_every_vertex() {
        let stroke = drawn_stroke();
        let camera = camera();

        // A sphere this large is hit by every pick ray from inside it
        let mesh = create_sky_stroke_mesh(&stroke, &camera, 225.0).unwrap();

        assert_eq!(mesh.vertex_count(), stroke.vertices().len());
        assert_eq!(mesh.indices(), stroke.indices());
        assert_eq!(mesh.color(), GREEN);
        for p in mesh.positions() {
            assert!((p.length() - 225.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_billboard_plane_is_vertical_and_faces_camera() {
        let stroke = drawn_stroke();
        let camera = SketchCamera::look_at(
            Vec3::new(0.0, 2.0, 5.0),
            Vec3::ZERO,
            60f32.to_radians(),
            1.0,
            0.1,
            1000.0,
        );

        let billboard = create_billboard(&stroke, &camera, Vec3::ZERO).unwrap();

        // Horizontal normal aligned with the camera's XZ offset from the anchor
        let normal = billboard.normal();
        assert!(normal.y.abs() < 1e-6);
        assert!((normal - Vec3::Z).length() < 1e-5);

        // Every projected vertex lies in the plane through the anchor
        let plane = Plane3::new(billboard.anchor(), normal);
        for p in billboard.mesh().positions() {
            assert!(plane.signed_distance(*p).abs() < 1e-3);
        }
    }

    #[test]
    fn test_billboard_camera_above_anchor_is_rejected() {
        let stroke = drawn_stroke();
        let camera = SketchCamera::look_at(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(0.0, 0.0, -0.001),
            60f32.to_radians(),
            1.0,
            0.1,
            1000.0,
        );

        assert!(create_billboard(&stroke, &camera, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_empty_stroke_produces_no_mesh() {
        let stroke = Stroke2D::new(0.02, GREEN);
        let camera = camera();

        assert!(create_sky_stroke_mesh(&stroke, &camera, 225.0).is_none());
        assert!(create_billboard(&stroke, &camera, Vec3::ZERO).is_none());
    }
}
