//! Ray intersection primitives for screen-to-world projection.
//!
//! This module provides ray/plane, ray/sphere, and ray/triangle intersection
//! (Moller-Trumbore), plus a brute-force raycast against CPU-resident
//! vertex/index arrays so terrain picking never needs a GPU readback.

use glam::Vec3;

/// Epsilon for floating point comparisons in ray intersection
pub(crate) const EPSILON: f32 = 1e-6;

/// A ray with an origin and a normalized direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize(),
        }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// An infinite plane in point-normal form
#[derive(Debug, Clone, Copy)]
pub struct Plane3 {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane3 {
    /// Create a plane through `point` with the given normal (normalized)
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Signed distance from `p` to the plane along the normal
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p - self.point)
    }

    /// Perpendicular foot point of `p` on the plane.
    ///
    /// Equivalent to casting a ray from `p` along the plane normal (in
    /// whichever direction faces the plane) and taking the hit point.
    pub fn project_point(&self, p: Vec3) -> Vec3 {
        p - self.normal * self.signed_distance(p)
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Intersect a ray with a plane in point-normal form.
///
/// Returns the hit point, or `None` if the ray is parallel to the plane or
/// the plane lies behind the ray origin.
pub fn ray_plane_intersection(ray: &Ray, plane: &Plane3) -> Option<Vec3> {
    let denom = plane.normal.dot(ray.dir);
    if denom.abs() < EPSILON {
        return None;
    }

    let t = plane.normal.dot(plane.point - ray.origin) / denom;
    if t < EPSILON {
        return None;
    }

    Some(ray.at(t))
}

/// Intersect a ray with a sphere centered at the world origin.
///
/// Returns the nearest hit point in front of the ray origin. A ray starting
/// inside the sphere (the usual case for sky projection) hits the far side.
pub fn ray_sphere_intersection(ray: &Ray, radius: f32) -> Option<Vec3> {
    // |origin + t*dir|^2 = r^2, with dir normalized so a = 1
    let b = 2.0 * ray.origin.dot(ray.dir);
    let c = ray.origin.length_squared() - radius * radius;

    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t_near = (-b - sqrt_d) / 2.0;
    let t_far = (-b + sqrt_d) / 2.0;

    let t = if t_near > EPSILON {
        t_near
    } else if t_far > EPSILON {
        t_far
    } else {
        return None;
    };

    Some(ray.at(t))
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Returns the hit distance and barycentric coordinates if the ray
/// intersects the triangle. Both triangle windings are accepted, since
/// sketch geometry is drawn double-sided.
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleHit> {
    // Edge vectors
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // If determinant is near zero, ray lies in plane of triangle or misses
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;

    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);

    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;

    // Only accept hits in front of the ray
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Cast a ray against a CPU-resident triangle list and return the closest
/// hit point.
///
/// `indices` holds three entries per triangle into `positions`. This is a
/// brute-force scan; terrain grids are small enough that no acceleration
/// structure is needed.
pub fn raycast_triangles(ray: &Ray, positions: &[Vec3], indices: &[u32]) -> Option<Vec3> {
    let mut closest: Option<f32> = None;

    for tri in indices.chunks_exact(3) {
        let v0 = positions[tri[0] as usize];
        let v1 = positions[tri[1] as usize];
        let v2 = positions[tri[2] as usize];

        if let Some(hit) = ray_triangle_intersection(ray.origin, ray.dir, v0, v1, v2) {
            let dominated = match closest {
                Some(prev_t) => hit.t >= prev_t,
                None => false,
            };
            if !dominated {
                closest = Some(hit.t);
            }
        }
    }

    closest.map(|t| ray.at(t))
}
