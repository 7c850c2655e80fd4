//! Ground-anchored vertical drawings and their arena.
//!
//! A billboard owns a mesh built from a projected stroke, the ground point
//! it is anchored to, and the horizontal normal its plane was built with.
//! The scene collaborator reorients each billboard every frame by rotating
//! it about the vertical axis only; [`Billboard::face_camera`] computes that
//! rotation.
//!
//! Billboards live in an index-based arena rather than holding references
//! to each other or to scene nodes, so parent/child bookkeeping stays free
//! of ownership cycles.

use glam::{Quat, Vec3};
use tracing::debug;

use crate::mesh::SketchMesh;
use crate::raycast::{EPSILON, Ray, raycast_triangles};
use crate::types::BillboardId;

/// A vertical drawing attached to the ground
#[derive(Debug, Clone)]
pub struct Billboard {
    mesh: SketchMesh,
    anchor: Vec3,
    normal: Vec3,
}

impl Billboard {
    /// Wrap a projected mesh with its anchor point and facing normal.
    ///
    /// `normal` is the horizontal plane normal the mesh was projected with;
    /// it must have zero Y.
    pub fn new(mesh: SketchMesh, anchor: Vec3, normal: Vec3) -> Self {
        Self {
            mesh,
            anchor,
            normal,
        }
    }

    /// The projected drawing
    pub fn mesh(&self) -> &SketchMesh {
        &self.mesh
    }

    /// Ground point the billboard rotates around
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Horizontal normal the billboard plane was built with
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Rotation about the vertical axis that turns the billboard toward the
    /// camera.
    ///
    /// Returns identity when the camera is directly above the anchor, where
    /// no horizontal facing direction exists.
    pub fn face_camera(&self, camera_pos: Vec3) -> Quat {
        let mut to_camera = camera_pos - self.anchor;
        to_camera.y = 0.0;
        if to_camera.length_squared() < EPSILON {
            return Quat::IDENTITY;
        }
        let to_camera = to_camera.normalize();

        // Yaw-only: rotate the stored facing direction onto the current one
        let target_yaw = to_camera.x.atan2(to_camera.z);
        let current_yaw = self.normal.x.atan2(self.normal.z);
        Quat::from_rotation_y(target_yaw - current_yaw)
    }
}

/// Creation-ordered storage for billboards.
///
/// Ids are dense indices; billboards are never removed during a session.
#[derive(Debug, Default)]
pub struct BillboardArena {
    billboards: Vec<Billboard>,
}

impl BillboardArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a billboard and return its id
    pub fn insert(&mut self, billboard: Billboard) -> BillboardId {
        let id = BillboardId(self.billboards.len() as u32);
        debug!("billboard {} added at {:?}", id.index(), billboard.anchor());
        self.billboards.push(billboard);
        id
    }

    /// Look up a billboard by id
    pub fn get(&self, id: BillboardId) -> Option<&Billboard> {
        self.billboards.get(id.index())
    }

    /// Number of billboards
    pub fn len(&self) -> usize {
        self.billboards.len()
    }

    /// Whether the arena holds no billboards
    pub fn is_empty(&self) -> bool {
        self.billboards.is_empty()
    }

    /// Iterate billboards in creation order
    pub fn iter(&self) -> impl Iterator<Item = (BillboardId, &Billboard)> {
        self.billboards
            .iter()
            .enumerate()
            .map(|(i, b)| (BillboardId(i as u32), b))
    }

    /// Test a ray against every billboard mesh in creation order.
    ///
    /// The first billboard whose mesh the ray hits wins and no further
    /// billboards are tested, so an older billboard can shadow a nearer
    /// newer one. That tie rule is creation order, not camera depth.
    pub fn hit_test(&self, ray: &Ray) -> Option<(BillboardId, Vec3)> {
        for (id, billboard) in self.iter() {
            let mesh = billboard.mesh();
            if let Some(point) = raycast_triangles(ray, mesh.positions(), mesh.indices()) {
                return Some((id, point));
            }
        }
        None
    }
}
