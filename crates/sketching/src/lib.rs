//! WorldSketch sketch-to-3D reconstruction
//!
//! This crate turns 2D strokes drawn on screen into 3D geometry:
//! - [`stroke`] - 2D stroke capture with a live triangulated ribbon
//! - [`camera`] - pick-ray construction from normalized device coordinates
//! - [`raycast`] - ray/plane, ray/sphere, and ray/triangle intersection
//! - [`projection`] - screen-to-world projection of whole strokes
//! - [`terrain`] - height-field terrain and the silhouette deformation pass
//! - [`mesh`] - standalone meshes built from projected strokes
//! - [`billboard`] - ground-anchored vertical drawings and their arena
//! - [`stroke3d`] - factories that turn finished strokes into meshes
//! - [`session`] - the draw state machine that classifies and commits strokes

pub mod billboard;
pub mod camera;
pub mod mesh;
pub mod projection;
pub mod raycast;
pub mod session;
pub mod stroke;
pub mod stroke3d;
pub mod terrain;
pub mod types;

pub use billboard::*;
pub use camera::*;
pub use mesh::*;
pub use projection::*;
pub use raycast::*;
pub use session::*;
pub use stroke::*;
pub use stroke3d::*;
pub use terrain::*;
pub use types::*;
