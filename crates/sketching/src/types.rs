use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::mesh::SketchMesh;

/// Identifier for a billboard stored in a [`crate::billboard::BillboardArena`].
///
/// Ids are dense indices assigned in creation order and are never reused
/// within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillboardId(pub(crate) u32);

impl BillboardId {
    /// Index of this billboard in the arena
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Classification of the stroke currently being drawn.
///
/// Set once at drag start by casting a ray through the first screen point,
/// and consumed at drag end. Only the ground-vs-new-billboard ambiguity is
/// re-resolved at drag end; the other variants commit unconditionally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawState {
    /// No stroke in flight
    Idle,
    /// Stroke started on the terrain; resolved at drag end into either a
    /// terrain edit or a new billboard anchored at `anchor`
    GroundOrBillboard { anchor: Vec3 },
    /// Stroke started on an existing billboard; committed as a new drawing
    /// sharing the target's anchor point
    BillboardAddition { target: BillboardId, anchor: Vec3 },
    /// Stroke started in the sky
    Sky,
}

/// Why a commit attempt produced no geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The ground stroke projected fewer curve points than required
    CurveTooShort { points: usize, required: usize },
    /// Drag start and end resolve to the same ground point
    ZeroLengthDrag,
    /// No stroke vertex produced a successful ray intersection
    EmptyProjection,
    /// Drag ended without a stroke in flight
    NoStrokeInFlight,
}

/// Result of committing a finished stroke.
///
/// Every completed drag resolves into exactly one of these. Sky meshes are
/// handed to the caller; billboards stay in the session's arena and terrain
/// edits mutate the session's height field in place.
#[derive(Debug)]
pub enum CommitOutcome {
    /// The terrain height field was reshaped in place
    TerrainEdited,
    /// A new billboard was created and inserted into the arena
    BillboardCreated(BillboardId),
    /// A sky drawing was created; ownership passes to the caller
    SkyStroke(SketchMesh),
    /// The stroke was rejected as a no-op
    Rejected(RejectReason),
}

impl CommitOutcome {
    /// Whether this commit produced or mutated any geometry
    pub fn is_accepted(&self) -> bool {
        !matches!(self, CommitOutcome::Rejected(_))
    }
}
