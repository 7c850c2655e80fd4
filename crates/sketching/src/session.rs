//! The draw state machine: classify at drag start, commit at drag end.
//!
//! A session owns the terrain, the billboard arena, and at most one stroke
//! in flight. At mousedown a single pick ray classifies the stroke in
//! priority order (existing billboards, then terrain, then sky); at mouseup
//! only the ground-vs-new-billboard ambiguity is re-resolved by casting a
//! second ray through the end point. Every completed drag resolves into
//! exactly one commit outcome.

use glam::Vec2;
use thiserror::Error;
use tracing::{debug, info, warn};

use worldsketch_config::{ConfigError, SketchConfig};

use crate::billboard::BillboardArena;
use crate::camera::SketchCamera;
use crate::raycast::raycast_triangles;
use crate::stroke::Stroke2D;
use crate::stroke3d::{create_billboard, create_sky_stroke_mesh};
use crate::terrain::{ReshapeOptions, ReshapeOutcome, Terrain, TerrainError};
use crate::types::{CommitOutcome, DrawState, RejectReason};

/// Default crayon color, a grassy green
pub const DEFAULT_CRAYON_COLOR: [f32; 4] = [0.13, 0.62, 0.13, 1.0];

/// Errors from session construction
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

/// Owns the sketch world state and runs the draw state machine
pub struct SketchSession {
    config: SketchConfig,
    terrain: Terrain,
    billboards: BillboardArena,
    stroke: Option<Stroke2D>,
    state: DrawState,
    crayon_color: [f32; 4],
}

impl SketchSession {
    /// Create a session with a flat terrain built from the config
    pub fn new(config: SketchConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let terrain = Terrain::new(config.terrain_size, config.terrain_segments)?;
        Ok(Self {
            config,
            terrain,
            billboards: BillboardArena::new(),
            stroke: None,
            state: DrawState::Idle,
            crayon_color: DEFAULT_CRAYON_COLOR,
        })
    }

    /// Start a stroke at the given screen point and classify it.
    ///
    /// If a stroke is already in flight it is force-discarded: a drag that
    /// never saw its mouseup must not leak into the next one.
    pub fn begin_stroke(&mut self, ndc: Vec2, camera: &SketchCamera) {
        if self.stroke.take().is_some() {
            warn!("new stroke started while one was pending; discarding the old one");
        }

        let mut stroke = Stroke2D::new(self.config.stroke_width, self.crayon_color);
        stroke.add_point(ndc);

        // One ray decides the target surface, in priority order: existing
        // billboards, then the terrain, then the sky. The classification is
        // irrevocable for this drag.
        let ray = camera.pick_ray(ndc);
        self.state = if let Some((target, hit)) = self.billboards.hit_test(&ray) {
            let anchor = self
                .billboards
                .get(target)
                .map(|b| b.anchor())
                .unwrap_or(hit);
            DrawState::BillboardAddition { target, anchor }
        } else if let Some(anchor) =
            raycast_triangles(&ray, self.terrain.positions(), self.terrain.indices())
        {
            DrawState::GroundOrBillboard { anchor }
        } else {
            DrawState::Sky
        };

        debug!("stroke started, classified as {:?}", self.state);
        self.stroke = Some(stroke);
    }

    /// Append a screen point to the stroke in flight; no-op otherwise
    pub fn add_point(&mut self, ndc: Vec2) {
        if let Some(stroke) = &mut self.stroke {
            stroke.add_point(ndc);
        }
    }

    /// Finish the drag at the given screen point and commit the stroke.
    ///
    /// The session always returns to `Idle` and the stroke is discarded,
    /// whatever the outcome.
    pub fn end_stroke(&mut self, ndc: Vec2, camera: &SketchCamera) -> CommitOutcome {
        let state = std::mem::replace(&mut self.state, DrawState::Idle);
        let Some(stroke) = self.stroke.take() else {
            return CommitOutcome::Rejected(RejectReason::NoStrokeInFlight);
        };

        match state {
            DrawState::Idle => CommitOutcome::Rejected(RejectReason::NoStrokeInFlight),

            DrawState::BillboardAddition { anchor, .. } => {
                self.commit_billboard(&stroke, camera, anchor)
            }

            DrawState::GroundOrBillboard { anchor } => {
                // Re-resolve the ambiguity: a drag that ends on the terrain
                // edits the ground, one that ends in the air becomes a new
                // billboard anchored at the drag's start point.
                let ray = camera.pick_ray(ndc);
                match raycast_triangles(&ray, self.terrain.positions(), self.terrain.indices()) {
                    Some(end_point) => {
                        let opts = ReshapeOptions {
                            falloff_radius: self.config.falloff_radius,
                            min_curve_points: self.config.min_ground_points,
                        };
                        match self.terrain.reshape(&stroke, anchor, end_point, camera, &opts) {
                            ReshapeOutcome::Applied { curve_points } => {
                                info!("terrain edited from {curve_points} silhouette points");
                                CommitOutcome::TerrainEdited
                            }
                            ReshapeOutcome::ZeroLengthDrag => {
                                CommitOutcome::Rejected(RejectReason::ZeroLengthDrag)
                            }
                            ReshapeOutcome::CurveTooShort { points, required } => {
                                CommitOutcome::Rejected(RejectReason::CurveTooShort {
                                    points,
                                    required,
                                })
                            }
                        }
                    }
                    None => self.commit_billboard(&stroke, camera, anchor),
                }
            }

            DrawState::Sky => {
                match create_sky_stroke_mesh(&stroke, camera, self.config.sky_radius) {
                    Some(mesh) => CommitOutcome::SkyStroke(mesh),
                    None => CommitOutcome::Rejected(RejectReason::EmptyProjection),
                }
            }
        }
    }

    fn commit_billboard(
        &mut self,
        stroke: &Stroke2D,
        camera: &SketchCamera,
        anchor: glam::Vec3,
    ) -> CommitOutcome {
        match create_billboard(stroke, camera, anchor) {
            Some(billboard) => {
                let id = self.billboards.insert(billboard);
                info!("billboard {} created", id.index());
                CommitOutcome::BillboardCreated(id)
            }
            None => CommitOutcome::Rejected(RejectReason::EmptyProjection),
        }
    }

    /// Current draw state
    pub fn state(&self) -> DrawState {
        self.state
    }

    /// Whether a stroke is in flight
    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// The stroke in flight, for live ribbon feedback
    pub fn current_stroke(&self) -> Option<&Stroke2D> {
        self.stroke.as_ref()
    }

    /// The terrain height field
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Billboards created so far, in creation order
    pub fn billboards(&self) -> &BillboardArena {
        &self.billboards
    }

    /// Session configuration
    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Crayon color applied to new strokes
    pub fn crayon_color(&self) -> [f32; 4] {
        self.crayon_color
    }

    /// Set the crayon color for subsequent strokes
    pub fn set_crayon_color(&mut self, color: [f32; 4]) {
        self.crayon_color = color;
    }
}
