//! Interactive polyline knife.
//!
//! [`PolylineKnife`] owns the mesh for an editing session. Points are placed
//! with the cursor, a cut is computed from them, and committing embeds the
//! cut in the mesh topology. Every interaction returns an outcome value;
//! rejected interactions leave the session unchanged.

mod config;
mod cut;
mod edit;
mod hover;
mod moves;
mod points;
mod select;
mod sketch;

pub use config::KnifeParams;
pub use cut::{CommitOutcome, CutPlan, CutStatus, PlanCut};
pub use edit::{AddPointOutcome, DeletePointOutcome};
pub use hover::HoverTarget;
pub use moves::{MoveOutcome, MoveSnapshot};
pub use points::{MeshPoint, PointSequence, Removed, Stroke};
pub use select::{RegionOutcome, SeedOutcome};
pub use sketch::SketchOutcome;

use tracing::{debug, info};

use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::operations::path::SearchParams;
use crate::operations::query::BoundaryIndex;
use crate::operations::surgery::CutResult;
use crate::topology::{EdgeId, FaceId, MeshStore};

/// Lifecycle of a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutState {
    /// No points.
    Empty,
    /// Points placed, neither closed nor bound at both ends.
    Open,
    /// Closed loop, or bound to the boundary at both ends.
    Bound,
    /// Crossing paths computed with no bad segments.
    Cut,
    /// Embedded in the mesh; no further edits.
    Committed,
}

/// Why an interaction was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The cut is already embedded.
    Committed,
    /// The cut has not been embedded yet.
    NotCommitted,
    /// The cursor ray missed the mesh.
    RayMiss,
    /// Boundary binding on a closed loop.
    Cyclic,
    /// Boundary binding at the end of points not bound at the start.
    StartNotBound,
    /// The end is already bound to the boundary.
    EndBound,
    /// The edit would move or drop a terminal binding.
    BoundTerminal,
    /// No point at that index.
    OutOfRange,
    /// Nothing suitable under the cursor.
    NoTarget,
    /// No move in progress.
    NoMove,
    /// A cut needs at least two points.
    TooFewPoints,
    /// An open cut needs both ends bound to the boundary.
    Unbound,
    /// A point is not bound to a face.
    OffMesh,
    /// No cut has been computed.
    NoPlan,
    /// Some segments could not be resolved.
    BadSegments,
    /// A point is being dragged.
    MoveInProgress,
    /// The cut produced no perimeter edge.
    EmptyCut,
    /// A face of the cut chain is too close to the cut to seed a region.
    InCutChain,
    /// No region has been selected.
    NoRegion,
    /// A sketch without points.
    EmptyStroke,
    /// A sketch that does not start or end on the existing points.
    Disconnected,
    /// The mesh reported an error; see the log.
    Mesh,
}

/// Polyline cut tracker and the mesh it cuts.
#[derive(Debug)]
pub struct PolylineKnife {
    store: MeshStore,
    boundary: BoundaryIndex,
    params: KnifeParams,
    points: PointSequence,
    hover: HoverTarget,
    selected: Option<usize>,
    snapshot: Option<MoveSnapshot>,
    plan: Option<CutPlan>,
    result: Option<CutResult>,
    seed: Option<FaceId>,
}

impl PolylineKnife {
    /// Starts an editing session on `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no faces or is inconsistent.
    pub fn new(store: MeshStore, params: KnifeParams) -> Result<Self> {
        if store.face_count() == 0 {
            return Err(OperationError::InvalidInput("mesh has no faces".into()).into());
        }
        let boundary = BoundaryIndex::build(&store)?;
        info!(
            faces = store.face_count(),
            boundary_edges = store.boundary_edges().len(),
            "knife session started"
        );
        Ok(Self {
            store,
            boundary,
            params,
            points: PointSequence::default(),
            hover: HoverTarget::None,
            selected: None,
            snapshot: None,
            plan: None,
            result: None,
            seed: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> CutState {
        if self.result.is_some() {
            CutState::Committed
        } else if self.plan.as_ref().is_some_and(CutPlan::is_resolved) {
            CutState::Cut
        } else if self.points.is_empty() {
            CutState::Empty
        } else if self.points.cyclic() || self.points.is_bound() {
            CutState::Bound
        } else {
            CutState::Open
        }
    }

    #[must_use]
    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    /// Ends the session, returning the (possibly cut) mesh.
    #[must_use]
    pub fn into_store(self) -> MeshStore {
        self.store
    }

    #[must_use]
    pub fn params(&self) -> &KnifeParams {
        &self.params
    }

    /// Replaces the path search tuning; a computed cut is recomputed.
    pub fn set_search_params(&mut self, search: SearchParams) {
        self.params.search = search;
        self.refresh_plan();
    }

    #[must_use]
    pub fn points(&self) -> &PointSequence {
        &self.points
    }

    #[must_use]
    pub fn hovered(&self) -> &HoverTarget {
        &self.hover
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn plan(&self) -> Option<&CutPlan> {
        self.plan.as_ref()
    }

    /// Unresolved segments with the positions of their two points.
    #[must_use]
    pub fn bad_segments(&self) -> Vec<(usize, Point3, Point3)> {
        let Some(plan) = &self.plan else {
            return Vec::new();
        };
        let pts = self.points.as_slice();
        plan.bad_segments
            .iter()
            .filter_map(|&i| {
                let a = pts.get(i)?;
                let b = pts.get((i + 1) % pts.len())?;
                Some((i, a.position, b.position))
            })
            .collect()
    }

    /// Positions where the computed cut crosses mesh edges.
    #[must_use]
    pub fn crossing_points(&self) -> Vec<Point3> {
        self.plan
            .as_ref()
            .map(CutPlan::crossing_points)
            .unwrap_or_default()
    }

    /// Faces touched by the computed cut.
    #[must_use]
    pub fn face_chain(&self) -> Vec<FaceId> {
        self.plan
            .as_ref()
            .map(|plan| plan.face_chain.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Surgery result once committed.
    #[must_use]
    pub fn cut_result(&self) -> Option<&CutResult> {
        self.result.as_ref()
    }

    /// Cut edges in path order; empty until committed.
    #[must_use]
    pub fn perimeter(&self) -> &[EdgeId] {
        self.result.as_ref().map_or(&[], |r| r.perimeter.as_slice())
    }

    #[must_use]
    pub fn seed(&self) -> Option<FaceId> {
        self.seed
    }

    /// The drawn polyline.
    #[must_use]
    pub fn stroke(&self) -> Stroke {
        Stroke {
            points: self.points.positions(),
            closed: self.points.cyclic(),
        }
    }

    /// Clears all points and the computed cut. Refused once committed.
    pub fn reset(&mut self) -> bool {
        if self.result.is_some() {
            return false;
        }
        self.points.clear();
        self.hover = HoverTarget::None;
        self.selected = None;
        self.snapshot = None;
        self.plan = None;
        self.seed = None;
        debug!("knife reset");
        true
    }

    fn check_editable(&self) -> std::result::Result<(), RejectReason> {
        if self.result.is_some() {
            return Err(RejectReason::Committed);
        }
        Ok(())
    }

    /// Drops the computed cut after a structural edit.
    fn invalidate_plan(&mut self) {
        self.plan = None;
        self.seed = None;
    }

    /// Recomputes the cut if one was computed.
    fn refresh_plan(&mut self) {
        if self.plan.take().is_some() {
            self.seed = None;
            let status = self.make_cut();
            debug!(?status, "cut recomputed");
        }
    }
}
