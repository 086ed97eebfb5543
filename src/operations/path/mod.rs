//! Crossing paths between two points bound to different faces.
//!
//! A segment `p0 -> p1` is resolved into the ordered mesh edges it crosses.
//! Adjacent faces are handled directly through their shared edge; otherwise
//! a [`FaceWalk`] follows a running plane across faces, and a [`PlaneSweep`]
//! along the fixed cutting plane is the fallback. [`RelaxSchedule`] drives
//! the retries of both, and [`PathSearch`] ties the stages together.

mod relax;
mod search;
mod sweep;
mod walk;

pub use relax::{Attempt, RelaxSchedule};
pub use search::PathSearch;
pub use sweep::PlaneSweep;
pub use walk::FaceWalk;

use crate::error::Result;
use crate::geometry::Plane;
use crate::math::intersect_3d::segment_plane_crossing;
use crate::math::{Point3, Vector3};
use crate::topology::{EdgeId, FaceId, MeshStore};

/// Tuning for the path search stages.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Maximum number of faces a single walk or sweep may visit.
    pub max_tests: usize,
    /// Starting plane tolerance of the constrained walk.
    pub walk_epsilon: f64,
    /// Maximum number of constrained walk attempts.
    pub walk_attempts: usize,
    /// Starting plane tolerance of the plane sweep.
    pub sweep_epsilon: f64,
    /// Maximum number of plane sweep attempts.
    pub sweep_attempts: usize,
    /// Relaxation stops once the tolerance reaches this value.
    pub epsilon_ceiling: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_tests: 10_000,
            walk_epsilon: 1e-10,
            walk_attempts: 6,
            sweep_epsilon: 1e-8,
            sweep_attempts: 11,
            epsilon_ceiling: 1e-4,
        }
    }
}

/// A resolved crossing of the cut with a mesh edge.
#[derive(Debug, Clone, Copy)]
pub struct Crossing {
    pub edge: EdgeId,
    pub point: Point3,
    /// Parameter along the edge, `0` at its start vertex and `1` at its end.
    pub t: f64,
}

/// Geometry of one resolved segment.
#[derive(Debug, Clone, Default)]
pub struct CrossingPath {
    /// Crossings in travel order.
    pub crossings: Vec<Crossing>,
    /// Faces in travel order, from the start face to the end face.
    pub faces: Vec<FaceId>,
}

/// Result of one walk or sweep attempt.
#[derive(Debug, Clone)]
pub enum WalkOutcome {
    Success(CrossingPath),
    /// The plane missed every exit of some face.
    EpsilonTooSmall,
    /// Every exit would move away from the target.
    LimitTooRestrictive,
    /// Dead end, revisit or visit cap.
    Exhausted,
}

impl WalkOutcome {
    /// Short name for log output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::EpsilonTooSmall => "epsilon too small",
            Self::LimitTooRestrictive => "limit too restrictive",
            Self::Exhausted => "exhausted",
        }
    }
}

/// One end of a segment.
#[derive(Debug, Clone, Copy)]
pub struct PathEnd {
    pub point: Point3,
    pub face: FaceId,
    /// View direction recorded when the point was placed.
    pub view: Vector3,
}

/// An edge of a face crossed by a plane.
#[derive(Debug, Clone, Copy)]
struct EdgeHit {
    crossing: Crossing,
    /// Face across the edge, `None` on the boundary.
    neighbor: Option<FaceId>,
}

/// Edges of `face` crossed by `plane`, skipping `entry`.
fn edge_hits(
    store: &MeshStore,
    face: FaceId,
    plane: &Plane,
    epsilon: f64,
    entry: Option<EdgeId>,
) -> Result<Vec<EdgeHit>> {
    let mut hits = Vec::new();
    for &edge in store.face(face)?.edges() {
        if Some(edge) == entry {
            continue;
        }
        let (a, b) = store.edge_points(edge)?;
        if let Some((point, t)) = segment_plane_crossing(&a, &b, plane, epsilon) {
            hits.push(EdgeHit {
                crossing: Crossing { edge, point, t },
                neighbor: store.other_face(edge, face),
            });
        }
    }
    Ok(hits)
}
