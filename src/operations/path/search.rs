use tracing::{debug, warn};

use super::{
    Crossing, CrossingPath, FaceWalk, PathEnd, PlaneSweep, RelaxSchedule, SearchParams, WalkOutcome,
};
use crate::error::Result;
use crate::geometry::Plane;
use crate::math::intersect_3d::{closest_point_on_line, line_plane_intersect, LinePlaneRelation};
use crate::topology::{EdgeId, FaceId, MeshStore};

/// Resolves one segment between two bound points.
///
/// Stages, in order: the shared edge of adjacent faces, the constrained
/// walk under its relaxation schedule, then the plane sweep under its own.
/// `None` means the segment could not be resolved.
pub struct PathSearch {
    from: PathEnd,
    to: PathEnd,
    prev_face: Option<FaceId>,
    params: SearchParams,
}

impl PathSearch {
    /// Creates a new `PathSearch` with default parameters.
    #[must_use]
    pub fn new(from: PathEnd, to: PathEnd) -> Self {
        Self {
            from,
            to,
            prev_face: None,
            params: SearchParams::default(),
        }
    }

    /// Face the path arrived from before `from`.
    #[must_use]
    pub fn with_prev_face(mut self, prev_face: Option<FaceId>) -> Self {
        self.prev_face = prev_face;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the search.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn execute(&self, store: &MeshStore) -> Result<Option<CrossingPath>> {
        if self.from.face == self.to.face {
            return Ok(Some(CrossingPath {
                crossings: Vec::new(),
                faces: vec![self.from.face],
            }));
        }

        let plane = match Plane::cutting(
            &self.from.point,
            &self.to.point,
            &self.from.view,
            &self.to.view,
        ) {
            Ok(plane) => plane,
            Err(err) => {
                warn!(%err, "no cutting plane for segment");
                return Ok(None);
            }
        };

        if let Some(edge) = store.shared_edge(self.from.face, self.to.face) {
            let crossing = crossing_on_edge(store, edge, &plane)?;
            return Ok(Some(CrossingPath {
                crossings: vec![crossing],
                faces: vec![self.from.face, self.to.face],
            }));
        }

        let mut schedule = RelaxSchedule::walk(&self.params);
        while let Some(attempt) = schedule.next_attempt() {
            let outcome = FaceWalk::new(self.from, self.to)
                .with_prev_face(self.prev_face)
                .with_epsilon(attempt.epsilon)
                .with_limit(attempt.use_limit)
                .with_max_tests(self.params.max_tests)
                .execute(store)?;
            debug!(
                attempt = schedule.attempts(),
                epsilon = attempt.epsilon,
                use_limit = attempt.use_limit,
                outcome = outcome.label(),
                "constrained walk"
            );
            if let WalkOutcome::Success(path) = outcome {
                return Ok(Some(path));
            }
            schedule.observe(&outcome);
        }

        let mut schedule = RelaxSchedule::sweep(&self.params);
        while let Some(attempt) = schedule.next_attempt() {
            let outcome = PlaneSweep::new(plane.clone(), self.from.face, self.to.face)
                .with_prev_face(self.prev_face)
                .with_epsilon(attempt.epsilon)
                .with_max_tests(self.params.max_tests)
                .execute(store)?;
            debug!(
                attempt = schedule.attempts(),
                epsilon = attempt.epsilon,
                outcome = outcome.label(),
                "plane sweep"
            );
            if let WalkOutcome::Success(path) = outcome {
                return Ok(Some(path));
            }
            schedule.observe(&outcome);
        }

        warn!("segment could not be resolved");
        Ok(None)
    }
}

/// Crossing of the cutting plane with the edge shared by two faces.
///
/// The intersection is clamped onto the edge. An edge parallel to the
/// plane is crossed at its point nearest the segment midpoint.
pub(crate) fn crossing_on_edge(store: &MeshStore, edge: EdgeId, plane: &Plane) -> Result<Crossing> {
    let (a, b) = store.edge_points(edge)?;
    let t = match line_plane_intersect(&a, &(b - a), plane) {
        LinePlaneRelation::Point { t, .. } => t,
        LinePlaneRelation::Parallel | LinePlaneRelation::OnPlane => {
            closest_point_on_line(plane.origin(), &a, &b).1
        }
    };
    let t = t.clamp(0.0, 1.0);
    Ok(Crossing {
        edge,
        point: a + (b - a) * t,
        t,
    })
}
