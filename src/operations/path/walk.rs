use std::collections::HashSet;

use tracing::debug;

use super::{edge_hits, CrossingPath, PathEnd, WalkOutcome};
use crate::error::Result;
use crate::geometry::Plane;
use crate::math::TOLERANCE;
use crate::topology::{EdgeId, FaceId, MeshStore};

/// Constrained walk from one bound point to another across faces.
///
/// In every face a running plane is built through the current position,
/// containing the direction to the target and the face normal, so the walk
/// bends with the surface. The exit is the crossed edge furthest ahead
/// toward the target, preferring faces other than the previous-face hint.
pub struct FaceWalk {
    from: PathEnd,
    to: PathEnd,
    prev_face: Option<FaceId>,
    epsilon: f64,
    use_limit: bool,
    max_tests: usize,
}

impl FaceWalk {
    /// Creates a new `FaceWalk` with limit mode on.
    #[must_use]
    pub fn new(from: PathEnd, to: PathEnd) -> Self {
        Self {
            from,
            to,
            prev_face: None,
            epsilon: 1e-10,
            use_limit: true,
            max_tests: 10_000,
        }
    }

    /// Face the path arrived from before `from`; the walk avoids it.
    #[must_use]
    pub fn with_prev_face(mut self, prev_face: Option<FaceId>) -> Self {
        self.prev_face = prev_face;
        self
    }

    /// Plane tolerance for edge classification.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// When set, exits that do not advance toward the target are pruned.
    #[must_use]
    pub fn with_limit(mut self, use_limit: bool) -> Self {
        self.use_limit = use_limit;
        self
    }

    /// Maximum number of face visits.
    #[must_use]
    pub fn with_max_tests(mut self, max_tests: usize) -> Self {
        self.max_tests = max_tests;
        self
    }

    /// Executes the walk.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn execute(&self, store: &MeshStore) -> Result<WalkOutcome> {
        let mut face = self.from.face;
        let mut current = self.from.point;
        let mut entry: Option<EdgeId> = None;
        let mut visited = HashSet::from([face]);
        let mut path = CrossingPath {
            crossings: Vec::new(),
            faces: vec![face],
        };

        for _ in 0..self.max_tests {
            if face == self.to.face {
                return Ok(WalkOutcome::Success(path));
            }

            let ahead = self.to.point - current;
            let normal = *store.face(face)?.normal();
            let Ok(plane) = Plane::from_normal(current, ahead.cross(&normal)) else {
                debug!("walk plane is degenerate");
                return Ok(WalkOutcome::Exhausted);
            };
            let dir = ahead / ahead.norm();

            let hits = edge_hits(store, face, &plane, self.epsilon, entry)?;
            if hits.is_empty() {
                return Ok(WalkOutcome::EpsilonTooSmall);
            }

            let mut candidates: Vec<_> = hits
                .into_iter()
                .filter_map(|hit| {
                    let progress = (hit.crossing.point - current).dot(&dir);
                    hit.neighbor.map(|next| (hit.crossing, next, progress))
                })
                .collect();
            if candidates.is_empty() {
                return Ok(WalkOutcome::Exhausted);
            }
            if self.use_limit {
                candidates.retain(|&(_, _, progress)| progress > TOLERANCE);
                if candidates.is_empty() {
                    return Ok(WalkOutcome::LimitTooRestrictive);
                }
            }

            let prev_face = self.prev_face;
            let Some((crossing, next, _)) = candidates.into_iter().max_by(|a, b| {
                (Some(a.1) != prev_face)
                    .cmp(&(Some(b.1) != prev_face))
                    .then(a.2.total_cmp(&b.2))
            }) else {
                return Ok(WalkOutcome::Exhausted);
            };

            if !visited.insert(next) {
                return Ok(WalkOutcome::Exhausted);
            }
            path.crossings.push(crossing);
            path.faces.push(next);
            current = crossing.point;
            entry = Some(crossing.edge);
            face = next;
        }

        Ok(WalkOutcome::Exhausted)
    }
}
