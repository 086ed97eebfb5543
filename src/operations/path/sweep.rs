use std::collections::HashSet;

use super::{edge_hits, CrossingPath, EdgeHit, WalkOutcome};
use crate::error::Result;
use crate::geometry::Plane;
use crate::topology::{FaceId, MeshStore};

/// Follows a fixed cutting plane across faces from `from` to `to`.
///
/// Both directions leaving the start face are traced; the successful one
/// with fewer crossings wins, and on a tie the direction entering the
/// previous-face hint loses.
pub struct PlaneSweep {
    plane: Plane,
    from: FaceId,
    to: FaceId,
    prev_face: Option<FaceId>,
    epsilon: f64,
    max_tests: usize,
}

/// How one traced direction ended.
enum Trace {
    Reached(CrossingPath),
    /// The plane missed every exit of a face.
    Stalled,
    /// Boundary, loop or visit cap.
    Dead,
}

impl PlaneSweep {
    /// Creates a new `PlaneSweep` operation.
    #[must_use]
    pub fn new(plane: Plane, from: FaceId, to: FaceId) -> Self {
        Self {
            plane,
            from,
            to,
            prev_face: None,
            epsilon: 1e-8,
            max_tests: 10_000,
        }
    }

    #[must_use]
    pub fn with_prev_face(mut self, prev_face: Option<FaceId>) -> Self {
        self.prev_face = prev_face;
        self
    }

    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_max_tests(mut self, max_tests: usize) -> Self {
        self.max_tests = max_tests;
        self
    }

    /// Executes the sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn execute(&self, store: &MeshStore) -> Result<WalkOutcome> {
        if self.from == self.to {
            return Ok(WalkOutcome::Success(CrossingPath {
                crossings: Vec::new(),
                faces: vec![self.from],
            }));
        }

        let starts = edge_hits(store, self.from, &self.plane, self.epsilon, None)?;
        if starts.is_empty() {
            return Ok(WalkOutcome::EpsilonTooSmall);
        }

        let mut reached = Vec::new();
        let mut stalled = false;
        for start in starts {
            match self.trace(store, start)? {
                Trace::Reached(path) => reached.push(path),
                Trace::Stalled => stalled = true,
                Trace::Dead => {}
            }
        }

        let prev_face = self.prev_face;
        let best = reached.into_iter().min_by_key(|path| {
            let enters_prev = prev_face.is_some() && path.faces.get(1).copied() == prev_face;
            (path.crossings.len(), enters_prev)
        });

        Ok(match best {
            Some(path) => WalkOutcome::Success(path),
            None if stalled => WalkOutcome::EpsilonTooSmall,
            None => WalkOutcome::Exhausted,
        })
    }

    /// Traces one direction, starting with the crossing `start` out of the
    /// start face.
    fn trace(&self, store: &MeshStore, start: EdgeHit) -> Result<Trace> {
        let Some(mut face) = start.neighbor else {
            return Ok(Trace::Dead);
        };
        let mut entry = start.crossing;
        let mut visited = HashSet::from([self.from, face]);
        let mut path = CrossingPath {
            crossings: vec![start.crossing],
            faces: vec![self.from, face],
        };

        for _ in 0..self.max_tests {
            if face == self.to {
                return Ok(Trace::Reached(path));
            }

            let hits = edge_hits(store, face, &self.plane, self.epsilon, Some(entry.edge))?;
            // The exit lies on the far side of the face from the entry.
            let Some(exit) = hits.into_iter().max_by(|a, b| {
                let da = (a.crossing.point - entry.point).norm_squared();
                let db = (b.crossing.point - entry.point).norm_squared();
                da.total_cmp(&db)
            }) else {
                return Ok(Trace::Stalled);
            };
            let Some(next) = exit.neighbor else {
                return Ok(Trace::Dead);
            };
            if !visited.insert(next) {
                return Ok(Trace::Dead);
            }

            path.crossings.push(exit.crossing);
            path.faces.push(next);
            entry = exit.crossing;
            face = next;
        }

        Ok(Trace::Dead)
    }
}
