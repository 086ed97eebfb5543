use tracing::{debug, error, info};

use super::{HoverTarget, MeshPoint, PolylineKnife, RejectReason};
use crate::math::Point2;
use crate::viewport::Viewport;

/// Result of a click that adds or selects a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPointOutcome {
    /// Appended at this index.
    Added(usize),
    /// Inserted into a segment at this index.
    Inserted(usize),
    /// An existing point was selected.
    Selected(usize),
    /// Clicking the first point closed the loop.
    Closed,
    Rejected(RejectReason),
}

/// Result of deleting a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePointOutcome {
    Deleted,
    Rejected(RejectReason),
}

impl PolylineKnife {
    /// Adds, inserts or selects a point under the cursor, depending on the
    /// hover target there.
    pub fn add_point<V: Viewport + ?Sized>(&mut self, viewport: &V, cursor: &Point2) -> AddPointOutcome {
        if let Err(reason) = self.check_editable() {
            return AddPointOutcome::Rejected(reason);
        }
        let (target, hit) = match self.classify(viewport, cursor) {
            Ok(found) => found,
            Err(err) => {
                error!(%err, "add point failed");
                return AddPointOutcome::Rejected(RejectReason::Mesh);
            }
        };
        self.hover = target;
        let Some(hit) = hit else {
            return AddPointOutcome::Rejected(RejectReason::RayMiss);
        };
        let view = *viewport.cursor_ray(cursor).direction();

        let outcome = match target {
            HoverTarget::BoundaryEdge { edge, point } | HoverTarget::BoundaryVertex { edge, point } => {
                if self.points.cyclic() {
                    return AddPointOutcome::Rejected(RejectReason::Cyclic);
                }
                let binds_start = self.points.is_empty();
                if !binds_start && self.points.start_edge().is_none() {
                    return AddPointOutcome::Rejected(RejectReason::StartNotBound);
                }
                if self.points.end_edge().is_some() {
                    return AddPointOutcome::Rejected(RejectReason::EndBound);
                }
                let face = match self.store.edge(edge) {
                    Ok(data) => data.faces().first().copied(),
                    Err(err) => {
                        error!(%err, "boundary edge lookup failed");
                        return AddPointOutcome::Rejected(RejectReason::Mesh);
                    }
                };
                let index = self.points.push(MeshPoint {
                    position: point,
                    view,
                    face,
                });
                if binds_start {
                    self.points.bind_start(edge);
                } else {
                    self.points.bind_end(edge);
                }
                info!(index, ?edge, start = binds_start, "point bound to boundary");
                self.invalidate_plan();
                AddPointOutcome::Added(index)
            }
            HoverTarget::None => {
                if self.points.end_edge().is_some() {
                    return AddPointOutcome::Rejected(RejectReason::EndBound);
                }
                let index = self.points.push(MeshPoint {
                    position: hit.point,
                    view,
                    face: Some(hit.face),
                });
                self.invalidate_plan();
                AddPointOutcome::Added(index)
            }
            HoverTarget::Point(i) => {
                self.selected = Some(i);
                if i == 0 && !self.points.cyclic() && self.points.close() {
                    info!(points = self.points.len(), "loop closed");
                    self.invalidate_plan();
                    AddPointOutcome::Closed
                } else {
                    AddPointOutcome::Selected(i)
                }
            }
            HoverTarget::Segment(i) => {
                let index = i + 1;
                self.points.insert(
                    index,
                    MeshPoint {
                        position: hit.point,
                        view,
                        face: Some(hit.face),
                    },
                );
                self.selected = Some(index);
                self.refresh_plan();
                AddPointOutcome::Inserted(index)
            }
        };
        debug!(?outcome, points = self.points.len(), "add point");
        outcome
    }

    /// Deletes the point at `index`, restoring the sequence invariants.
    pub fn delete_point(&mut self, index: usize) -> DeletePointOutcome {
        if let Err(reason) = self.check_editable() {
            return DeletePointOutcome::Rejected(reason);
        }
        let Some(removed) = self.points.remove(index) else {
            return DeletePointOutcome::Rejected(RejectReason::OutOfRange);
        };
        self.hover = HoverTarget::None;
        self.snapshot = None;

        if removed.cleared_end && !removed.cleared_start {
            self.invalidate_plan();
            self.selected = None;
        } else {
            self.selected = match self.selected {
                Some(s) if s == index => None,
                Some(s) if s > index => Some(s - 1),
                other => other,
            };
            if removed.cleared_start {
                self.invalidate_plan();
            } else {
                self.refresh_plan();
            }
        }
        debug!(index, points = self.points.len(), "point deleted");
        DeletePointOutcome::Deleted
    }

    /// Deletes the hovered point.
    pub fn delete_hovered(&mut self) -> DeletePointOutcome {
        match self.hover {
            HoverTarget::Point(i) => self.delete_point(i),
            _ => DeletePointOutcome::Rejected(RejectReason::NoTarget),
        }
    }
}
