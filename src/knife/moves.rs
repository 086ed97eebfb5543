use tracing::{debug, error};

use super::{MeshPoint, PolylineKnife, RejectReason};
use crate::math::Point2;
use crate::operations::query::RayCast;
use crate::topology::EdgeId;
use crate::viewport::Viewport;

/// State of a dragged point before the drag started.
#[derive(Debug, Clone, Copy)]
pub struct MoveSnapshot {
    pub index: usize,
    pub point: MeshPoint,
    pub start_edge: Option<EdgeId>,
    pub end_edge: Option<EdgeId>,
}

/// Result of one drag step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The point follows the cursor on the surface.
    Moved,
    /// The bound endpoint slid along the boundary onto this edge.
    Snapped(EdgeId),
    /// The drag left the mesh or the boundary; the point was restored and
    /// the move ended.
    Cancelled,
    Rejected(RejectReason),
}

impl PolylineKnife {
    /// Starts dragging the point at `index`.
    pub fn begin_move(&mut self, index: usize) -> bool {
        if self.check_editable().is_err() {
            return false;
        }
        let Some(&point) = self.points.get(index) else {
            return false;
        };
        self.snapshot = Some(MoveSnapshot {
            index,
            point,
            start_edge: self.points.start_edge(),
            end_edge: self.points.end_edge(),
        });
        self.selected = Some(index);
        true
    }

    /// Moves the dragged point under the cursor.
    ///
    /// A bound endpoint stays on the boundary, re-binding to whichever
    /// boundary edge it slides onto.
    pub fn move_point<V: Viewport + ?Sized>(&mut self, viewport: &V, cursor: &Point2) -> MoveOutcome {
        let Some(snapshot) = self.snapshot else {
            return MoveOutcome::Rejected(RejectReason::NoMove);
        };
        let ray = viewport.cursor_ray(cursor);
        let view = *ray.direction();
        let hit = match RayCast::new(ray).execute(&self.store) {
            Ok(hit) => hit,
            Err(err) => {
                error!(%err, "move failed");
                self.cancel_move();
                return MoveOutcome::Rejected(RejectReason::Mesh);
            }
        };
        let Some(hit) = hit else {
            self.cancel_move();
            return MoveOutcome::Cancelled;
        };

        let index = snapshot.index;
        if !self.points.is_terminal(index) {
            self.points.set(
                index,
                MeshPoint {
                    position: hit.point,
                    view,
                    face: Some(hit.face),
                },
            );
            return MoveOutcome::Moved;
        }

        let snap = self.boundary.snap(
            &self.store,
            viewport,
            &hit.point,
            cursor,
            self.params.drag_snap_px,
        );
        let snap = match snap {
            Ok(Some(snap)) => snap,
            Ok(None) => {
                debug!(index, "bound point dragged off the boundary");
                self.cancel_move();
                return MoveOutcome::Cancelled;
            }
            Err(err) => {
                error!(%err, "boundary snap failed");
                self.cancel_move();
                return MoveOutcome::Rejected(RejectReason::Mesh);
            }
        };
        let face = self
            .store
            .edge(snap.edge)
            .ok()
            .and_then(|edge| edge.faces().first().copied());
        self.points.set(
            index,
            MeshPoint {
                position: snap.point,
                view,
                face,
            },
        );
        if index == 0 && self.points.start_edge().is_some() {
            self.points.bind_start(snap.edge);
        } else {
            self.points.bind_end(snap.edge);
        }
        MoveOutcome::Snapped(snap.edge)
    }

    /// Restores the dragged point. Returns `false` when no drag is active.
    pub fn cancel_move(&mut self) -> bool {
        let Some(snapshot) = self.snapshot.take() else {
            return false;
        };
        self.points.set(snapshot.index, snapshot.point);
        if let Some(edge) = snapshot.start_edge {
            self.points.bind_start(edge);
        }
        if let Some(edge) = snapshot.end_edge {
            self.points.bind_end(edge);
        }
        debug!(index = snapshot.index, "move cancelled");
        true
    }

    /// Keeps the dragged point where it is and recomputes a computed cut.
    pub fn confirm_move(&mut self) -> bool {
        if self.snapshot.take().is_none() {
            return false;
        }
        self.refresh_plan();
        true
    }

    /// The drag in progress, if any.
    #[must_use]
    pub fn move_snapshot(&self) -> Option<&MoveSnapshot> {
        self.snapshot.as_ref()
    }
}
