use tracing::{debug, error, info};

use super::{HoverTarget, MeshPoint, PolylineKnife, RejectReason};
use crate::error::Result;
use crate::math::{Point3, Vector3};
use crate::operations::query::NearestFace;
use crate::topology::EdgeId;

/// Result of a free-hand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchOutcome {
    /// The stroke was added at one end of the polyline.
    Extended,
    /// The stroke replaced part of the polyline.
    Replaced,
    /// The stroke connected the two ends into a loop.
    Closed,
    /// The stroke has no effect on the polyline.
    Ignored,
    Rejected(RejectReason),
}

impl PolylineKnife {
    /// Merges a free-hand stroke into the polyline.
    ///
    /// `start` is the hover target where the stroke began; the current hover
    /// target is where it ended. Stroke points are pulled onto the nearest
    /// face. A computed cut is discarded.
    pub fn sketch(&mut self, start: HoverTarget, stroke: &[Point3], view: Vector3) -> SketchOutcome {
        if let Err(reason) = self.check_editable() {
            return SketchOutcome::Rejected(reason);
        }
        if stroke.is_empty() {
            return SketchOutcome::Rejected(RejectReason::EmptyStroke);
        }
        let result = self
            .surface_points(stroke, view)
            .and_then(|stroke| self.merge_stroke(start, stroke, view));
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%err, "sketch failed");
                return SketchOutcome::Rejected(RejectReason::Mesh);
            }
        };

        if !matches!(outcome, SketchOutcome::Ignored | SketchOutcome::Rejected(_)) {
            self.invalidate_plan();
            self.selected = None;
            self.hover = HoverTarget::None;
            self.snapshot = None;
            info!(?outcome, points = self.points.len(), "sketch applied");
        }
        outcome
    }

    /// Pulls every free point onto its nearest face. Boundary-bound
    /// terminals keep their position. Returns the number of points moved;
    /// a computed cut is discarded.
    pub fn snap_to_surface(&mut self) -> usize {
        if self.check_editable().is_err() || self.points.is_empty() {
            return 0;
        }
        let mut moved = 0;
        for i in 0..self.points.len() {
            if self.points.is_terminal(i) {
                continue;
            }
            let point = self.points.as_slice()[i];
            let hit = match NearestFace::new(point.position).execute(&self.store) {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(err) => {
                    error!(%err, index = i, "surface snap failed");
                    continue;
                }
            };
            self.points.points_mut()[i] = MeshPoint {
                position: hit.point,
                face: Some(hit.face),
                ..point
            };
            moved += 1;
        }
        self.invalidate_plan();
        debug!(moved, "points snapped to surface");
        moved
    }

    fn surface_points(&self, stroke: &[Point3], view: Vector3) -> Result<Vec<MeshPoint>> {
        stroke
            .iter()
            .map(|&position| {
                let hit = NearestFace::new(position).execute(&self.store)?;
                Ok(match hit {
                    Some(hit) => MeshPoint {
                        position: hit.point,
                        view,
                        face: Some(hit.face),
                    },
                    None => MeshPoint {
                        position,
                        view,
                        face: None,
                    },
                })
            })
            .collect()
    }

    fn boundary_point(&self, edge: EdgeId, position: Point3, view: Vector3) -> Result<MeshPoint> {
        let face = self.store.edge(edge)?.faces().first().copied();
        Ok(MeshPoint {
            position,
            view,
            face,
        })
    }

    fn merge_stroke(
        &mut self,
        start: HoverTarget,
        mut stroke: Vec<MeshPoint>,
        view: Vector3,
    ) -> Result<SketchOutcome> {
        let end = self.hover;

        if let Some((edge, position)) = end.boundary() {
            if self.points.cyclic() {
                return Ok(SketchOutcome::Rejected(RejectReason::Cyclic));
            }
            if self.points.end_edge().is_some() {
                return Ok(SketchOutcome::Rejected(RejectReason::EndBound));
            }
            let end_point = self.boundary_point(edge, position, view)?;
            if self.points.is_empty() {
                let Some((start_edge, start_position)) = start.boundary() else {
                    return Ok(SketchOutcome::Rejected(RejectReason::StartNotBound));
                };
                let start_point = self.boundary_point(start_edge, start_position, view)?;
                self.points.push(start_point);
                self.points.bind_start(start_edge);
            } else if self.points.start_edge().is_none() {
                return Ok(SketchOutcome::Rejected(RejectReason::StartNotBound));
            }
            for point in stroke {
                self.points.push(point);
            }
            self.points.push(end_point);
            self.points.bind_end(edge);
            return Ok(SketchOutcome::Extended);
        }

        if let Some((edge, position)) = start.boundary() {
            if !self.points.is_empty() {
                return Ok(SketchOutcome::Rejected(RejectReason::Disconnected));
            }
            let start_point = self.boundary_point(edge, position, view)?;
            self.points.push(start_point);
            for point in stroke {
                self.points.push(point);
            }
            self.points.bind_start(edge);
            return Ok(SketchOutcome::Extended);
        }

        let n = self.points.len();
        let pts = self.points.as_slice().to_vec();

        let HoverTarget::Point(e) = end else {
            // Ends away from the polyline.
            if self.points.cyclic() {
                return Ok(SketchOutcome::Ignored);
            }
            if self.points.end_edge().is_some() {
                return Ok(SketchOutcome::Rejected(RejectReason::EndBound));
            }
            return Ok(match start {
                HoverTarget::Point(0) if n > 1 => {
                    if self.points.start_edge().is_some() {
                        return Ok(SketchOutcome::Rejected(RejectReason::BoundTerminal));
                    }
                    let mut merged = pts;
                    merged.reverse();
                    merged.append(&mut stroke);
                    self.points.replace(merged);
                    SketchOutcome::Extended
                }
                HoverTarget::Point(s) if s + 1 < n => {
                    let mut merged = pts[..=s].to_vec();
                    merged.append(&mut stroke);
                    self.points.replace(merged);
                    SketchOutcome::Replaced
                }
                _ => {
                    for point in stroke {
                        self.points.push(point);
                    }
                    SketchOutcome::Extended
                }
            });
        };
        let HoverTarget::Point(s) = start else {
            return Ok(SketchOutcome::Rejected(RejectReason::Disconnected));
        };

        if s == e {
            if n != 1 {
                return Ok(SketchOutcome::Ignored);
            }
            for point in stroke {
                self.points.push(point);
            }
            return Ok(if self.points.close() {
                SketchOutcome::Closed
            } else {
                SketchOutcome::Extended
            });
        }

        if self.points.cyclic() {
            // Keep the longer arc and let the stroke stand in for the other.
            let forward = (e + n - s) % n - 1;
            let backward = (s + n - e) % n - 1;
            let merged: Vec<MeshPoint> = if forward <= backward {
                let kept = (0..=(s + n - e) % n).map(|k| pts[(e + k) % n]);
                kept.chain(stroke).collect()
            } else {
                let kept = (0..=(e + n - s) % n).map(|k| pts[(s + k) % n]);
                kept.chain(stroke.into_iter().rev()).collect()
            };
            self.points.replace(merged);
            return Ok(SketchOutcome::Replaced);
        }

        let last = n - 1;
        let closes = (s == 0 && e == last) || (e == 0 && s == last);
        if closes {
            if self.points.start_edge().is_some() {
                return Ok(SketchOutcome::Rejected(RejectReason::BoundTerminal));
            }
            let mut merged = pts;
            if s == 0 {
                merged.extend(stroke.into_iter().rev());
            } else {
                merged.append(&mut stroke);
            }
            self.points.replace(merged);
            return Ok(if self.points.close() {
                SketchOutcome::Closed
            } else {
                SketchOutcome::Extended
            });
        }

        let merged: Vec<MeshPoint> = if s < e {
            pts[..=s].iter().copied().chain(stroke).chain(pts[e..].iter().copied()).collect()
        } else {
            pts[..=e]
                .iter()
                .copied()
                .chain(stroke.into_iter().rev())
                .chain(pts[s..].iter().copied())
                .collect()
        };
        self.points.replace(merged);
        Ok(SketchOutcome::Replaced)
    }
}
