use std::collections::HashSet;

use tracing::{error, info, warn};

use super::{PointSequence, PolylineKnife, RejectReason};
use crate::error::Result;
use crate::math::intersect_3d::closest_point_on_line;
use crate::math::Point3;
use crate::operations::grouping::{FaceGrouping, FaceGroups};
use crate::operations::path::{Crossing, PathEnd, PathSearch, SearchParams};
use crate::operations::surgery::{CommitCut, CutNode};
use crate::topology::{EdgeId, FaceId, MeshStore};

/// A computed cut, ready to be embedded.
#[derive(Debug, Clone)]
pub struct CutPlan {
    /// Crossings and kept click points in path order.
    pub nodes: Vec<CutNode>,
    pub groups: FaceGroups,
    /// Faces holding points or crossed by the path.
    pub face_chain: HashSet<FaceId>,
    /// Start indices of segments the path search could not resolve.
    pub bad_segments: Vec<usize>,
    pub cyclic: bool,
}

impl CutPlan {
    /// `true` when every segment was resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.bad_segments.is_empty()
    }

    #[must_use]
    pub fn crossing_points(&self) -> Vec<Point3> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                CutNode::Crossing(c) => Some(c.point),
                CutNode::Click { .. } => None,
            })
            .collect()
    }

    #[must_use]
    pub fn crossing_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, CutNode::Crossing(_)))
            .count()
    }
}

/// Result of computing the cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutStatus {
    /// Every segment resolved.
    Ready { crossings: usize },
    /// These segments (by start index) could not be resolved.
    BadSegments(Vec<usize>),
    Rejected(RejectReason),
}

/// Result of embedding the cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed {
        perimeter: usize,
        new_faces: usize,
        issues: usize,
    },
    Rejected(RejectReason),
}

/// Builds the ordered cut nodes of a point sequence.
///
/// Points are grouped by face; every face change is resolved by a path
/// search, with the face the path last arrived from as the direction hint.
/// An open sequence bound to the boundary gets a crossing on each bound
/// edge at its terminal points.
pub struct PlanCut<'a> {
    points: &'a PointSequence,
    params: SearchParams,
}

impl<'a> PlanCut<'a> {
    #[must_use]
    pub fn new(points: &'a PointSequence) -> Self {
        Self {
            points,
            params: SearchParams::default(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the planning. Returns `None` when a point is off the mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn execute(&self, store: &MeshStore) -> Result<Option<CutPlan>> {
        let pts = self.points.as_slice();
        let Some(faces) = pts.iter().map(|p| p.face).collect::<Option<Vec<FaceId>>>() else {
            warn!("point off the mesh, no cut");
            return Ok(None);
        };
        let n = faces.len();
        let cyclic = self.points.cyclic();
        let start_edge = self.points.start_edge().filter(|_| !cyclic);
        let end_edge = self.points.end_edge().filter(|_| !cyclic);

        let groups = FaceGrouping::new(faces.clone(), cyclic)
            .with_terminals(
                start_edge.and(faces.first().copied()),
                end_edge.and(faces.last().copied()),
            )
            .execute();
        let mut face_chain: HashSet<FaceId> = faces.iter().copied().collect();
        let mut nodes = Vec::new();
        let mut bad_segments = Vec::new();

        if let (Some(edge), Some(first)) = (start_edge, pts.first()) {
            nodes.push(CutNode::Crossing(terminal_crossing(store, edge, &first.position)?));
        }

        let mut arrived_from = None;
        for i in 0..n {
            if groups.get(faces[i]).is_some_and(|g| g.contains(&i)) {
                nodes.push(CutNode::Click {
                    index: i,
                    point: pts[i].position,
                    face: faces[i],
                });
            }
            if !groups.face_changes.contains(&i) {
                continue;
            }
            let j = (i + 1) % n;
            if j == 0 && !cyclic {
                continue;
            }

            let from = PathEnd {
                point: pts[i].position,
                face: faces[i],
                view: pts[i].view,
            };
            let to = PathEnd {
                point: pts[j].position,
                face: faces[j],
                view: pts[j].view,
            };
            let path = PathSearch::new(from, to)
                .with_prev_face(arrived_from)
                .with_params(self.params)
                .execute(store)?;
            match path {
                Some(path) => {
                    arrived_from = path.faces.len().checked_sub(2).map(|k| path.faces[k]);
                    face_chain.extend(path.faces.iter().copied());
                    nodes.extend(path.crossings.into_iter().map(CutNode::Crossing));
                }
                None => {
                    warn!(segment = i, "segment unresolved");
                    bad_segments.push(i);
                    arrived_from = None;
                }
            }
        }

        if let (Some(edge), Some(last)) = (end_edge, pts.last()) {
            nodes.push(CutNode::Crossing(terminal_crossing(store, edge, &last.position)?));
        }

        let plan = CutPlan {
            nodes,
            groups,
            face_chain,
            bad_segments,
            cyclic,
        };
        info!(
            points = n,
            cyclic,
            crossings = plan.crossing_count(),
            faces = plan.face_chain.len(),
            bad_segments = plan.bad_segments.len(),
            "cut computed"
        );
        Ok(Some(plan))
    }
}

/// Crossing of a bound boundary edge at the terminal point on it.
fn terminal_crossing(store: &MeshStore, edge: EdgeId, point: &Point3) -> Result<Crossing> {
    let (a, b) = store.edge_points(edge)?;
    let t = closest_point_on_line(point, &a, &b).1.clamp(0.0, 1.0);
    Ok(Crossing {
        edge,
        point: a + (b - a) * t,
        t,
    })
}

impl PolylineKnife {
    /// Computes the cut from the current points.
    ///
    /// Only a closed loop or a sequence bound to the boundary at both ends
    /// can be cut.
    pub fn make_cut(&mut self) -> CutStatus {
        if let Err(reason) = self.check_editable() {
            return CutStatus::Rejected(reason);
        }
        if self.points.len() < 2 {
            return CutStatus::Rejected(RejectReason::TooFewPoints);
        }
        if !self.points.cyclic() && !self.points.is_bound() {
            return CutStatus::Rejected(RejectReason::Unbound);
        }
        let planned = PlanCut::new(&self.points)
            .with_params(self.params.search)
            .execute(&self.store);
        let plan = match planned {
            Ok(Some(plan)) => plan,
            Ok(None) => return CutStatus::Rejected(RejectReason::OffMesh),
            Err(err) => {
                error!(%err, "cut computation failed");
                return CutStatus::Rejected(RejectReason::Mesh);
            }
        };

        let status = if plan.is_resolved() {
            CutStatus::Ready {
                crossings: plan.crossing_count(),
            }
        } else {
            CutStatus::BadSegments(plan.bad_segments.clone())
        };
        self.plan = Some(plan);
        self.seed = None;
        status
    }

    /// Embeds the computed cut in the mesh.
    ///
    /// Refused while segments are unresolved or a point is dragged. Surgery
    /// runs on a copy of the mesh, so a failure or a cut without perimeter
    /// leaves the session unchanged.
    pub fn commit(&mut self) -> CommitOutcome {
        if let Err(reason) = self.check_editable() {
            return CommitOutcome::Rejected(reason);
        }
        if self.snapshot.is_some() {
            return CommitOutcome::Rejected(RejectReason::MoveInProgress);
        }
        let Some(plan) = &mut self.plan else {
            return CommitOutcome::Rejected(RejectReason::NoPlan);
        };
        if !plan.is_resolved() {
            warn!(bad_segments = ?plan.bad_segments, "commit refused");
            return CommitOutcome::Rejected(RejectReason::BadSegments);
        }

        let mut store = self.store.clone();
        let result = match CommitCut::new(plan.nodes.clone(), plan.cyclic).execute(&mut store) {
            Ok(result) => result,
            Err(err) => {
                error!(%err, "commit failed");
                return CommitOutcome::Rejected(RejectReason::Mesh);
            }
        };
        if result.perimeter.is_empty() {
            warn!(issues = result.issues.len(), "cut embeds no edge, commit discarded");
            return CommitOutcome::Rejected(RejectReason::EmptyCut);
        }
        plan.face_chain.extend(result.new_faces.iter().copied());
        self.store = store;
        self.hover = super::HoverTarget::None;
        self.snapshot = None;

        let outcome = CommitOutcome::Committed {
            perimeter: result.perimeter.len(),
            new_faces: result.new_faces.len(),
            issues: result.issues.len(),
        };
        self.result = Some(result);
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::knife::{AddPointOutcome, CutState, DeletePointOutcome, KnifeParams};
    use crate::test_support::{grid, init_tracing, px, top_view};
    use crate::topology::VertexId;

    fn knife(n: usize) -> PolylineKnife {
        PolylineKnife::new(grid(n, n).store, KnifeParams::default()).unwrap()
    }

    fn place(k: &mut PolylineKnife, points: &[(f64, f64)]) {
        let view = top_view();
        for &(x, y) in points {
            let outcome = k.add_point(&view, &px(x, y));
            assert!(
                matches!(outcome, AddPointOutcome::Added(_) | AddPointOutcome::Closed),
                "({x}, {y}): {outcome:?}"
            );
        }
    }

    /// Triangle over three far apart cells of `grid(5, 5)`.
    const TRIANGLE: [(f64, f64); 4] = [(0.5, 0.5), (4.5, 0.7), (2.1, 4.9), (0.5, 0.5)];

    fn perimeter_degrees(k: &PolylineKnife) -> HashMap<VertexId, usize> {
        let mut degree = HashMap::new();
        for &e in k.perimeter() {
            let edge = k.store().edge(e).unwrap();
            *degree.entry(edge.start).or_insert(0) += 1;
            *degree.entry(edge.end).or_insert(0) += 1;
        }
        degree
    }

    #[test]
    fn closed_triangle_walks_three_segments() {
        init_tracing();
        let mut k = knife(5);
        place(&mut k, &TRIANGLE);
        assert!(k.points().cyclic());

        assert_eq!(k.make_cut(), CutStatus::Ready { crossings: 16 });
        assert_eq!(k.state(), CutState::Cut);
        assert_eq!(k.plan().unwrap().groups.face_changes, vec![0, 1, 2]);
        assert!(k.face_chain().len() >= 3);
        assert_eq!(k.face_chain().len(), 16);

        let CommitOutcome::Committed {
            perimeter, issues, ..
        } = k.commit()
        else {
            panic!("commit refused");
        };
        assert_eq!(issues, 0);
        assert_eq!(perimeter, 19);
        assert_eq!(k.state(), CutState::Committed);
        assert_eq!(k.store().face_count(), 25 + 16);

        let degree = perimeter_degrees(&k);
        assert_eq!(degree.len(), 19);
        assert!(degree.values().all(|&d| d == 2));
    }

    #[test]
    fn bad_segments_block_commit_until_resolved() {
        init_tracing();
        let mut k = knife(5);
        k.set_search_params(SearchParams {
            max_tests: 2,
            ..SearchParams::default()
        });
        place(&mut k, &TRIANGLE);

        let CutStatus::BadSegments(bad) = k.make_cut() else {
            panic!("expected bad segments");
        };
        assert!(!bad.is_empty());
        assert_eq!(k.bad_segments().len(), bad.len());
        assert_eq!(k.state(), CutState::Bound);

        let faces = k.store().face_count();
        assert_eq!(k.commit(), CommitOutcome::Rejected(RejectReason::BadSegments));
        assert_eq!(k.store().face_count(), faces);
        assert!(k.cut_result().is_none());

        k.set_search_params(SearchParams::default());
        assert_eq!(k.state(), CutState::Cut);
        assert!(matches!(k.commit(), CommitOutcome::Committed { .. }));
    }

    #[test]
    fn boundary_to_boundary_over_adjacent_faces() {
        let mut k = knife(2);
        place(&mut k, &[(0.05, 0.5), (1.95, 0.4)]);
        assert_eq!(k.state(), CutState::Bound);

        assert_eq!(k.make_cut(), CutStatus::Ready { crossings: 3 });
        assert!(matches!(k.commit(), CommitOutcome::Committed { perimeter: 2, .. }));

        // The end points of an open cut have perimeter degree 1.
        let degree = perimeter_degrees(&k);
        assert_eq!(degree.values().filter(|&&d| d == 1).count(), 2);
        assert_eq!(degree.values().filter(|&&d| d == 2).count(), 1);
    }

    #[test]
    fn loop_inside_one_face_has_nothing_to_commit() {
        let mut k = knife(1);
        place(&mut k, &[(0.3, 0.3), (0.7, 0.3), (0.7, 0.7), (0.3, 0.7), (0.3, 0.3)]);
        assert_eq!(k.state(), CutState::Bound);

        assert_eq!(k.make_cut(), CutStatus::Ready { crossings: 0 });
        let plan = k.plan().unwrap();
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups.iter().next().unwrap().1, &[0, 1, 2, 3]);
        assert!(plan.groups.face_changes.is_empty());

        let edges = k.store().edge_count();
        assert_eq!(k.commit(), CommitOutcome::Rejected(RejectReason::EmptyCut));
        assert_eq!(k.store().edge_count(), edges);
        assert!(k.cut_result().is_none());
        assert_eq!(k.state(), CutState::Cut);
    }

    #[test]
    fn four_unbound_points_on_one_face_leave_mesh_alone() {
        let mut k = knife(1);
        place(&mut k, &[(0.3, 0.3), (0.7, 0.3), (0.7, 0.7), (0.3, 0.7)]);
        assert_eq!(k.state(), CutState::Open);

        let plan = PlanCut::new(k.points()).execute(k.store()).unwrap().unwrap();
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups.iter().next().unwrap().1, &[0, 1, 2, 3]);
        assert!(plan.groups.face_changes.is_empty());
        assert_eq!(plan.crossing_count(), 0);

        let edges = k.store().edge_count();
        assert_eq!(k.make_cut(), CutStatus::Rejected(RejectReason::Unbound));
        assert_eq!(k.commit(), CommitOutcome::Rejected(RejectReason::NoPlan));
        assert_eq!(k.store().edge_count(), edges);
    }

    #[test]
    fn unbound_points_on_adjacent_faces_are_not_cut() {
        let mut k = PolylineKnife::new(grid(2, 1).store, KnifeParams::default()).unwrap();
        place(&mut k, &[(0.5, 0.5), (1.5, 0.4)]);
        assert_eq!(k.state(), CutState::Open);

        // The path itself is a single crossing on the shared edge.
        let plan = PlanCut::new(k.points()).execute(k.store()).unwrap().unwrap();
        let [CutNode::Click { index: 0, .. }, CutNode::Crossing(c), CutNode::Click { index: 1, .. }] =
            plan.nodes.as_slice()
        else {
            panic!("unexpected nodes {:?}", plan.nodes);
        };
        assert_eq!(k.store().edge(c.edge).unwrap().faces().len(), 2);
        assert!((c.point.x - 1.0).abs() < 1e-9);

        let edges = k.store().edge_count();
        assert_eq!(k.make_cut(), CutStatus::Rejected(RejectReason::Unbound));
        assert!(k.plan().is_none());
        assert_eq!(k.commit(), CommitOutcome::Rejected(RejectReason::NoPlan));
        assert_eq!(k.store().face_count(), 2);
        assert_eq!(k.store().edge_count(), edges);
        assert_eq!(k.state(), CutState::Open);
    }

    #[test]
    fn bound_points_on_adjacent_faces_split_both() {
        let mut k = PolylineKnife::new(grid(2, 1).store, KnifeParams::default()).unwrap();
        place(&mut k, &[(0.05, 0.5), (1.95, 0.4)]);
        assert_eq!(k.state(), CutState::Bound);

        assert_eq!(k.make_cut(), CutStatus::Ready { crossings: 3 });
        assert_eq!(
            k.commit(),
            CommitOutcome::Committed {
                perimeter: 2,
                new_faces: 4,
                issues: 0,
            }
        );
        assert_eq!(k.store().face_count(), 4);
        assert_eq!(k.state(), CutState::Committed);
    }

    #[test]
    fn diagonal_loop_through_grid_corners() {
        init_tracing();
        let mut k = knife(3);
        place(&mut k, &[(0.5, 0.5), (2.5, 2.5), (0.5, 2.5), (0.5, 0.5)]);
        assert!(k.points().cyclic());
        assert!(matches!(k.make_cut(), CutStatus::Ready { .. }));

        // Corners (1, 1) and (2, 2) are reused; four edges are bisected.
        assert_eq!(
            k.commit(),
            CommitOutcome::Committed {
                perimeter: 9,
                new_faces: 12,
                issues: 0,
            }
        );
        assert_eq!(k.store().face_count(), 15);
        assert_eq!(k.store().vertex_count(), 16 + 4 + 3);

        let degree = perimeter_degrees(&k);
        assert_eq!(degree.len(), 9);
        assert!(degree.values().all(|&d| d == 2));
        for (_, face) in k.store().faces() {
            assert!(face.normal().z > 0.0);
        }
    }

    #[test]
    fn revisited_face_keeps_first_run_through_commit() {
        init_tracing();
        let mut k = PolylineKnife::new(grid(3, 1).store, KnifeParams::default()).unwrap();
        // Out to the right cell and back into the middle one, ending on its
        // top edge.
        place(&mut k, &[(0.05, 0.5), (1.5, 0.3), (2.5, 0.5), (1.5, 0.7), (1.5, 0.95)]);
        assert_eq!(k.state(), CutState::Bound);

        assert_eq!(k.make_cut(), CutStatus::Ready { crossings: 5 });
        let plan = k.plan().unwrap();
        let middle = k.points().get(1).unwrap().face.unwrap();
        assert_eq!(plan.groups.revisited, vec![middle]);
        assert_eq!(plan.groups.face_changes, vec![0, 1, 2]);
        assert!(!plan
            .nodes
            .iter()
            .any(|node| matches!(node, CutNode::Click { index: 3, .. })));

        // The second crossing of the right edge of the middle cell is
        // dropped, leaving the right cell with a single cut vertex.
        assert_eq!(
            k.commit(),
            CommitOutcome::Committed {
                perimeter: 3,
                new_faces: 5,
                issues: 2,
            }
        );
        assert_eq!(k.store().face_count(), 6);
        let degree = perimeter_degrees(&k);
        assert_eq!(degree.values().filter(|&&d| d == 1).count(), 2);
        assert!(degree.values().all(|&d| d <= 2));
    }

    #[test]
    fn delete_and_re_add_keeps_partition() {
        let mut k = knife(5);
        let points = [(0.5, 0.5), (1.5, 0.5), (2.5, 0.6), (3.5, 0.5)];
        place(&mut k, &points);
        let partition = |k: &PolylineKnife| {
            PlanCut::new(k.points())
                .execute(k.store())
                .unwrap()
                .unwrap()
                .groups
        };
        let before = partition(&k);

        assert_eq!(k.delete_point(3), DeletePointOutcome::Deleted);
        place(&mut k, &points[3..]);
        let after = partition(&k);
        assert_eq!(before.face_changes, after.face_changes);
        for (face, group) in before.iter() {
            assert_eq!(after.get(face).unwrap(), group);
        }
    }

    #[test]
    fn edits_after_commit_are_rejected() {
        let mut k = knife(2);
        place(&mut k, &[(0.05, 0.5), (1.95, 0.4)]);
        k.make_cut();
        k.commit();

        let view = top_view();
        assert_eq!(
            k.add_point(&view, &px(0.5, 1.5)),
            AddPointOutcome::Rejected(RejectReason::Committed)
        );
        assert_eq!(k.delete_point(0), DeletePointOutcome::Rejected(RejectReason::Committed));
        assert_eq!(k.make_cut(), CutStatus::Rejected(RejectReason::Committed));
        assert_eq!(k.commit(), CommitOutcome::Rejected(RejectReason::Committed));
        assert!(!k.begin_move(0));
        assert!(!k.reset());
    }

    #[test]
    fn commit_needs_a_plan() {
        let mut k = knife(2);
        place(&mut k, &[(0.05, 0.5), (1.95, 0.4)]);
        assert_eq!(k.commit(), CommitOutcome::Rejected(RejectReason::NoPlan));
        assert_eq!(k.make_cut(), CutStatus::Ready { crossings: 3 });

        // Editing the points drops the computed cut back to the point state.
        k.delete_point(1);
        assert_eq!(k.state(), CutState::Open);
        assert_eq!(k.make_cut(), CutStatus::Rejected(RejectReason::TooFewPoints));
    }

    #[test]
    fn commit_waits_for_drag_to_end() {
        let mut k = knife(2);
        place(&mut k, &[(0.05, 0.5), (1.95, 0.4)]);
        assert_eq!(k.make_cut(), CutStatus::Ready { crossings: 3 });

        assert!(k.begin_move(1));
        let faces = k.store().face_count();
        assert_eq!(k.commit(), CommitOutcome::Rejected(RejectReason::MoveInProgress));
        assert_eq!(k.store().face_count(), faces);
        assert!(k.move_snapshot().is_some());

        assert!(k.cancel_move());
        assert!(matches!(k.commit(), CommitOutcome::Committed { .. }));
    }
}
