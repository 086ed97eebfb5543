use crate::math::{Point3, Vector3};
use crate::topology::{EdgeId, FaceId};

/// A point of the polyline, bound to the mesh surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPoint {
    pub position: Point3,
    /// Direction the user was looking along when placing the point.
    pub view: Vector3,
    /// Face under the point; `None` when the point is off the mesh.
    pub face: Option<FaceId>,
}

/// What a removal did to the terminal bindings.
#[derive(Debug, Clone, Copy)]
pub struct Removed {
    pub point: MeshPoint,
    pub cleared_start: bool,
    pub cleared_end: bool,
}

/// The ordered polyline points and their closure state.
///
/// A cyclic sequence never holds terminal bindings, and an end binding is
/// only present together with a start binding.
#[derive(Debug, Clone, Default)]
pub struct PointSequence {
    points: Vec<MeshPoint>,
    cyclic: bool,
    start_edge: Option<EdgeId>,
    end_edge: Option<EdgeId>,
}

impl PointSequence {
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MeshPoint> {
        self.points.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[MeshPoint] {
        &self.points
    }

    #[must_use]
    pub fn cyclic(&self) -> bool {
        self.cyclic
    }

    /// Boundary edge bound to the first point.
    #[must_use]
    pub fn start_edge(&self) -> Option<EdgeId> {
        self.start_edge
    }

    /// Boundary edge bound to the last point.
    #[must_use]
    pub fn end_edge(&self) -> Option<EdgeId> {
        self.end_edge
    }

    /// `true` when both ends are bound to the boundary.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.start_edge.is_some() && self.end_edge.is_some()
    }

    /// `true` when the point at `index` carries a terminal binding.
    #[must_use]
    pub fn is_terminal(&self, index: usize) -> bool {
        (index == 0 && self.start_edge.is_some())
            || (index + 1 == self.points.len() && self.end_edge.is_some())
    }

    /// Point index pairs of every segment, including the closing segment
    /// of a cyclic sequence.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.points.len();
        let wrap = (self.cyclic && n > 2).then(|| (n - 1, 0));
        (1..n).map(|i| (i - 1, i)).chain(wrap)
    }

    #[must_use]
    pub fn positions(&self) -> Vec<Point3> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub(crate) fn push(&mut self, point: MeshPoint) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    pub(crate) fn insert(&mut self, index: usize, point: MeshPoint) {
        self.points.insert(index, point);
    }

    pub(crate) fn set(&mut self, index: usize, point: MeshPoint) {
        if let Some(slot) = self.points.get_mut(index) {
            *slot = point;
        }
    }

    /// Removes a point and restores the sequence invariants.
    ///
    /// The sequence opens when fewer than three points remain or the first
    /// point is removed. Removing the bound first point drops both
    /// bindings; removing the bound last point drops the end binding.
    pub(crate) fn remove(&mut self, index: usize) -> Option<Removed> {
        if index >= self.points.len() {
            return None;
        }
        let was_last = index + 1 == self.points.len();
        let point = self.points.remove(index);

        let mut cleared_start = false;
        let mut cleared_end = false;
        if index == 0 && self.start_edge.is_some() {
            cleared_start = true;
            cleared_end = self.end_edge.is_some();
            self.start_edge = None;
            self.end_edge = None;
        } else if was_last && self.end_edge.is_some() {
            cleared_end = true;
            self.end_edge = None;
        }
        if self.points.len() < 3 || index == 0 {
            self.cyclic = false;
        }

        Some(Removed {
            point,
            cleared_start,
            cleared_end,
        })
    }

    /// Closes the loop. Refused for bound sequences and fewer than three
    /// points.
    pub(crate) fn close(&mut self) -> bool {
        if self.start_edge.is_some() || self.points.len() < 3 {
            return false;
        }
        self.cyclic = true;
        true
    }

    pub(crate) fn bind_start(&mut self, edge: EdgeId) {
        self.cyclic = false;
        self.start_edge = Some(edge);
    }

    pub(crate) fn bind_end(&mut self, edge: EdgeId) {
        if self.start_edge.is_some() {
            self.end_edge = Some(edge);
        }
    }

    /// Replaces the points, keeping bindings and closure.
    pub(crate) fn replace(&mut self, points: Vec<MeshPoint>) {
        self.points = points;
    }

    pub(crate) fn points_mut(&mut self) -> &mut [MeshPoint] {
        &mut self.points
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The drawn polyline, for export as a separate curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point3>,
    pub closed: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{down, grid, p};

    fn sequence(n: usize) -> PointSequence {
        let mut seq = PointSequence::default();
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            seq.push(MeshPoint {
                position: p(i as f64, 0.0, 0.0),
                view: down(),
                face: None,
            });
        }
        seq
    }

    #[test]
    fn segments_wrap_only_when_cyclic() {
        let mut seq = sequence(3);
        assert_eq!(seq.segments().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
        assert!(seq.close());
        assert_eq!(seq.segments().collect::<Vec<_>>(), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn close_needs_three_unbound_points() {
        let mut seq = sequence(2);
        assert!(!seq.close());
        let edges = grid(1, 1).store.boundary_edges();
        let mut bound = sequence(3);
        bound.bind_start(edges[0]);
        assert!(!bound.close());
    }

    #[test]
    fn removal_opens_loop() {
        let mut seq = sequence(4);
        seq.close();
        seq.remove(2).unwrap();
        assert!(seq.cyclic());
        seq.remove(0).unwrap();
        assert!(!seq.cyclic());
    }

    #[test]
    fn removing_bound_first_point_drops_both_bindings() {
        let edges = grid(1, 1).store.boundary_edges();
        let mut seq = sequence(3);
        seq.bind_start(edges[0]);
        seq.bind_end(edges[1]);
        assert!(seq.is_bound());
        assert!(seq.is_terminal(2));

        let removed = seq.remove(0).unwrap();
        assert!(removed.cleared_start && removed.cleared_end);
        assert_eq!(seq.start_edge(), None);
        assert_eq!(seq.end_edge(), None);
    }

    #[test]
    fn removing_bound_last_point_drops_end_binding() {
        let edges = grid(1, 1).store.boundary_edges();
        let mut seq = sequence(3);
        seq.bind_start(edges[0]);
        seq.bind_end(edges[1]);
        let removed = seq.remove(2).unwrap();
        assert!(!removed.cleared_start && removed.cleared_end);
        assert_eq!(seq.start_edge(), Some(edges[0]));
        assert_eq!(seq.end_edge(), None);
    }

    #[test]
    fn end_binding_requires_start() {
        let edges = grid(1, 1).store.boundary_edges();
        let mut seq = sequence(2);
        seq.bind_end(edges[0]);
        assert_eq!(seq.end_edge(), None);
    }
}
