use std::collections::HashMap;

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::error::Result;
use crate::math::intersect_3d::closest_point_on_line;
use crate::math::{Point2, Point3};
use crate::topology::{EdgeId, MeshStore, VertexId};
use crate::viewport::Viewport;

type BoundaryVertex = GeomWithData<[f64; 3], VertexId>;

/// Which boundary feature a snap landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    /// A point in the interior (or at the far end) of a boundary edge.
    Edge,
    /// A boundary vertex; `edge` is the adjacent edge bound to the point.
    Vertex,
}

/// Result of snapping a location onto the mesh boundary.
#[derive(Debug, Clone, Copy)]
pub struct BoundarySnap {
    pub edge: EdgeId,
    pub point: Point3,
    pub kind: SnapKind,
}

/// Nearest-neighbour index over the vertices of boundary edges.
///
/// Built once per editing session; surgery only inserts vertices in the
/// interior of the mesh, so the boundary does not change under the index.
#[derive(Debug)]
pub struct BoundaryIndex {
    tree: RTree<BoundaryVertex>,
    edges_of: HashMap<VertexId, Vec<EdgeId>>,
}

impl BoundaryIndex {
    /// Indexes the boundary edges of `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn build(store: &MeshStore) -> Result<Self> {
        let mut edges_of: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
        for e in store.boundary_edges() {
            let edge = store.edge(e)?;
            edges_of.entry(edge.start).or_default().push(e);
            edges_of.entry(edge.end).or_default().push(e);
        }

        let mut records = Vec::with_capacity(edges_of.len());
        for &v in edges_of.keys() {
            let p = store.point(v)?;
            records.push(GeomWithData::new([p.x, p.y, p.z], v));
        }

        Ok(Self {
            tree: RTree::bulk_load(records),
            edges_of,
        })
    }

    /// Returns `true` for a closed mesh.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges_of.is_empty()
    }

    /// Boundary vertex nearest to `location`.
    #[must_use]
    pub fn nearest_vertex(&self, location: &Point3) -> Option<VertexId> {
        self.tree
            .nearest_neighbor(&[location.x, location.y, location.z])
            .map(|record| record.data)
    }

    /// Snaps a surface location under `cursor` onto the boundary.
    ///
    /// The nearest boundary vertex `b` must have exactly two boundary edges.
    /// The location is projected onto the line of each edge `(a, b)`; edge
    /// `k` is accepted when its parameter lies in `(0, 1]` and the projection
    /// is within `threshold_px` of the cursor. Otherwise `b` itself is
    /// accepted when within the threshold, bound to the edge whose line
    /// passes nearer the location.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn snap<V: Viewport + ?Sized>(
        &self,
        store: &MeshStore,
        viewport: &V,
        location: &Point3,
        cursor: &Point2,
        threshold_px: f64,
    ) -> Result<Option<BoundarySnap>> {
        let Some(b) = self.nearest_vertex(location) else {
            return Ok(None);
        };
        let Some(edges) = self.edges_of.get(&b) else {
            return Ok(None);
        };
        if edges.len() != 2 {
            return Ok(None);
        }

        let b_point = store.point(b)?;
        let mut candidates = Vec::with_capacity(2);
        for &e in edges {
            let edge = store.edge(e)?;
            let Some(a) = edge.other_vertex(b) else {
                return Ok(None);
            };
            let a_point = store.point(a)?;
            let (q, t) = closest_point_on_line(location, &a_point, &b_point);
            candidates.push((e, q, t));
        }

        let screen_dist = |point: &Point3| {
            viewport
                .project(point)
                .map_or(f64::INFINITY, |s| (s - cursor).norm())
        };

        for &(edge, point, t) in &candidates {
            if t > 0.0 && t <= 1.0 && screen_dist(&point) < threshold_px {
                return Ok(Some(BoundarySnap {
                    edge,
                    point,
                    kind: SnapKind::Edge,
                }));
            }
        }

        if screen_dist(&b_point) < threshold_px {
            let d0 = (candidates[0].1 - location).norm();
            let d1 = (candidates[1].1 - location).norm();
            let edge = if d0 <= d1 { candidates[0].0 } else { candidates[1].0 };
            return Ok(Some(BoundarySnap {
                edge,
                point: b_point,
                kind: SnapKind::Vertex,
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{grid, p, px, tetrahedron, top_view};
    use approx::assert_relative_eq;

    #[test]
    fn closed_mesh_has_no_boundary() {
        let built = tetrahedron();
        let index = BoundaryIndex::build(&built.store).unwrap();
        assert!(index.is_empty());
        assert!(index.nearest_vertex(&p(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn snaps_to_edge_interior() {
        let built = grid(3, 3);
        let index = BoundaryIndex::build(&built.store).unwrap();
        let vp = top_view();
        // Just inside the bottom border, near the vertex (1, 0).
        let loc = p(1.2, 0.05, 0.0);
        let snap = index
            .snap(&built.store, &vp, &loc, &px(1.2, 0.05), 20.0)
            .unwrap()
            .unwrap();
        assert_eq!(snap.kind, SnapKind::Edge);
        assert_relative_eq!(snap.point.y, 0.0);
        assert_relative_eq!(snap.point.x, 1.2, epsilon = 1e-12);
        let (a, b) = built.store.edge_points(snap.edge).unwrap();
        assert_relative_eq!(a.y, 0.0);
        assert_relative_eq!(b.y, 0.0);
    }

    #[test]
    fn far_cursor_does_not_snap() {
        let built = grid(3, 3);
        let index = BoundaryIndex::build(&built.store).unwrap();
        let vp = top_view();
        let loc = p(1.2, 0.5, 0.0);
        let snap = index.snap(&built.store, &vp, &loc, &px(1.2, 0.5), 20.0).unwrap();
        assert!(snap.is_none());
        // The drag threshold is wide enough to reach the border.
        let snap = index.snap(&built.store, &vp, &loc, &px(1.2, 0.5), 60.0).unwrap();
        assert!(snap.is_some());
    }

    #[test]
    fn corner_snaps_to_vertex() {
        let built = grid(2, 2);
        let index = BoundaryIndex::build(&built.store).unwrap();
        let vp = top_view();
        // Outside both edge ranges of the corner vertex (0, 0).
        let loc = p(-0.05, -0.05, 0.0);
        let snap = index
            .snap(&built.store, &vp, &loc, &px(-0.05, -0.05), 20.0)
            .unwrap()
            .unwrap();
        assert_eq!(snap.kind, SnapKind::Vertex);
        assert_relative_eq!(snap.point.x, 0.0);
        assert_relative_eq!(snap.point.y, 0.0);
    }
}
