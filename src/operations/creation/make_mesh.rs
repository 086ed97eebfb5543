use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::topology::{FaceId, MeshStore, VertexId};

/// A mesh built from indexed polygons, with the IDs assigned to each input.
#[derive(Debug)]
pub struct BuiltMesh {
    pub store: MeshStore,
    /// `vertex_ids[i]` is the ID of input point `i`.
    pub vertex_ids: Vec<VertexId>,
    /// `face_ids[i]` is the ID of input polygon `i`.
    pub face_ids: Vec<FaceId>,
}

/// Builds a [`MeshStore`] from a point list and polygons given as index loops.
pub struct MakeMesh {
    points: Vec<Point3>,
    polygons: Vec<Vec<usize>>,
}

impl MakeMesh {
    /// Creates a new `MakeMesh` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>, polygons: Vec<Vec<usize>>) -> Self {
        Self { points, polygons }
    }

    /// Executes the operation, creating a fresh store.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon references a missing point or has fewer
    /// than three distinct corners.
    pub fn execute(&self) -> Result<BuiltMesh> {
        let mut store = MeshStore::new();
        let vertex_ids: Vec<VertexId> = self.points.iter().map(|&p| store.add_vertex(p)).collect();

        let mut face_ids = Vec::with_capacity(self.polygons.len());
        for polygon in &self.polygons {
            let corners = polygon
                .iter()
                .map(|&i| {
                    vertex_ids
                        .get(i)
                        .copied()
                        .ok_or(TopologyError::VertexIndexOutOfRange {
                            index: i,
                            count: vertex_ids.len(),
                        })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            face_ids.push(store.add_face(&corners)?);
        }

        Ok(BuiltMesh {
            store,
            vertex_ids,
            face_ids,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PolytrimError;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn tetrahedron_is_closed() {
        let built = MakeMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(0.0, 0.0, 1.0),
            ],
            vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]],
        )
        .execute()
        .unwrap();

        assert_eq!(built.store.face_count(), 4);
        assert_eq!(built.store.edge_count(), 6);
        assert!(built.store.boundary_edges().is_empty());
    }

    #[test]
    fn index_out_of_range_is_reported() {
        let err = MakeMesh::new(vec![p(0.0, 0.0, 0.0)], vec![vec![0, 1, 2]])
            .execute()
            .unwrap_err();
        assert!(matches!(
            err,
            PolytrimError::Topology(TopologyError::VertexIndexOutOfRange { index: 1, count: 1 })
        ));
    }
}
