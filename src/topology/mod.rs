pub mod edge;
pub mod face;
pub mod vertex;

pub use edge::{EdgeData, EdgeId};
pub use face::{FaceData, FaceId};
pub use vertex::{VertexData, VertexId};

use std::collections::HashSet;

use crate::error::TopologyError;
use crate::math::{polygon_normal, Point3, Vector3};
use slotmap::SlotMap;

/// Central arena that owns the mesh connectivity.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation. Every
/// structural edit goes through the store so that the vertex→edge,
/// edge→face and face→loop tables stay consistent; the handle of a deleted
/// entity simply stops resolving.
#[derive(Debug, Default, Clone)]
pub struct MeshStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    faces: SlotMap<FaceId, FaceData>,
}

impl MeshStore {
    /// Creates a new, empty mesh store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts an unconnected vertex and returns its ID.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(VertexData::new(point))
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns the position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point(&self, id: VertexId) -> Result<Point3, TopologyError> {
        Ok(self.vertex(id)?.point)
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    // --- Edge operations ---

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Returns the positions of both endpoints of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is not found.
    pub fn edge_points(&self, id: EdgeId) -> Result<(Point3, Point3), TopologyError> {
        let edge = self.edge(id)?;
        Ok((self.point(edge.start)?, self.point(edge.end)?))
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    /// Finds the edge joining `a` and `b`, in either orientation.
    #[must_use]
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let va = self.vertices.get(a)?;
        va.edges.iter().copied().find(|&e| {
            self.edges
                .get(e)
                .is_some_and(|edge| edge.other_vertex(a) == Some(b))
        })
    }

    /// Edges bordering exactly one face.
    #[must_use]
    pub fn boundary_edges(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.is_boundary())
            .map(|(id, _)| id)
            .collect()
    }

    /// The face on the other side of `edge` from `face`.
    ///
    /// Returns `None` for boundary edges or when `face` does not use `edge`.
    /// For non-manifold edges the first other face is returned.
    #[must_use]
    pub fn other_face(&self, edge: EdgeId, face: FaceId) -> Option<FaceId> {
        let data = self.edges.get(edge)?;
        if !data.faces.contains(&face) {
            return None;
        }
        data.faces.iter().copied().find(|&f| f != face)
    }

    /// Splits `edge` at `point`, returning the new vertex.
    ///
    /// The edge keeps its ID for the half touching its start vertex; a new
    /// edge covers the other half. The new vertex is spliced into the loop
    /// of every face using the edge, so no face is left with a T-junction.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not found or a face loop does not
    /// contain it.
    pub fn bisect_edge(&mut self, edge: EdgeId, point: Point3) -> Result<VertexId, TopologyError> {
        let data = self.edge(edge)?.clone();
        let (a, b) = (data.start, data.end);

        for &f in &data.faces {
            let face = self.face(f)?;
            if loop_position(&face.vertices, a, b).is_none() {
                return Err(TopologyError::InvalidTopology(
                    "face loop does not contain its edge".into(),
                ));
            }
        }

        let v = self.add_vertex(point);
        let second = self.edges.insert(EdgeData {
            start: v,
            end: b,
            faces: data.faces.clone(),
        });

        if let Some(e) = self.edges.get_mut(edge) {
            e.end = v;
        }
        if let Some(vb) = self.vertices.get_mut(b) {
            vb.edges.retain(|&e| e != edge);
            vb.edges.push(second);
        }
        if let Some(vv) = self.vertices.get_mut(v) {
            vv.edges.push(edge);
            vv.edges.push(second);
        }

        for f in data.faces {
            let Some(face) = self.faces.get_mut(f) else {
                continue;
            };
            let Some(i) = loop_position(&face.vertices, a, b) else {
                continue;
            };
            face.vertices.insert(i + 1, v);
            if face.vertices[i] == a {
                face.edges[i] = edge;
                face.edges.insert(i + 1, second);
            } else {
                face.edges[i] = second;
                face.edges.insert(i + 1, edge);
            }
        }

        Ok(v)
    }

    /// Creates the edge `a - b` unless it already exists.
    fn ensure_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        if let Some(e) = self.find_edge(a, b) {
            return e;
        }
        let e = self.edges.insert(EdgeData {
            start: a,
            end: b,
            faces: Vec::new(),
        });
        for v in [a, b] {
            if let Some(data) = self.vertices.get_mut(v) {
                data.edges.push(e);
            }
        }
        e
    }

    /// Removes an edge and any vertex it leaves unconnected.
    fn remove_edge(&mut self, id: EdgeId) {
        let Some(edge) = self.edges.remove(id) else {
            return;
        };
        for v in [edge.start, edge.end] {
            let orphaned = self.vertices.get_mut(v).is_some_and(|data| {
                data.edges.retain(|&e| e != id);
                data.edges.is_empty()
            });
            if orphaned {
                self.vertices.remove(v);
            }
        }
    }

    // --- Face operations ---

    /// Creates a face from a vertex loop, creating missing edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex is not found or the loop has fewer than
    /// three distinct vertices.
    pub fn add_face(&mut self, corners: &[VertexId]) -> Result<FaceId, TopologyError> {
        let distinct: HashSet<VertexId> = corners.iter().copied().collect();
        if corners.len() < 3 || distinct.len() != corners.len() {
            return Err(TopologyError::DegenerateFace(distinct.len()));
        }
        for &v in corners {
            self.vertex(v)?;
        }

        let n = corners.len();
        let edges: Vec<EdgeId> = (0..n)
            .map(|i| self.ensure_edge(corners[i], corners[(i + 1) % n]))
            .collect();
        let normal = self.loop_normal(corners);

        let id = self.faces.insert(FaceData {
            vertices: corners.to_vec(),
            edges: edges.clone(),
            normal,
        });
        for e in edges {
            if let Some(edge) = self.edges.get_mut(e) {
                edge.faces.push(id);
            }
        }
        Ok(id)
    }

    /// Deletes a face. Edges left without faces are deleted with it, and
    /// vertices left without edges after that.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found.
    pub fn remove_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let face = self
            .faces
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?;
        for e in face.edges {
            let unused = self.edges.get_mut(e).is_some_and(|edge| {
                edge.faces.retain(|&f| f != id);
                edge.faces.is_empty()
            });
            if unused {
                self.remove_edge(e);
            }
        }
        Ok(())
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Returns `true` if the face is still alive.
    #[must_use]
    pub fn contains_face(&self, id: FaceId) -> bool {
        self.faces.contains_key(id)
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    /// Corner positions of a face in winding order.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its vertices is not found.
    pub fn face_points(&self, id: FaceId) -> Result<Vec<Point3>, TopologyError> {
        self.face(id)?
            .vertices
            .iter()
            .map(|&v| self.point(v))
            .collect()
    }

    /// Faces adjacent to `id` across one of its edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found.
    pub fn face_neighbors(&self, id: FaceId) -> Result<Vec<(EdgeId, FaceId)>, TopologyError> {
        let face = self.face(id)?;
        let mut out = Vec::new();
        for &e in &face.edges {
            let edge = self.edge(e)?;
            out.extend(edge.faces.iter().filter(|&&f| f != id).map(|&f| (e, f)));
        }
        Ok(out)
    }

    /// An edge used by both faces, if any.
    #[must_use]
    pub fn shared_edge(&self, a: FaceId, b: FaceId) -> Option<EdgeId> {
        let face = self.faces.get(a)?;
        face.edges.iter().copied().find(|&e| {
            self.edges
                .get(e)
                .is_some_and(|edge| edge.faces.contains(&b))
        })
    }

    /// Faces around a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn vertex_faces(&self, id: VertexId) -> Result<Vec<FaceId>, TopologyError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &e in &self.vertex(id)?.edges {
            for &f in &self.edge(e)?.faces {
                if seen.insert(f) {
                    out.push(f);
                }
            }
        }
        Ok(out)
    }

    /// Reverses the winding of a face.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found.
    pub fn flip_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let face = self
            .faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?;
        // Reversing [v0, v1, .., vn-1] gives edges in reverse order, shifted by one.
        face.vertices.reverse();
        face.edges.reverse();
        face.edges.rotate_left(1);
        face.normal = -face.normal;
        Ok(())
    }

    /// Newell normal of a vertex loop; zero when degenerate.
    fn loop_normal(&self, corners: &[VertexId]) -> Vector3 {
        let points: Vec<Point3> = corners
            .iter()
            .filter_map(|&v| self.vertices.get(v).map(|d| d.point))
            .collect();
        polygon_normal(&points).unwrap_or_else(Vector3::zeros)
    }
}

/// Index `i` such that the loop step `i -> i + 1` joins `a` and `b`.
fn loop_position(vertices: &[VertexId], a: VertexId, b: VertexId) -> Option<usize> {
    let n = vertices.len();
    (0..n).find(|&i| {
        let x = vertices[i];
        let y = vertices[(i + 1) % n];
        (x == a && y == b) || (x == b && y == a)
    })
}
