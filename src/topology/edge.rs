use super::face::FaceId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the mesh store.
    pub struct EdgeId;
}

/// Data associated with a mesh edge.
///
/// An edge connects two vertices. Its orientation carries no meaning; faces
/// record their own winding through their vertex loops.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// First vertex of the edge.
    pub start: VertexId,
    /// Second vertex of the edge.
    pub end: VertexId,
    /// Faces using this edge, maintained by the store.
    pub(crate) faces: Vec<FaceId>,
}

impl EdgeData {
    /// Faces using this edge.
    #[must_use]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    /// An edge bordering exactly one face lies on the mesh boundary.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.faces.len() == 1
    }

    /// Returns `true` if the edge connects `v`.
    #[must_use]
    pub fn has_vertex(&self, v: VertexId) -> bool {
        self.start == v || self.end == v
    }

    /// The endpoint opposite `v`, if `v` is an endpoint.
    #[must_use]
    pub fn other_vertex(&self, v: VertexId) -> Option<VertexId> {
        if self.start == v {
            Some(self.end)
        } else if self.end == v {
            Some(self.start)
        } else {
            None
        }
    }
}
