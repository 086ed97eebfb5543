use crate::math::Vector3;

use super::edge::EdgeId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the mesh store.
    pub struct FaceId;
}

/// Data associated with a mesh face.
///
/// A face is a closed vertex loop. `edges[i]` joins `vertices[i]` to
/// `vertices[(i + 1) % n]`; the loop order is the face winding.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub(crate) vertices: Vec<VertexId>,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) normal: Vector3,
}

impl FaceData {
    /// Vertex loop in winding order.
    #[must_use]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Edge loop in winding order.
    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Unit normal from the last normal update (zero for degenerate faces).
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Number of corners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` for a face without corners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
