use crate::math::Point3;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the mesh store.
    pub struct VertexId;
}

/// Data associated with a mesh vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub point: Point3,
    /// Edges incident to this vertex, maintained by the store.
    pub(crate) edges: Vec<EdgeId>,
}

impl VertexData {
    /// Creates a new, unconnected vertex at the given point.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self {
            point,
            edges: Vec::new(),
        }
    }

    /// Edges incident to this vertex.
    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}
