use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::topology::{FaceId, MeshStore, VertexId};

/// Maximum number of propagation passes.
const MAX_PASSES: usize = 10;

/// Orients newly created faces consistently with the faces around them.
///
/// Each pass resolves every face that borders an already resolved face:
/// it is flipped when both loops run along their shared edge in the same
/// direction. Faces with no resolved neighbour wait for a later pass.
pub struct RepairNormals {
    faces: Vec<FaceId>,
}

impl RepairNormals {
    #[must_use]
    pub fn new(faces: Vec<FaceId>) -> Self {
        Self { faces }
    }

    /// Executes the repair, returning the flipped faces.
    ///
    /// # Errors
    ///
    /// Returns an error if a face is not found.
    pub fn execute(&self, store: &mut MeshStore) -> Result<Vec<FaceId>> {
        let mut pending: HashSet<FaceId> = self.faces.iter().copied().collect();
        let mut flipped = Vec::new();

        for pass in 0..MAX_PASSES {
            if pending.is_empty() {
                break;
            }
            let mut resolved = Vec::new();
            for &face in &self.faces {
                if !pending.contains(&face) {
                    continue;
                }
                let Some((edge, neighbor)) = store
                    .face_neighbors(face)?
                    .into_iter()
                    .find(|(_, f)| !pending.contains(f))
                else {
                    continue;
                };
                let edge = store.edge(edge)?;
                let (a, b) = (edge.start, edge.end);
                let here = steps_forward(store.face(face)?.vertices(), a, b);
                let there = steps_forward(store.face(neighbor)?.vertices(), a, b);
                if here == there {
                    store.flip_face(face)?;
                    flipped.push(face);
                }
                resolved.push(face);
            }
            debug!(pass, resolved = resolved.len(), "normal repair");
            for face in resolved {
                pending.remove(&face);
            }
        }

        Ok(flipped)
    }
}

/// `true` when the loop steps from `a` directly to `b`.
fn steps_forward(vertices: &[VertexId], a: VertexId, b: VertexId) -> bool {
    let n = vertices.len();
    vertices
        .iter()
        .position(|&v| v == a)
        .is_some_and(|i| vertices[(i + 1) % n] == b)
}
