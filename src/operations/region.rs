//! Region selection bounded by cut perimeter edges, and what can be done
//! with a selected region.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::topology::{EdgeId, FaceId, MeshStore, VertexId};

/// Default cap on flood-fill iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 20_000;

/// Flood-fills face adjacency from a seed face without crossing the
/// perimeter.
///
/// A fill that reaches every face of the mesh is not bounded by the
/// perimeter and yields an empty region.
pub struct SelectRegion<'a> {
    seed: FaceId,
    perimeter: &'a HashSet<EdgeId>,
    max_iterations: usize,
}

impl<'a> SelectRegion<'a> {
    #[must_use]
    pub fn new(seed: FaceId, perimeter: &'a HashSet<EdgeId>) -> Self {
        Self {
            seed,
            perimeter,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Executes the fill, returning the region faces in visit order.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed face is not found.
    pub fn execute(&self, store: &MeshStore) -> Result<Vec<FaceId>> {
        store.face(self.seed)?;

        let mut visited = HashSet::from([self.seed]);
        let mut region = vec![self.seed];
        let mut queue = VecDeque::from([self.seed]);
        let mut iterations = 0;

        while let Some(face) = queue.pop_front() {
            iterations += 1;
            if iterations > self.max_iterations {
                warn!(iterations, "region fill stopped at iteration cap");
                break;
            }
            for (edge, neighbor) in store.face_neighbors(face)? {
                if self.perimeter.contains(&edge) || !visited.insert(neighbor) {
                    continue;
                }
                region.push(neighbor);
                queue.push_back(neighbor);
            }
        }

        if region.len() == store.face_count() {
            warn!("region is not bounded by the cut");
            return Ok(Vec::new());
        }
        debug!(faces = region.len(), iterations, "region selected");
        Ok(region)
    }
}

/// What to do with a selected region once the cut is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionAction {
    /// Copy the region into a new mesh.
    Duplicate,
    /// Copy the region into a new mesh and delete it from the source.
    Separate,
    /// Delete the region.
    Delete,
    /// Leave the mesh as cut.
    Knife,
}

impl RegionAction {
    /// Applies the action to `faces` of `store`, returning the extracted
    /// mesh for `Duplicate` and `Separate`.
    ///
    /// # Errors
    ///
    /// Returns an error if a region face is not found.
    pub fn apply(self, store: &mut MeshStore, faces: &[FaceId]) -> Result<Option<MeshStore>> {
        let extracted = match self {
            Self::Duplicate | Self::Separate => Some(ExtractRegion::new(faces).execute(store)?),
            Self::Delete | Self::Knife => None,
        };
        if matches!(self, Self::Separate | Self::Delete) {
            for &face in faces {
                store.remove_face(face)?;
            }
        }
        info!(action = ?self, faces = faces.len(), "region action applied");
        Ok(extracted)
    }
}

/// Copies a set of faces into a fresh mesh, sharing vertices between faces
/// the way they are shared in the source.
pub struct ExtractRegion<'a> {
    faces: &'a [FaceId],
}

impl<'a> ExtractRegion<'a> {
    #[must_use]
    pub fn new(faces: &'a [FaceId]) -> Self {
        Self { faces }
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Returns an error if a face or one of its vertices is not found.
    pub fn execute(&self, store: &MeshStore) -> Result<MeshStore> {
        let mut out = MeshStore::new();
        let mut remap: HashMap<VertexId, VertexId> = HashMap::new();

        for &face in self.faces {
            let mut corners = Vec::new();
            for &v in store.face(face)?.vertices() {
                let mapped = match remap.get(&v) {
                    Some(&mapped) => mapped,
                    None => {
                        let mapped = out.add_vertex(store.point(v)?);
                        remap.insert(v, mapped);
                        mapped
                    }
                };
                corners.push(mapped);
            }
            out.add_face(&corners)?;
        }
        Ok(out)
    }
}
