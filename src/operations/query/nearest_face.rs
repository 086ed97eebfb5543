use crate::error::Result;
use crate::math::intersect_3d::closest_point_on_triangle;
use crate::math::Point3;
use crate::topology::{FaceId, MeshStore};

/// Closest surface point to a query location.
#[derive(Debug, Clone, Copy)]
pub struct NearestHit {
    pub point: Point3,
    pub face: FaceId,
    pub distance: f64,
}

/// Finds the face nearest to a point, by brute force over fan triangles.
pub struct NearestFace {
    point: Point3,
}

impl NearestFace {
    /// Creates a new `NearestFace` query.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self { point }
    }

    /// Executes the query. Returns `None` only for an empty mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn execute(&self, store: &MeshStore) -> Result<Option<NearestHit>> {
        let mut best: Option<NearestHit> = None;

        for (face_id, _) in store.faces() {
            let points = store.face_points(face_id)?;
            for i in 1..points.len().saturating_sub(1) {
                let q = closest_point_on_triangle(&self.point, &points[0], &points[i], &points[i + 1]);
                let d = (q - self.point).norm();
                if best.as_ref().is_none_or(|hit| d < hit.distance) {
                    best = Some(NearestHit {
                        point: q,
                        face: face_id,
                        distance: d,
                    });
                }
            }
        }

        Ok(best)
    }
}
