use crate::error::Result;
use crate::geometry::Ray;
use crate::math::intersect_3d::ray_triangle_intersect;
use crate::math::{Point3, Vector3};
use crate::topology::{FaceId, MeshStore};

/// Closest intersection of a ray with the mesh.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Point3,
    pub normal: Vector3,
    pub face: FaceId,
    /// Ray parameter of the hit.
    pub distance: f64,
}

/// Casts a ray against every face of the mesh.
///
/// Faces are fan-triangulated from their first corner, which is exact for
/// the planar convex polygons the cut produces.
pub struct RayCast {
    ray: Ray,
}

impl RayCast {
    /// Creates a new `RayCast` query.
    #[must_use]
    pub fn new(ray: Ray) -> Self {
        Self { ray }
    }

    /// Executes the query, returning the nearest hit or `None` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn execute(&self, store: &MeshStore) -> Result<Option<RayHit>> {
        let mut best: Option<RayHit> = None;

        for (face_id, face) in store.faces() {
            let points = store.face_points(face_id)?;
            for i in 1..points.len().saturating_sub(1) {
                let Some(t) = ray_triangle_intersect(&self.ray, &points[0], &points[i], &points[i + 1])
                else {
                    continue;
                };
                if best.as_ref().is_none_or(|hit| t < hit.distance) {
                    best = Some(RayHit {
                        point: self.ray.at(t),
                        normal: *face.normal(),
                        face: face_id,
                        distance: t,
                    });
                }
            }
        }

        Ok(best)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{grid, p};
    use approx::assert_relative_eq;

    #[test]
    fn hits_grid_cell() {
        let built = grid(3, 3);
        let ray = Ray::new(p(1.5, 2.25, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        let hit = RayCast::new(ray).execute(&built.store).unwrap().unwrap();
        assert_eq!(hit.face, built.face_ids[2 * 3 + 1]);
        assert_relative_eq!(hit.point.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn miss_returns_none() {
        let built = grid(2, 2);
        let ray = Ray::new(p(5.0, 5.0, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(RayCast::new(ray).execute(&built.store).unwrap().is_none());
    }

    #[test]
    fn nearest_of_two_layers() {
        let built = crate::test_support::tetrahedron();
        // Straight down through the slanted face first, then the base.
        let ray = Ray::new(p(0.2, 0.2, 3.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        let hit = RayCast::new(ray).execute(&built.store).unwrap().unwrap();
        assert_eq!(hit.face, built.face_ids[2]);
        assert_relative_eq!(hit.point.z, 0.6, epsilon = 1e-12);
    }
}
