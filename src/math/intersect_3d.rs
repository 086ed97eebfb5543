use crate::geometry::{Plane, Ray};

use super::{Point3, Vector3, TOLERANCE};

/// Relationship of a line with a plane.
#[derive(Debug)]
pub enum LinePlaneRelation {
    /// Line intersects the plane at a single point.
    Point { point: Point3, t: f64 },
    /// Line is parallel to the plane (does not intersect).
    Parallel,
    /// Line lies entirely on the plane.
    OnPlane,
}

/// Computes the intersection of a line `origin + t * dir` with a plane.
#[must_use]
pub fn line_plane_intersect(origin: &Point3, dir: &Vector3, plane: &Plane) -> LinePlaneRelation {
    let normal = plane.plane_normal();
    let denom = normal.dot(dir);

    let diff = plane.origin() - origin;
    let numer = normal.dot(&diff);

    if denom.abs() < TOLERANCE {
        if numer.abs() < TOLERANCE {
            LinePlaneRelation::OnPlane
        } else {
            LinePlaneRelation::Parallel
        }
    } else {
        let t = numer / denom;
        let point = origin + dir * t;
        LinePlaneRelation::Point { point, t }
    }
}

/// Signed distance from a point to a plane.
/// Positive = on the normal side, negative = opposite.
#[must_use]
pub fn signed_distance_to_plane(point: &Point3, plane: &Plane) -> f64 {
    let diff = point - plane.origin();
    plane.plane_normal().dot(&diff)
}

/// Projects `point` onto the infinite line through `a` and `b`.
///
/// Returns the projected point and its parameter, `0` at `a` and `1` at `b`.
/// The parameter is not clamped; callers test it against the range they need.
/// A degenerate line yields `(a, 0)`.
#[must_use]
pub fn closest_point_on_line(point: &Point3, a: &Point3, b: &Point3) -> (Point3, f64) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (*a, 0.0);
    }
    let t = (point - a).dot(&ab) / len_sq;
    (a + ab * t, t)
}

/// Intersects the segment `a -> b` with a plane.
///
/// The endpoints are classified with `epsilon`; the segment crosses when they
/// are not strictly on the same side. Returns the crossing point and its
/// parameter along the segment, clamped to `[0, 1]`. A segment lying in the
/// plane does not cross.
#[must_use]
pub fn segment_plane_crossing(
    a: &Point3,
    b: &Point3,
    plane: &Plane,
    epsilon: f64,
) -> Option<(Point3, f64)> {
    let da = signed_distance_to_plane(a, plane);
    let db = signed_distance_to_plane(b, plane);

    if (da > epsilon && db > epsilon) || (da < -epsilon && db < -epsilon) {
        return None;
    }
    let denom = da - db;
    if denom.abs() < TOLERANCE {
        // Both endpoints within epsilon of the plane: the edge lies in it.
        return None;
    }
    let t = (da / denom).clamp(0.0, 1.0);
    Some((a + (b - a) * t, t))
}

/// Intersects a ray with the triangle `(a, b, c)`, both sides.
///
/// Returns the ray parameter of the hit.
#[must_use]
pub fn ray_triangle_intersect(ray: &Ray, a: &Point3, b: &Point3, c: &Point3) -> Option<f64> {
    let dir = ray.direction();
    let ab = b - a;
    let ac = c - a;

    let pvec = dir.cross(&ac);
    let det = ab.dot(&pvec);
    if det.abs() < TOLERANCE * TOLERANCE {
        // Ray parallel to the triangle plane.
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin() - a;
    let u = tvec.dot(&pvec) * inv_det;
    if !(-TOLERANCE..=1.0 + TOLERANCE).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(&ab);
    let v = dir.dot(&qvec) * inv_det;
    if v < -TOLERANCE || u + v > 1.0 + TOLERANCE {
        return None;
    }

    let t = ac.dot(&qvec) * inv_det;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// Closest point to `p` on the triangle `(a, b, c)`.
#[must_use]
pub fn closest_point_on_triangle(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> Point3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    // ── line_plane_intersect ──

    #[test]
    fn line_hits_plane() {
        let plane = Plane::from_normal(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0)).unwrap();
        let result = line_plane_intersect(&p(0.0, 0.0, 0.0), &v(0.0, 0.0, 1.0), &plane);
        match result {
            LinePlaneRelation::Point { point, t } => {
                assert!((t - 5.0).abs() < TOLERANCE);
                assert!((point.z - 5.0).abs() < TOLERANCE);
            }
            other => panic!("expected Point, got {other:?}"),
        }
    }

    #[test]
    fn line_parallel_to_plane() {
        let plane = Plane::from_normal(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0)).unwrap();
        let result = line_plane_intersect(&p(0.0, 0.0, 0.0), &v(1.0, 0.0, 0.0), &plane);
        assert!(matches!(result, LinePlaneRelation::Parallel));
    }

    #[test]
    fn line_on_plane() {
        let plane = Plane::from_normal(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        let result = line_plane_intersect(&p(1.0, 2.0, 0.0), &v(1.0, 0.0, 0.0), &plane);
        assert!(matches!(result, LinePlaneRelation::OnPlane));
    }

    // ── closest_point_on_line ──

    #[test]
    fn projection_parameter_is_unclamped() {
        let (q, t) = closest_point_on_line(&p(3.0, 1.0, 0.0), &p(0.0, 0.0, 0.0), &p(2.0, 0.0, 0.0));
        assert_relative_eq!(t, 1.5);
        assert_relative_eq!(q.x, 3.0);
        assert_relative_eq!(q.y, 0.0);
    }

    #[test]
    fn degenerate_line_projects_to_start() {
        let a = p(1.0, 1.0, 1.0);
        let (q, t) = closest_point_on_line(&p(5.0, 0.0, 0.0), &a, &a);
        assert_eq!(t, 0.0);
        assert_eq!(q, a);
    }

    // ── segment_plane_crossing ──

    #[test]
    fn segment_crossing_plane() {
        let plane = Plane::from_normal(p(0.25, 0.0, 0.0), v(1.0, 0.0, 0.0)).unwrap();
        let (x, t) =
            segment_plane_crossing(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &plane, TOLERANCE).unwrap();
        assert_relative_eq!(t, 0.25);
        assert_relative_eq!(x.x, 0.25);
    }

    #[test]
    fn segment_on_one_side_does_not_cross() {
        let plane = Plane::from_normal(p(2.0, 0.0, 0.0), v(1.0, 0.0, 0.0)).unwrap();
        assert!(
            segment_plane_crossing(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &plane, TOLERANCE)
                .is_none()
        );
    }

    #[test]
    fn endpoint_on_plane_needs_epsilon() {
        let plane = Plane::from_normal(p(1.0 + 1e-9, 0.0, 0.0), v(1.0, 0.0, 0.0)).unwrap();
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 0.0, 0.0);
        assert!(segment_plane_crossing(&a, &b, &plane, 1e-10).is_none());
        let (_, t) = segment_plane_crossing(&a, &b, &plane, 1e-8).unwrap();
        assert_relative_eq!(t, 1.0);
    }

    // ── triangles ──

    #[test]
    fn ray_hits_triangle_from_either_side() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        let down = Ray::new(p(0.2, 0.2, 5.0), v(0.0, 0.0, -1.0)).unwrap();
        let up = Ray::new(p(0.2, 0.2, -5.0), v(0.0, 0.0, 1.0)).unwrap();
        assert_relative_eq!(ray_triangle_intersect(&down, &a, &b, &c).unwrap(), 5.0);
        assert_relative_eq!(ray_triangle_intersect(&up, &a, &b, &c).unwrap(), 5.0);
    }

    #[test]
    fn ray_misses_triangle() {
        let ray = Ray::new(p(2.0, 2.0, 5.0), v(0.0, 0.0, -1.0)).unwrap();
        assert!(
            ray_triangle_intersect(&ray, &p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0))
                .is_none()
        );
    }

    #[test]
    fn closest_point_regions() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        // Above the interior.
        let q = closest_point_on_triangle(&p(0.25, 0.25, 3.0), &a, &b, &c);
        assert_relative_eq!(q, p(0.25, 0.25, 0.0));
        // Beyond vertex a.
        let q = closest_point_on_triangle(&p(-1.0, -1.0, 0.0), &a, &b, &c);
        assert_relative_eq!(q, a);
        // Beyond the hypotenuse.
        let q = closest_point_on_triangle(&p(1.0, 1.0, 0.0), &a, &b, &c);
        assert_relative_eq!(q, p(0.5, 0.5, 0.0), epsilon = 1e-12);
    }
}
