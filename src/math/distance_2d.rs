use super::Point2;

/// Projects `p` onto the infinite line through `a` and `b` in screen space.
///
/// Returns the projection and its parameter (`0` at `a`, `1` at `b`).
#[must_use]
pub fn project_onto_line_2d(p: &Point2, a: &Point2, b: &Point2) -> (Point2, f64) {
    let ab = b - a;
    let len_sq = ab.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (*a, 0.0);
    }

    let t = (p - a).dot(&ab) / len_sq;
    (a + ab * t, t)
}

/// Returns the minimum distance from `p` to the segment `a -> b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let (_, t) = project_onto_line_2d(p, a, b);
    let closest = a + (b - a) * t.clamp(0.0, 1.0);
    (p - closest).norm()
}
