//! Screen-space interface between the knife and the display layer.

use crate::error::{GeometryError, Result};
use crate::geometry::Ray;
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

/// Maps between cursor pixels and object space.
pub trait Viewport {
    /// Ray under the cursor, pointing into the scene.
    fn cursor_ray(&self, cursor: &Point2) -> Ray;

    /// Pixel position of a 3D point, or `None` when it is not visible.
    fn project(&self, point: &Point3) -> Option<Point2>;
}

/// Parallel projection along a fixed view direction.
///
/// The screen origin maps to `origin`; pixel `x` grows along `right` and
/// pixel `y` along `up`. Rays start far behind the view plane so that any
/// mesh in front of or behind `origin` is hit.
#[derive(Debug, Clone)]
pub struct OrthoViewport {
    origin: Point3,
    right: Vector3,
    up: Vector3,
    forward: Vector3,
    pixels_per_unit: f64,
}

/// Distance the cursor ray origin is pulled back against the view direction.
const RAY_BACKOFF: f64 = 1000.0;

impl OrthoViewport {
    /// Creates a viewport from a screen basis.
    ///
    /// `up` is re-orthogonalized against `right`; the view direction is
    /// `up x right`, i.e. into the screen for a right-handed basis.
    ///
    /// # Errors
    ///
    /// Returns an error if the basis is degenerate or the scale is not
    /// positive.
    pub fn new(origin: Point3, right: Vector3, up: Vector3, pixels_per_unit: f64) -> Result<Self> {
        if pixels_per_unit <= 0.0 {
            return Err(GeometryError::Degenerate("pixels per unit must be positive".into()).into());
        }
        let r_len = right.norm();
        if r_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let right = right / r_len;
        let up = up - right * right.dot(&up);
        let u_len = up.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::Degenerate("up is parallel to right".into()).into());
        }
        let up = up / u_len;
        Ok(Self {
            origin,
            right,
            up,
            forward: up.cross(&right),
            pixels_per_unit,
        })
    }

    /// Looks down the -Z axis with +X to the right and +Y up.
    #[must_use]
    pub fn top_down(origin: Point3, pixels_per_unit: f64) -> Self {
        Self {
            origin,
            right: Vector3::x(),
            up: Vector3::y(),
            forward: -Vector3::z(),
            pixels_per_unit: pixels_per_unit.max(TOLERANCE),
        }
    }

    /// Unit view direction.
    #[must_use]
    pub fn forward(&self) -> &Vector3 {
        &self.forward
    }
}

impl Viewport for OrthoViewport {
    fn cursor_ray(&self, cursor: &Point2) -> Ray {
        let on_plane = self.origin
            + self.right * (cursor.x / self.pixels_per_unit)
            + self.up * (cursor.y / self.pixels_per_unit);
        let origin = on_plane - self.forward * RAY_BACKOFF;
        Ray::from_unit(origin, self.forward)
    }

    fn project(&self, point: &Point3) -> Option<Point2> {
        let d = point - self.origin;
        Some(Point2::new(
            d.dot(&self.right) * self.pixels_per_unit,
            d.dot(&self.up) * self.pixels_per_unit,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cursor_ray_looks_down() {
        let vp = OrthoViewport::top_down(Point3::origin(), 100.0);
        let ray = vp.cursor_ray(&Point2::new(150.0, 50.0));
        assert_relative_eq!(ray.direction().z, -1.0);
        assert_relative_eq!(ray.origin().x, 1.5);
        assert_relative_eq!(ray.origin().y, 0.5);
        assert!(ray.origin().z > 0.0);
    }

    #[test]
    fn project_inverts_cursor_ray() {
        let vp = OrthoViewport::new(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            40.0,
        )
        .unwrap();
        let cursor = Point2::new(-12.0, 30.0);
        let hit = vp.cursor_ray(&cursor).at(RAY_BACKOFF);
        let back = vp.project(&hit).unwrap();
        assert_relative_eq!(back.x, cursor.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, cursor.y, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_basis_is_rejected() {
        let r = OrthoViewport::new(Point3::origin(), Vector3::x(), Vector3::x(), 10.0);
        assert!(r.is_err());
    }
}
