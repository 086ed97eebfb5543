use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// An infinite plane in 3D space.
///
/// Defined by an origin point and a unit normal. Cutting planes are the
/// only surfaces the trim engine needs: every path segment is resolved by
/// intersecting mesh edges with one.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from an origin and a normal vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            normal: normal / len,
        })
    }

    /// Creates the cutting plane for a path segment `p0 -> p1`.
    ///
    /// The plane passes through the segment midpoint and contains both the
    /// segment direction and the view direction blended halfway between the
    /// two endpoints' view vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is degenerate or parallel to the
    /// blended view direction.
    pub fn cutting(p0: &Point3, p1: &Point3, view0: &Vector3, view1: &Vector3) -> Result<Self> {
        let seg = p1 - p0;
        if seg.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("cut segment has zero length".into()).into());
        }
        let view = view0.lerp(view1, 0.5);
        let normal = seg.cross(&view);
        if normal.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "cut segment is parallel to the view direction".into(),
            )
            .into());
        }
        let midpoint = Point3::from((p0.coords + p1.coords) * 0.5);
        Self::from_normal(midpoint, normal)
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }
}
