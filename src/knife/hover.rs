use tracing::error;

use super::PolylineKnife;
use crate::error::Result;
use crate::math::distance_2d::project_onto_line_2d;
use crate::math::intersect_3d::closest_point_on_line;
use crate::math::{Point2, Point3};
use crate::operations::query::{BoundarySnap, RayCast, RayHit, SnapKind};
use crate::topology::EdgeId;
use crate::viewport::Viewport;

/// What the cursor is over.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HoverTarget {
    #[default]
    None,
    /// An existing point, by index.
    Point(usize),
    /// The segment starting at this point index.
    Segment(usize),
    /// A location on a boundary edge.
    BoundaryEdge { edge: EdgeId, point: Point3 },
    /// A boundary vertex; `edge` is the adjacent edge it binds to.
    BoundaryVertex { edge: EdgeId, point: Point3 },
}

impl HoverTarget {
    /// The boundary edge and snapped location, for either boundary variant.
    #[must_use]
    pub fn boundary(&self) -> Option<(EdgeId, Point3)> {
        match *self {
            Self::BoundaryEdge { edge, point } | Self::BoundaryVertex { edge, point } => {
                Some((edge, point))
            }
            _ => None,
        }
    }

    fn from_snap(snap: BoundarySnap) -> Self {
        match snap.kind {
            SnapKind::Edge => Self::BoundaryEdge {
                edge: snap.edge,
                point: snap.point,
            },
            SnapKind::Vertex => Self::BoundaryVertex {
                edge: snap.edge,
                point: snap.point,
            },
        }
    }
}

impl PolylineKnife {
    /// Classifies the cursor target and remembers it as the hover target.
    ///
    /// Priority: point, segment, boundary feature, none. Boundary features
    /// are only offered when no points exist yet or the start is bound.
    pub fn hover<V: Viewport + ?Sized>(&mut self, viewport: &V, cursor: &Point2) -> &HoverTarget {
        self.hover = match self.classify(viewport, cursor) {
            Ok((target, _)) => target,
            Err(err) => {
                error!(%err, "hover classification failed");
                HoverTarget::None
            }
        };
        &self.hover
    }

    /// Hover target under the cursor together with the ray hit.
    pub(super) fn classify<V: Viewport + ?Sized>(
        &self,
        viewport: &V,
        cursor: &Point2,
    ) -> Result<(HoverTarget, Option<RayHit>)> {
        let ray = viewport.cursor_ray(cursor);
        let Some(hit) = RayCast::new(ray).execute(&self.store)? else {
            return Ok((HoverTarget::None, None));
        };

        if let Some(i) = self.hovered_point(viewport, cursor, &hit.point) {
            return Ok((HoverTarget::Point(i), Some(hit)));
        }
        if let Some(i) = self.hovered_segment(viewport, cursor, &hit.point) {
            return Ok((HoverTarget::Segment(i), Some(hit)));
        }
        if self.points.is_empty() || self.points.start_edge().is_some() {
            let snap = self.boundary.snap(
                &self.store,
                viewport,
                &hit.point,
                cursor,
                self.params.idle_snap_px,
            )?;
            if let Some(snap) = snap {
                return Ok((HoverTarget::from_snap(snap), Some(hit)));
            }
        }
        Ok((HoverTarget::None, Some(hit)))
    }

    /// Point nearest in 3D to the hit, if it is close on screen.
    fn hovered_point<V: Viewport + ?Sized>(
        &self,
        viewport: &V,
        cursor: &Point2,
        location: &Point3,
    ) -> Option<usize> {
        let (i, point) = self
            .points
            .as_slice()
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (a.position - location).norm_squared();
                let db = (b.position - location).norm_squared();
                da.total_cmp(&db)
            })?;
        let screen = viewport.project(&point.position)?;
        ((screen - cursor).norm() < self.params.point_px).then_some(i)
    }

    /// Segment whose interior passes nearest the hit in 3D, if the cursor
    /// is also over its interior on screen.
    fn hovered_segment<V: Viewport + ?Sized>(
        &self,
        viewport: &V,
        cursor: &Point2,
        location: &Point3,
    ) -> Option<usize> {
        let pts = self.points.as_slice();
        let (i, j) = self
            .points
            .segments()
            .filter_map(|(i, j)| {
                let (q, t) = closest_point_on_line(location, &pts[i].position, &pts[j].position);
                (t > 0.0 && t < 1.0).then(|| ((i, j), (q - location).norm_squared()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(segment, _)| segment)?;

        let a = viewport.project(&pts[i].position)?;
        let b = viewport.project(&pts[j].position)?;
        let (q, t) = project_onto_line_2d(cursor, &a, &b);
        let close = (q - cursor).norm_squared() < self.params.segment_px_sq;
        (close && t > 0.0 && t < 1.0).then_some(i)
    }
}
