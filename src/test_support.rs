//! Shared mesh fixtures for unit tests.
#![allow(clippy::unwrap_used)]

use crate::math::{Point2, Point3, Vector3};
use crate::operations::creation::{BuiltMesh, MakeMesh};
use crate::operations::path::Crossing;
use crate::operations::surgery::CutNode;
use crate::topology::{MeshStore, VertexId};
use crate::viewport::OrthoViewport;

/// Installs a test-writer subscriber once per process.
pub(crate) fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("polytrim=debug".parse().unwrap_or_default());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

pub(crate) fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

/// View direction looking straight down onto the XY plane.
pub(crate) fn down() -> Vector3 {
    Vector3::new(0.0, 0.0, -1.0)
}

/// `nx` by `ny` unit quads in the XY plane, normals +Z.
///
/// Cell `(i, j)` covers `[i, i + 1] x [j, j + 1]` and is `face_ids[j * nx + i]`.
pub(crate) fn grid(nx: usize, ny: usize) -> BuiltMesh {
    let mut points = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            #[allow(clippy::cast_precision_loss)]
            points.push(p(i as f64, j as f64, 0.0));
        }
    }
    let row = nx + 1;
    let mut polygons = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            let a = j * row + i;
            polygons.push(vec![a, a + 1, a + 1 + row, a + row]);
        }
    }
    MakeMesh::new(points, polygons).execute().unwrap()
}

/// Closed tetrahedron with outward normals.
pub(crate) fn tetrahedron() -> BuiltMesh {
    MakeMesh::new(
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        ],
        vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]],
    )
    .execute()
    .unwrap()
}

/// Top-down orthographic view of the grid, 100 px per unit, origin at the
/// world point `(0, 0)` mapped to the pixel `(0, 0)`.
pub(crate) fn top_view() -> OrthoViewport {
    OrthoViewport::top_down(Point3::new(0.0, 0.0, 0.0), 100.0)
}

/// Screen position of a world XY location under [`top_view`].
pub(crate) fn px(x: f64, y: f64) -> Point2 {
    Point2::new(x * 100.0, y * 100.0)
}

/// Crossing of the edge between `a` and `b` at `point`.
pub(crate) fn crossing(store: &MeshStore, a: VertexId, b: VertexId, point: Point3) -> Crossing {
    let edge = store.find_edge(a, b).unwrap();
    let (start, end) = store.edge_points(edge).unwrap();
    let t = (point - start).norm() / (end - start).norm();
    Crossing { edge, point, t }
}

/// A closed cut around the centre cell of `grid(3, 3)`: a click in each
/// corner cell and two crossings along each side, twelve nodes in all.
pub(crate) fn ring_nodes(built: &BuiltMesh) -> Vec<CutNode> {
    let v = &built.vertex_ids;
    let f = &built.face_ids;
    let s = &built.store;
    let x = |a: usize, b: usize, px: f64, py: f64| CutNode::Crossing(crossing(s, v[a], v[b], p(px, py, 0.0)));
    let click = |index: usize, px: f64, py: f64, face: usize| CutNode::Click {
        index,
        point: p(px, py, 0.0),
        face: f[face],
    };
    vec![
        click(0, 0.5, 0.5, 0),
        x(1, 5, 1.0, 0.5),
        x(2, 6, 2.0, 0.5),
        click(1, 2.5, 0.5, 2),
        x(6, 7, 2.5, 1.0),
        x(10, 11, 2.5, 2.0),
        click(2, 2.5, 2.5, 8),
        x(10, 14, 2.0, 2.5),
        x(9, 13, 1.0, 2.5),
        click(3, 0.5, 2.5, 6),
        x(8, 9, 0.5, 2.0),
        x(4, 5, 0.5, 1.0),
    ]
}
