mod boundary_index;
mod nearest_face;
mod ray_cast;

pub use boundary_index::{BoundaryIndex, BoundarySnap, SnapKind};
pub use nearest_face::{NearestFace, NearestHit};
pub use ray_cast::{RayCast, RayHit};
