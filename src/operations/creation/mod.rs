mod make_mesh;

pub use make_mesh::{BuiltMesh, MakeMesh};
