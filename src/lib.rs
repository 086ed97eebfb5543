pub mod error;
pub mod geometry;
pub mod knife;
pub mod math;
pub mod operations;
pub mod topology;
pub mod viewport;

#[cfg(test)]
mod test_support;

pub use error::{PolytrimError, Result};
pub use knife::{CutState, KnifeParams, PolylineKnife};
pub use topology::MeshStore;
pub use viewport::{OrthoViewport, Viewport};
