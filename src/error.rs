use thiserror::Error;

/// Top-level error type for the polytrim engine.
#[derive(Debug, Error)]
pub enum PolytrimError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to mesh connectivity.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("face needs at least 3 distinct vertices, got {0}")]
    DegenerateFace(usize),

    #[error("vertex index {index} out of range for {count} vertices")]
    VertexIndexOutOfRange { index: usize, count: usize },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to cut operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`PolytrimError`].
pub type Result<T> = std::result::Result<T, PolytrimError>;
