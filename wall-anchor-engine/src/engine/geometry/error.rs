use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("need at least {required} points, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },
}

pub type GeometryResult<T> = Result<T, GeometryError>;
