use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjError {
    #[error("Invalid CRS definition: {0}")]
    Definition(String),

    #[error("Unable to parse WKT: {0}")]
    Wkt(String),

    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    #[error("Invalid axis '{0}': expected a permutation of e/w, n/s and u/d")]
    InvalidAxis(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Grid error: {0}")]
    Grid(String),

    #[error("Mandatory grid '{0}' is not available")]
    GridNotFound(String),

    #[error("Coordinate contains a non-finite component: ({x}, {y}, {z:?})")]
    NonFiniteCoordinate { x: f64, y: f64, z: Option<f64> },

    #[error("Transform failed: {0}")]
    TransformFailed(String),
}

pub type Result<T> = std::result::Result<T, ProjError>;
