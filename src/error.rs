use thiserror::Error;

use crate::crs::CoordinateSystemType;

#[derive(Error, Debug)]
pub enum CrsError {
    #[error("Unsupported coordinate system combination: {from} -> {to}")]
    UnsupportedCombination {
        from: CoordinateSystemType,
        to: CoordinateSystemType,
    },

    #[error("No projection implementation for method {0}")]
    MissingProjection(String),

    #[error("Projection method {0} does not support the inverse operation")]
    MissingInverse(String),

    #[error("Invalid ellipsoid {name}: {reason}")]
    InvalidEllipsoid { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Projection error: {0}")]
    Projection(#[from] ProjError),

    #[error("Geodesy error: {0}")]
    Geodesy(#[from] GeodesyError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjError {
    #[error("Unknown projection method: {0}")]
    UnknownMethod(String),

    #[error("Transform failed: {0}")]
    TransformFailed(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Inverse not supported by {0}")]
    InverseUnsupported(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeodesyError {
    #[error("Vincenty formula failed to converge after {iterations} iterations")]
    ConvergenceFailure { iterations: usize },
}
