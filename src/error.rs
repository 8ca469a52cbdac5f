//! Error types in churnlab
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error("number of records ({records}) does not match number of targets ({targets})")]
    MismatchedShapes { records: usize, targets: usize },
    #[error("unknown feature {0}")]
    UnknownFeature(String),
    #[error("Not enough samples: {0}")]
    NotEnoughSamples(String),
}
