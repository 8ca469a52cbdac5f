//! Error definitions for preprocessing
use churnlab_datasets::DatasetError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PreprocessingError>;

#[derive(Error, Debug)]
pub enum PreprocessingError {
    #[error("column {0} has to be categorical for one-hot encoding")]
    NotCategorical(String),
    #[error("not enough samples")]
    NotEnoughSamples,
    #[error("fitted on {expected} features, but received {found}")]
    MismatchedFeatures { expected: usize, found: usize },
    #[error(transparent)]
    Table(#[from] DatasetError),
    #[error(transparent)]
    BaseCrate(#[from] churnlab::Error),
}
