//! Error definitions for loading tables
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("column {0} does not exist")]
    MissingColumn(String),
    #[error("column {0} already exists")]
    DuplicateColumn(String),
    #[error("column {name} has {found} rows, but the table has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("feature column {0} is categorical and has to be encoded first")]
    CategoricalFeature(String),
    #[error("invalid label {value:?} in column {column} at row {row}")]
    InvalidLabel {
        column: String,
        row: usize,
        value: String,
    },
}
