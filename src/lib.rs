//! `churnlab` provides the building blocks of a tabular classification analysis in Rust.
//!
//! Kin in spirit to Python's `scikit-learn`, it covers the steps between a loaded table and a
//! scored model: datasets with named features, train/test splits and (stratified) k-folds,
//! hyperparameter checking, grid search and classification metrics.
//!
//! ## The big picture
//!
//! The algorithms themselves live in separate crates of this workspace:
//!
//! * `churnlab-datasets`: read a CSV file into a typed table and turn it into a [`Dataset`]
//! * `churnlab-preprocessing`: one-hot encoding, factorization and non-finite value imputation
//! * `churnlab-trees`: decision trees and random forests
//!
//! They all share the traits in [`traits`] and the dataset types in [`dataset`].

pub mod composing;
pub mod correlation;
pub mod dataset;
pub mod error;
mod metrics_classification;
pub mod param_guard;
pub mod prelude;
pub mod traits;

#[cfg(feature = "benchmarks")]
pub mod benchmarks;

pub use composing::{GridSearch, GridSearchResult};
pub use dataset::{Dataset, DatasetBase, DatasetView, Float, Label};
pub use error::{Error, Result};
pub use param_guard::ParamGuard;

/// Common metrics functions for classification
pub mod metrics {
    pub use crate::metrics_classification::{
        BinaryClassificationScores, ConfusionMatrix, ToConfusionMatrix,
    };
}
