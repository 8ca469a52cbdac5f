//! Provide traits for different classes of algorithms
//!

use crate::dataset::{DatasetBase, Records};
use ndarray::{ArrayBase, Data, Ix2};

/// Transformation algorithms
///
/// A transformer takes a dataset and transforms it into a different one. It has no concept of
/// state and provides therefore no method to predict new data. A typical example are kernel
/// methods or imputers whose statistics were learned beforehand.
pub trait Transformer<R, T> {
    fn transform(&self, x: R) -> T;
}

/// Fittable algorithms
///
/// A fittable algorithm takes a dataset and creates a concept of some kind about it. For example
/// in a decision tree the fitted model holds the learned split rules.
pub trait Fit<R: Records, T, E: std::error::Error + From<crate::error::Error>> {
    type Object;

    fn fit(&self, dataset: &DatasetBase<R, T>) -> Result<Self::Object, E>;
}

/// Predict with model into a mutable reference of targets.
pub trait PredictInplace<R: Records, T> {
    /// Predict something in place
    fn predict_inplace<'a>(&'a self, x: &'a R, y: &mut T);

    /// Create targets that `predict_inplace` works with.
    fn default_target(&self, x: &R) -> T;
}

/// Predict with model
///
/// This trait assumes the `PredictInplace` implementation and provides additional input/output
/// combinations.
///
/// # Provided implementation
///
/// * `&ArrayBase<D, Ix2>` -> `T`
/// * `&DatasetBase<ArrayBase<D, Ix2>, T>` -> `T`
pub trait Predict<R, T> {
    fn predict(&self, x: R) -> T;
}

impl<'a, D, T, O> Predict<&'a ArrayBase<D, Ix2>, T> for O
where
    D: Data,
    ArrayBase<D, Ix2>: Records,
    O: PredictInplace<ArrayBase<D, Ix2>, T>,
{
    fn predict(&self, records: &'a ArrayBase<D, Ix2>) -> T {
        let mut targets = self.default_target(records);
        self.predict_inplace(records, &mut targets);
        targets
    }
}

impl<'a, D, S, T, O> Predict<&'a DatasetBase<ArrayBase<D, Ix2>, S>, T> for O
where
    D: Data,
    ArrayBase<D, Ix2>: Records,
    O: PredictInplace<ArrayBase<D, Ix2>, T>,
{
    fn predict(&self, dataset: &'a DatasetBase<ArrayBase<D, Ix2>, S>) -> T {
        let records = dataset.records();
        let mut targets = self.default_target(records);
        self.predict_inplace(records, &mut targets);
        targets
    }
}
