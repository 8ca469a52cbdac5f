//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ScalarOperand};

use num_traits::{AsPrimitive, FromPrimitive, NumAssignOps, NumCast, Signed};
use rand::distributions::uniform::SampleUniform;

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::Sum;

mod impl_dataset;
mod impl_records;
mod impl_targets;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in the records of a
/// dataset.
pub trait Float:
    FromPrimitive
    + num_traits::Float
    + PartialOrd
    + Sync
    + Send
    + Default
    + fmt::Display
    + fmt::Debug
    + Signed
    + Sum
    + NumAssignOps
    + AsPrimitive<usize>
    + SampleUniform
    + ScalarOperand
    + approx::AbsDiffEq
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}

/// Discrete labels
///
/// Labels are countable, comparable, ordered and hashable. The ordering is used to break ties
/// deterministically, e.g. when two classes are equally frequent in a leaf. Currently
/// boolean (binary task), usize and strings (multi-class tasks) are supported.
pub trait Label: PartialEq + Eq + Hash + Clone + Ord + fmt::Debug {}

impl Label for bool {}
impl Label for usize {}
impl Label for String {}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and may contain targets, weights and feature names. In order to keep the type complexity low
/// the dataset base is only generic over the records and targets. `weights` and
/// `feature_names`, on the other hand, are always owned and copied when views are created.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, nfeatures)
/// * `targets`: a one-dimensional array with one label per sample
/// * `weights`: optional weights for each sample with dimensionality (nsamples)
/// * `feature_names`: optional descriptive feature names with dimensionality (nfeatures)
#[derive(Debug, Clone)]
pub struct DatasetBase<R, T> {
    pub records: R,
    pub targets: T,

    pub weights: Array1<f32>,
    feature_names: Vec<String>,
}

/// Dataset
///
/// The most commonly used type of dataset. It contains a number of records stored as an
/// `Array2` and a single target per record stored as an `Array1`.
pub type Dataset<F, L> = DatasetBase<Array2<F>, Array1<L>>;

/// DatasetView
///
/// A read only view of a Dataset
pub type DatasetView<'a, F, L> = DatasetBase<ArrayView2<'a, F>, ArrayView1<'a, L>>;

/// Record trait
pub trait Records: Sized {
    type Elem;

    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}

/// Return a reference to the single target variable
pub trait AsTargets {
    type Elem;

    /// Returns a view on the targets
    fn as_targets(&self) -> ArrayView1<'_, Self::Elem>;
}

/// Get the labels in all targets
pub trait Labels {
    type Elem: Label;

    fn label_count(&self) -> HashMap<Self::Elem, usize>;

    /// Distinct labels in ascending order
    fn labels(&self) -> Vec<Self::Elem> {
        let mut labels = self.label_count().into_keys().collect::<Vec<_>>();
        labels.sort();
        labels
    }
}

impl<F: Float, L> From<(Array2<F>, Array1<L>)> for Dataset<F, L> {
    fn from(rec_tar: (Array2<F>, Array1<L>)) -> Self {
        DatasetBase::new(rec_tar.0, rec_tar.1)
    }
}
