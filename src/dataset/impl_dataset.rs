use std::collections::HashMap;

use super::{AsTargets, Dataset, DatasetBase, DatasetView, Float, Label, Records};
use crate::error::{Error, Result};
use ndarray::{Array1, ArrayBase, Axis, Data, Ix1, Ix2};
use rand::{seq::SliceRandom, Rng};
use tracing::warn;

/// Implementation without constraints on records and targets
///
/// This implementation block provides methods for the creation and mutation of datasets. This
/// includes swapping the targets, return the records etc.
impl<R, T> DatasetBase<R, T> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = Dataset::new(records, targets);
    /// ```
    pub fn new(records: R, targets: T) -> DatasetBase<R, T> {
        DatasetBase {
            records,
            targets,
            weights: Array1::zeros(0),
            feature_names: Vec::new(),
        }
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &T {
        &self.targets
    }

    /// Returns reference to records
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Return optional weights for all records
    pub fn weights(&self) -> Option<&[f32]> {
        if !self.weights.is_empty() {
            self.weights.as_slice()
        } else {
            None
        }
    }

    /// Return a single weight
    ///
    /// The weight of the `idx`th observation is returned. If no weight is specified, then all
    /// observations are unweighted with default value `1.0`.
    pub fn weight_for(&self, idx: usize) -> f32 {
        self.weights.get(idx).copied().unwrap_or(1.0)
    }

    /// Updates the weights of a dataset
    pub fn with_weights(mut self, weights: Array1<f32>) -> DatasetBase<R, T> {
        self.weights = weights;

        self
    }

    /// Updates the feature names of a dataset
    pub fn with_feature_names<I: Into<String>>(mut self, names: Vec<I>) -> DatasetBase<R, T> {
        self.feature_names = names.into_iter().map(|x| x.into()).collect();

        self
    }
}

impl<R: Records, T> DatasetBase<R, T> {
    /// Number of samples in the dataset
    pub fn nsamples(&self) -> usize {
        self.records.nsamples()
    }

    /// Number of features in the dataset
    pub fn nfeatures(&self) -> usize {
        self.records.nfeatures()
    }

    /// Returns feature names
    ///
    /// A feature name gives a human-readable string describing the purpose of a single feature.
    /// If no names were attached to the dataset, placeholders `feature-{i}` are generated.
    pub fn feature_names(&self) -> Vec<String> {
        if !self.feature_names.is_empty() {
            self.feature_names.clone()
        } else {
            (0..self.records.nfeatures())
                .map(|idx| format!("feature-{}", idx))
                .collect()
        }
    }
}

impl<R: Records, T: AsTargets> DatasetBase<R, T> {
    /// Create a new dataset and check that records and targets have the same number of samples
    pub fn try_new(records: R, targets: T) -> Result<DatasetBase<R, T>> {
        let (nrecords, ntargets) = (records.nsamples(), targets.as_targets().len());
        if nrecords != ntargets {
            return Err(Error::MismatchedShapes {
                records: nrecords,
                targets: ntargets,
            });
        }

        Ok(DatasetBase::new(records, targets))
    }
}

impl<R: Records, T: AsTargets> DatasetBase<R, T>
where
    T::Elem: Label,
{
    /// Calculates label frequencies from a dataset while masking certain samples.
    ///
    /// ### Parameters
    ///
    /// * `mask`: a boolean array that specifies which samples to include in the count
    ///
    /// ### Returns
    ///
    /// A mapping of the Dataset's samples to their frequencies
    pub fn label_frequencies_with_mask(&self, mask: &[bool]) -> HashMap<T::Elem, f32> {
        let mut freqs = HashMap::new();

        for (idx, label) in self
            .targets
            .as_targets()
            .iter()
            .enumerate()
            .filter(|(idx, _)| mask[*idx])
        {
            *freqs.entry(label.clone()).or_insert(0.0) += self.weight_for(idx);
        }

        freqs
    }

    /// Calculates label frequencies from a dataset
    pub fn label_frequencies(&self) -> HashMap<T::Elem, f32> {
        self.label_frequencies_with_mask(&vec![true; self.nsamples()])
    }
}

impl<F: Float, L: Clone, D, S> DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>
where
    D: Data<Elem = F>,
    S: Data<Elem = L>,
{
    /// Creates a view of a dataset
    pub fn view(&self) -> DatasetView<'_, F, L> {
        DatasetBase {
            records: self.records.view(),
            targets: self.targets.view(),
            weights: self.weights.clone(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Copy the selected samples into a new dataset
    ///
    /// Samples appear in the order of `indices`, weights and feature names are carried over.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset<F, L> {
        let weights = if self.weights.is_empty() {
            Array1::zeros(0)
        } else {
            self.weights.select(Axis(0), indices)
        };

        DatasetBase {
            records: self.records.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
            weights,
            feature_names: self.feature_names.clone(),
        }
    }

    /// Copy the selected features into a new dataset
    pub fn select_features(&self, indices: &[usize]) -> Dataset<F, L> {
        let names = self.feature_names();

        DatasetBase {
            records: self.records.select(Axis(1), indices),
            targets: self.targets.to_owned(),
            weights: self.weights.clone(),
            feature_names: indices.iter().map(|idx| names[*idx].clone()).collect(),
        }
    }

    /// Remove the named features from the dataset
    ///
    /// Returns `Error::UnknownFeature` if one of the names is not part of the dataset.
    pub fn drop_features<N: AsRef<str>>(&self, names: &[N]) -> Result<Dataset<F, L>> {
        let feature_names = self.feature_names();

        for name in names {
            if !feature_names.iter().any(|x| x == name.as_ref()) {
                return Err(Error::UnknownFeature(name.as_ref().to_string()));
            }
        }

        let keep = feature_names
            .iter()
            .enumerate()
            .filter(|(_, feature)| !names.iter().any(|name| name.as_ref() == feature.as_str()))
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();

        Ok(self.select_features(&keep))
    }

    /// Shuffles the samples of a dataset
    pub fn shuffle<RNG: Rng>(&self, rng: &mut RNG) -> Dataset<F, L> {
        let mut indices = (0..self.nsamples()).collect::<Vec<_>>();
        indices.shuffle(rng);

        self.select_rows(&indices)
    }

    /// Split dataset into two disjoint chunks
    ///
    /// This function splits the observations in a dataset into two disjoint chunks. The splitting
    /// threshold is calculated with the `ratio`. For example a ratio of `0.9` allocates 90% to the
    /// first chunk and 10% to the second. This is often used in training, validation splitting
    /// procedures.
    pub fn split_with_ratio(&self, ratio: f32) -> (Dataset<F, L>, Dataset<F, L>) {
        let n = (self.nsamples() as f32 * ratio).ceil() as usize;
        let first = (0..n).collect::<Vec<_>>();
        let second = (n..self.nsamples()).collect::<Vec<_>>();

        (self.select_rows(&first), self.select_rows(&second))
    }

    /// Shuffle and split the dataset into a training and a test set
    ///
    /// The test set receives `ceil(nsamples * test_size)` samples drawn from a random
    /// permutation, the training set receives the remaining ones in permutation order.
    pub fn train_test_split<RNG: Rng>(
        &self,
        test_size: f64,
        rng: &mut RNG,
    ) -> Result<(Dataset<F, L>, Dataset<F, L>)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(Error::Parameters(format!(
                "test size should be in (0, 1), but was {}",
                test_size
            )));
        }

        let nsamples = self.nsamples();
        let ntest = (nsamples as f64 * test_size).ceil() as usize;
        if ntest == 0 || ntest >= nsamples {
            return Err(Error::NotEnoughSamples(format!(
                "cannot split {} samples with a test size of {}",
                nsamples, test_size
            )));
        }

        let mut permutation = (0..nsamples).collect::<Vec<_>>();
        permutation.shuffle(rng);
        let (test, train) = permutation.split_at(ntest);

        Ok((self.select_rows(train), self.select_rows(test)))
    }

    /// Create K-folds with contiguous validation sets
    ///
    /// The first `nsamples % k` folds receive one more validation sample than the others. Each
    /// training set contains all remaining samples in their original order.
    pub fn fold(&self, k: usize) -> Result<Vec<(Dataset<F, L>, Dataset<F, L>)>> {
        let nsamples = self.nsamples();
        check_folds(k, nsamples)?;

        let mut assignment = Vec::with_capacity(nsamples);
        for fold in 0..k {
            let size = nsamples / k + usize::from(fold < nsamples % k);
            assignment.extend(std::iter::repeat(fold).take(size));
        }

        Ok(self.folds_from_assignment(&assignment, k))
    }

    fn folds_from_assignment(
        &self,
        assignment: &[usize],
        k: usize,
    ) -> Vec<(Dataset<F, L>, Dataset<F, L>)> {
        (0..k)
            .map(|fold| {
                let (validation, training): (Vec<usize>, Vec<usize>) =
                    (0..assignment.len()).partition(|idx| assignment[*idx] == fold);

                (self.select_rows(&training), self.select_rows(&validation))
            })
            .collect()
    }
}

impl<F: Float, L: Label, D, S> DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>
where
    D: Data<Elem = F>,
    S: Data<Elem = L>,
{
    /// Create stratified K-folds
    ///
    /// Samples are not shuffled. Classes are ordered by their first appearance and each fold
    /// receives the samples of a class in contiguous blocks, sized such that every fold keeps
    /// approximately the class proportions of the whole dataset.
    pub fn stratified_fold(&self, k: usize) -> Result<Vec<(Dataset<F, L>, Dataset<F, L>)>> {
        let nsamples = self.nsamples();
        check_folds(k, nsamples)?;

        // encode labels by order of first appearance
        let mut classes: Vec<L> = Vec::new();
        let encoded = self
            .targets
            .iter()
            .map(|label| match classes.iter().position(|x| x == label) {
                Some(idx) => idx,
                None => {
                    classes.push(label.clone());
                    classes.len() - 1
                }
            })
            .collect::<Vec<_>>();

        let mut counts = vec![0; classes.len()];
        for class in &encoded {
            counts[*class] += 1;
        }
        if counts.iter().all(|count| *count < k) {
            return Err(Error::Parameters(format!(
                "number of folds {} cannot be greater than the number of members in each class",
                k
            )));
        }
        if let Some(smallest) = counts.iter().min().filter(|count| **count < k) {
            warn!(
                "the least populated class has only {} members, which is less than {} folds",
                smallest, k
            );
        }

        // interleave the sorted class codes to find the number of samples per fold and class
        let mut sorted = encoded.clone();
        sorted.sort_unstable();
        let mut allocation = vec![vec![0usize; classes.len()]; k];
        for (idx, class) in sorted.iter().enumerate() {
            allocation[idx % k][*class] += 1;
        }

        let mut assignment = vec![0; nsamples];
        for class in 0..classes.len() {
            let folds_for_class = (0..k)
                .flat_map(|fold| std::iter::repeat(fold).take(allocation[fold][class]))
                .collect::<Vec<_>>();

            let members = encoded
                .iter()
                .enumerate()
                .filter(|(_, x)| **x == class)
                .map(|(idx, _)| idx);

            for (idx, fold) in members.zip(folds_for_class) {
                assignment[idx] = fold;
            }
        }

        Ok(self.folds_from_assignment(&assignment, k))
    }
}

fn check_folds(k: usize, nsamples: usize) -> Result<()> {
    if k < 2 {
        return Err(Error::Parameters(format!(
            "number of folds should be at least 2, but was {}",
            k
        )));
    }
    if k > nsamples {
        return Err(Error::NotEnoughSamples(format!(
            "cannot create {} folds from {} samples",
            k, nsamples
        )));
    }

    Ok(())
}
