//! Random Forest Classifier
//!
//! An ensemble of decision trees, each fitted on a bootstrapped sample of the data and
//! considering a random subset of the features at every split.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use churnlab::{
    dataset::DatasetBase,
    error::{Error, Result},
    traits::{Fit, PredictInplace},
    Float, Label, ParamGuard,
};
use ndarray::{Array1, ArrayBase, Data, Ix1, Ix2};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::debug;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::hyperparams::check_max_features;
use super::{DecisionTree, MaxFeatures, SplitQuality};

/// A fitted random forest
///
/// Predictions are the class with the highest mean probability over all trees. If two classes
/// are equally probable, the smallest label wins.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone)]
pub struct RandomForest<F: Float, L: Label> {
    trees: Vec<DecisionTree<F, L>>,
    num_features: usize,
    feature_names: Vec<String>,
}

/// The checked hyperparameters of a [random forest](struct.RandomForest.html)
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug)]
pub struct RandomForestValidParams<F, L> {
    n_trees: usize,
    max_depth: Option<usize>,
    max_features: MaxFeatures,
    bootstrap: bool,
    split_quality: SplitQuality,
    min_weight_split: f32,
    min_weight_leaf: f32,
    seed: u64,

    marker: PhantomData<(F, L)>,
}

impl<F, L> RandomForestValidParams<F, L> {
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub fn split_quality(&self) -> SplitQuality {
        self.split_quality
    }

    pub fn min_weight_split(&self) -> f32 {
        self.min_weight_split
    }

    pub fn min_weight_leaf(&self) -> f32 {
        self.min_weight_leaf
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// The set of hyperparameters of a [random forest](struct.RandomForest.html)
///
/// ### Example
///
/// ```ignore
/// use churnlab_trees::RandomForest;
/// use churnlab::prelude::*;
///
/// let forest = RandomForest::params().n_trees(100).seed(42).fit(&train)?;
/// let accuracy = forest.predict(&test).confusion_matrix(&test)?.accuracy();
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug)]
pub struct RandomForestParams<F, L>(RandomForestValidParams<F, L>);

impl<F: Float, L: Label> RandomForestParams<F, L> {
    pub fn new() -> Self {
        Self(RandomForestValidParams {
            n_trees: 100,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            split_quality: SplitQuality::Gini,
            min_weight_split: 2.0,
            min_weight_leaf: 1.0,
            seed: 42,
            marker: PhantomData,
        })
    }

    /// Sets the number of trees in the forest
    pub fn n_trees(mut self, n_trees: usize) -> Self {
        self.0.n_trees = n_trees;
        self
    }

    /// Sets the optional limit to the depth of every tree
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Sets the number of features drawn at random for every split
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.0.max_features = max_features;
        self
    }

    /// Whether every tree is fitted on a bootstrap sample instead of the whole dataset
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.0.bootstrap = bootstrap;
        self
    }

    /// Sets the metric used to decide the feature on which to split a node
    pub fn split_quality(mut self, split_quality: SplitQuality) -> Self {
        self.0.split_quality = split_quality;
        self
    }

    /// Sets the minimum weight of samples required to split a node
    pub fn min_weight_split(mut self, min_weight_split: f32) -> Self {
        self.0.min_weight_split = min_weight_split;
        self
    }

    /// Sets the minimum weight of samples that a split has to place in each leaf
    pub fn min_weight_leaf(mut self, min_weight_leaf: f32) -> Self {
        self.0.min_weight_leaf = min_weight_leaf;
        self
    }

    /// Sets the seed from which the samples and features of every tree are drawn
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<F: Float, L: Label> Default for RandomForestParams<F, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float, L: Label> RandomForest<F, L> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `n_trees = 100`
    /// * `max_depth = None`
    /// * `max_features = MaxFeatures::Sqrt`
    /// * `bootstrap = true`
    /// * `split_quality = SplitQuality::Gini`
    /// * `min_weight_split = 2.0`
    /// * `min_weight_leaf = 1.0`
    /// * `seed = 42`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> RandomForestParams<F, L> {
        RandomForestParams::new()
    }
}

impl<F: Float, L> ParamGuard for RandomForestParams<F, L> {
    type Checked = RandomForestValidParams<F, L>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_trees == 0 {
            return Err(Error::Parameters(
                "The number of trees should be positive".to_string(),
            ));
        }
        if self.0.min_weight_leaf < 0.0 || self.0.min_weight_split < 0.0 {
            return Err(Error::Parameters(format!(
                "Minimum weights should not be negative, but were {} (split) and {} (leaf)",
                self.0.min_weight_split, self.0.min_weight_leaf
            )));
        }
        check_max_features(self.0.max_features)?;

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float, L: Label, D, S> Fit<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>, Error>
    for RandomForestValidParams<F, L>
where
    D: Data<Elem = F>,
    S: Data<Elem = L>,
{
    type Object = RandomForest<F, L>;

    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>,
    ) -> Result<Self::Object> {
        let nsamples = dataset.nsamples();
        let ntargets = dataset.targets().len();
        if nsamples != ntargets {
            return Err(Error::MismatchedShapes {
                records: nsamples,
                targets: ntargets,
            });
        }
        if nsamples == 0 {
            return Err(Error::NotEnoughSamples(
                "cannot fit a random forest on an empty dataset".to_string(),
            ));
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let all_rows = (0..nsamples).collect::<Vec<_>>();
        let mut trees = Vec::with_capacity(self.n_trees);

        for idx in 0..self.n_trees {
            let tree_seed = rng.gen::<u64>();

            // draw rows with replacement
            let sample = if self.bootstrap {
                let rows = (0..nsamples)
                    .map(|_| rng.gen_range(0..nsamples))
                    .collect::<Vec<_>>();
                dataset.select_rows(&rows)
            } else {
                dataset.select_rows(&all_rows)
            };

            let tree = DecisionTree::params()
                .split_quality(self.split_quality)
                .max_depth(self.max_depth)
                .min_weight_split(self.min_weight_split)
                .min_weight_leaf(self.min_weight_leaf)
                .max_features(self.max_features)
                .seed(tree_seed)
                .check()?
                .fit(&sample)?;
            debug!(
                "fitted tree {} of {}: depth {}, {} leaves",
                idx + 1,
                self.n_trees,
                tree.max_depth(),
                tree.num_leaves()
            );

            trees.push(tree);
        }

        Ok(RandomForest {
            trees,
            num_features: dataset.nfeatures(),
            feature_names: dataset.feature_names(),
        })
    }
}

impl<F: Float, L: Label + Default, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<L>>
    for RandomForest<F, L>
{
    /// Predict the most probable class for each row of `x`
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<L>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        for (proba, target) in self.predict_proba(x).into_iter().zip(y.iter_mut()) {
            // classes are visited in ascending order, so ties keep the smallest one
            let winner = proba
                .into_iter()
                .fold(None, |best: Option<(L, f32)>, (label, p)| match best {
                    Some((_, best_p)) if best_p >= p => best,
                    _ => Some((label, p)),
                });

            if let Some((label, _)) = winner {
                *target = label;
            }
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<L> {
        Array1::default(x.nrows())
    }
}

impl<F: Float, L: Label> RandomForest<F, L> {
    /// Return the class probabilities for each row of `x`
    ///
    /// These are the class probabilities of all trees, averaged. A class which does not occur
    /// in the leaf of a tree counts as zero for that tree.
    pub fn predict_proba<D: Data<Elem = F>>(&self, x: &ArrayBase<D, Ix2>) -> Vec<BTreeMap<L, f32>> {
        let mut proba = vec![BTreeMap::new(); x.nrows()];

        for tree in &self.trees {
            for (total, tree_proba) in proba.iter_mut().zip(tree.predict_proba(x)) {
                for (label, p) in tree_proba {
                    *total.entry(label).or_insert(0.0) += p;
                }
            }
        }

        let ntrees = self.trees.len() as f32;
        for row in proba.iter_mut() {
            row.values_mut().for_each(|p| *p /= ntrees);
        }

        proba
    }

    /// The fitted trees
    pub fn trees(&self) -> &[DecisionTree<F, L>] {
        &self.trees
    }

    /// Names of the features the forest was fitted on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Return the feature importance for each feature
    ///
    /// This is the mean of the importances of all trees with at least one split, normalized to
    /// sum up to one.
    pub fn feature_importance(&self) -> Vec<F> {
        let mut importance = vec![F::zero(); self.num_features];
        let mut ntrees = 0;

        for tree in self.trees.iter().filter(|tree| tree.num_leaves() > 1) {
            for (total, value) in importance.iter_mut().zip(tree.feature_importance()) {
                *total += value;
            }
            ntrees += 1;
        }

        if ntrees > 0 {
            let ntrees = F::cast(ntrees);
            importance.iter_mut().for_each(|x| *x /= ntrees);
        }

        let sum = importance.iter().cloned().sum::<F>();
        if sum > F::zero() {
            importance.iter_mut().for_each(|x| *x /= sum);
        }

        importance
    }
}
