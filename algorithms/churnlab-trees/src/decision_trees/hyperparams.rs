use churnlab::{
    error::{Error, Result},
    Float, Label, ParamGuard,
};
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::DecisionTree;

/// The metric used to determine the feature by which a node is split
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitQuality {
    /// Measures the degree of probability of a randomly chosen point in the subtree being misclassified, defined as
    /// one minus the sum over all labels of the squared probability of encountering that label.
    /// The Gini index of the root is given by the weighted sum of the indexes of its two subtrees.
    /// At each step the split is applied to the feature which decreases the most the Gini impurity of the root.
    Gini,
    /// Measures the entropy of a subtree, defined as the sum over all labels of the probability of encountering that label in the
    /// subtree times its logarithm in base two, with negative sign. The entropy of the root minus the weighted sum of the entropy
    /// of its two subtrees defines the "information gain" obtained by applying the split. At each step the split is applied to the
    /// feature with the biggest information gain
    Entropy,
}

/// The number of features considered when looking for the best split of a node
///
/// A fresh random subset of this size is drawn for every node. The resolved number is always at
/// least one and at most the number of features.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaxFeatures {
    /// Every feature is considered
    All,
    /// The square root of the number of features, rounded down
    Sqrt,
    /// The binary logarithm of the number of features, rounded down
    Log2,
    /// A fixed number of features
    Count(usize),
    /// A fraction of the number of features, rounded down
    Fraction(f32),
}

impl MaxFeatures {
    /// Number of features to consider out of `nfeatures`
    pub fn resolve(&self, nfeatures: usize) -> usize {
        let n = match *self {
            MaxFeatures::All => nfeatures,
            MaxFeatures::Sqrt => (nfeatures as f64).sqrt() as usize,
            MaxFeatures::Log2 => (nfeatures as f64).log2() as usize,
            MaxFeatures::Count(n) => n,
            MaxFeatures::Fraction(ratio) => (nfeatures as f32 * ratio) as usize,
        };

        n.max(1).min(nfeatures)
    }
}

/// The set of hyperparameters that can be specified for fitting a
/// [decision tree](struct.DecisionTree.html).
///
/// ### Example
///
/// ```ignore
/// use churnlab_trees::{DecisionTree, SplitQuality};
/// use churnlab::prelude::*;
///
/// // Initialize the default set of parameters
/// let params = DecisionTree::params();
/// // Set the parameters to the desired values
/// let params = params.split_quality(SplitQuality::Entropy).max_depth(Some(5)).min_weight_leaf(2.);
///
/// // Fit the decision tree on the training data
/// let tree = params.fit(&train)?;
/// // Predict on validation and check accuracy
/// let val_accuracy = tree.predict(&val).confusion_matrix(&val)?.accuracy();
/// ```
///
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug)]
pub struct DecisionTreeValidParams<F, L> {
    split_quality: SplitQuality,
    max_depth: Option<usize>,
    min_weight_split: f32,
    min_weight_leaf: f32,
    min_impurity_decrease: F,
    max_features: MaxFeatures,
    seed: u64,

    label_marker: PhantomData<L>,
}

impl<F: Float, L> DecisionTreeValidParams<F, L> {
    pub fn split_quality(&self) -> SplitQuality {
        self.split_quality
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn min_weight_split(&self) -> f32 {
        self.min_weight_split
    }

    pub fn min_weight_leaf(&self) -> f32 {
        self.min_weight_leaf
    }

    pub fn min_impurity_decrease(&self) -> F {
        self.min_impurity_decrease
    }

    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug)]
pub struct DecisionTreeParams<F, L>(DecisionTreeValidParams<F, L>);

impl<F: Float, L: Label> DecisionTreeParams<F, L> {
    pub fn new() -> Self {
        Self(DecisionTreeValidParams {
            split_quality: SplitQuality::Gini,
            max_depth: None,
            min_weight_split: 2.0,
            min_weight_leaf: 1.0,
            min_impurity_decrease: F::cast(0.00001),
            max_features: MaxFeatures::All,
            seed: 0,
            label_marker: PhantomData,
        })
    }

    /// Sets the metric used to decide the feature on which to split a node
    pub fn split_quality(mut self, split_quality: SplitQuality) -> Self {
        self.0.split_quality = split_quality;
        self
    }

    /// Sets the optional limit to the depth of the decision tree
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Sets the minimum weight of samples required to split a node.
    ///
    /// If the observations do not have associated weights, this value represents
    /// the minimum number of samples required to split a node.
    pub fn min_weight_split(mut self, min_weight_split: f32) -> Self {
        self.0.min_weight_split = min_weight_split;
        self
    }

    /// Sets the minimum weight of samples that a split has to place in each leaf
    ///
    /// If the observations do not have associated weights, this value represents
    /// the minimum number of samples that a split has to place in each leaf.
    pub fn min_weight_leaf(mut self, min_weight_leaf: f32) -> Self {
        self.0.min_weight_leaf = min_weight_leaf;
        self
    }

    /// Sets the minimum decrease in impurity that a split needs to bring in order for it to be applied
    pub fn min_impurity_decrease(mut self, min_impurity_decrease: F) -> Self {
        self.0.min_impurity_decrease = min_impurity_decrease;
        self
    }

    /// Sets the number of features drawn at random for every split
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.0.max_features = max_features;
        self
    }

    /// Sets the seed of the feature sampling
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<F: Float, L: Label> Default for DecisionTreeParams<F, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float, L: Label> DecisionTree<F, L> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `split_quality = SplitQuality::Gini`
    /// * `max_depth = None`
    /// * `min_weight_split = 2.0`
    /// * `min_weight_leaf = 1.0`
    /// * `min_impurity_decrease = 0.00001`
    /// * `max_features = MaxFeatures::All`
    /// * `seed = 0`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> DecisionTreeParams<F, L> {
        DecisionTreeParams::new()
    }
}

/// Checks the feature sampling strategy
pub(crate) fn check_max_features(max_features: MaxFeatures) -> Result<()> {
    match max_features {
        MaxFeatures::Count(0) => Err(Error::Parameters(
            "The number of features per split should be positive".to_string(),
        )),
        MaxFeatures::Fraction(ratio) if !(ratio > 0.0 && ratio <= 1.0) => {
            Err(Error::Parameters(format!(
                "The fraction of features per split should be in (0, 1], but was {}",
                ratio
            )))
        }
        _ => Ok(()),
    }
}

impl<F: Float, L> ParamGuard for DecisionTreeParams<F, L> {
    type Checked = DecisionTreeValidParams<F, L>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.min_impurity_decrease < F::epsilon() {
            Err(Error::Parameters(format!(
                "Minimum impurity decrease should be greater than zero, but was {}",
                self.0.min_impurity_decrease
            )))
        } else if self.0.min_weight_leaf < 0.0 || self.0.min_weight_split < 0.0 {
            Err(Error::Parameters(format!(
                "Minimum weights should not be negative, but were {} (split) and {} (leaf)",
                self.0.min_weight_split, self.0.min_weight_leaf
            )))
        } else {
            check_max_features(self.0.max_features)?;
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_max_features() {
        assert_eq!(MaxFeatures::All.resolve(26), 26);
        assert_eq!(MaxFeatures::Sqrt.resolve(26), 5);
        assert_eq!(MaxFeatures::Log2.resolve(26), 4);
        assert_eq!(MaxFeatures::Count(40).resolve(26), 26);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(26), 13);
        // at least one feature is always considered
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(26), 1);
        assert_eq!(MaxFeatures::Log2.resolve(1), 1);
    }

    #[test]
    fn invalid_params() {
        let params = DecisionTree::<f64, bool>::params();

        assert!(params.check_ref().is_ok());
        assert!(params.min_weight_leaf(-1.0).check().is_err());
        assert!(params.max_features(MaxFeatures::Count(0)).check().is_err());
        assert!(params
            .max_features(MaxFeatures::Fraction(1.5))
            .check()
            .is_err());
    }
}
