//! Linear decision trees
//!
use std::collections::{BTreeMap, BTreeSet, HashMap};

use ndarray::{Array1, ArrayBase, Axis, Data, Ix1, Ix2};
use rand::{rngs::SmallRng, seq::index::sample, SeedableRng};

use super::{DecisionTreeValidParams, ExportText, NodeIter, SplitQuality};
use churnlab::{
    dataset::{AsTargets, Records},
    error::{Error, Result},
    traits::*,
    DatasetBase, Float, Label,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// RowMask tracks observations
///
/// The decision tree algorithm splits observations at a certain split value for a specific feature. The
/// left and right children can then only use a certain number of observations. In order to track
/// that, the observations are masked with a boolean vector, hiding all observations which are not
/// applicable in a lower tree.
struct RowMask {
    mask: Vec<bool>,
    nsamples: usize,
}

impl RowMask {
    /// Generates a RowMask without hidden observations
    ///
    /// ### Parameters
    ///
    /// * `nsamples`: the total number of observations
    ///
    fn all(nsamples: usize) -> Self {
        RowMask {
            mask: vec![true; nsamples],
            nsamples,
        }
    }

    /// Generates a RowMask where all observations are hidden
    ///
    /// ### Parameters
    ///
    /// * `nsamples`: the total number of observations
    fn none(nsamples: usize) -> Self {
        RowMask {
            mask: vec![false; nsamples],
            nsamples: 0,
        }
    }

    /// Sets the observation at the specified index as visible
    ///
    /// ### Panics
    ///
    /// If `idx` is out of bounds
    ///
    fn mark(&mut self, idx: usize) {
        self.mask[idx] = true;
        self.nsamples += 1;
    }
}

/// Sorted values of observations with indices (always for a particular feature)
struct SortedIndex<'a, F: Float> {
    feature_name: &'a str,
    sorted_values: Vec<(usize, F)>,
}

impl<'a, F: Float> SortedIndex<'a, F> {
    /// Sorts the values of a given feature in ascending order
    ///
    /// ### Parameters
    ///
    /// * `x`: the observations to sort
    /// * `feature_idx`: the index of the feature on whch to sort the data
    /// * `feature_name`: the human readable name of the feature
    ///
    /// ### Returns
    ///
    /// A sorted vector of (index, value) pairs obtained by sorting the observations by
    /// the value of the specified feature.
    fn of_array_column(
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        feature_idx: usize,
        feature_name: &'a str,
    ) -> Self {
        let sliced_column: Vec<F> = x.index_axis(Axis(1), feature_idx).to_vec();
        let mut pairs: Vec<(usize, F)> = sliced_column.into_iter().enumerate().collect();
        // records are checked to be finite before fitting
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        SortedIndex {
            sorted_values: pairs,
            feature_name,
        }
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone)]
/// A node in the decision tree
pub struct TreeNode<F, L> {
    feature_idx: usize,
    feature_name: String,
    split_value: F,
    impurity_decrease: F,
    weighted_impurity_decrease: F,
    weight: f32,
    left_child: Option<Box<TreeNode<F, L>>>,
    right_child: Option<Box<TreeNode<F, L>>>,
    leaf_node: bool,
    prediction: L,
    class_freq: BTreeMap<L, f32>,
    depth: usize,
}

impl<F: Float, L: Label> TreeNode<F, L> {
    fn empty_leaf(prediction: L, class_freq: BTreeMap<L, f32>, depth: usize, weight: f32) -> Self {
        TreeNode {
            feature_idx: 0,
            feature_name: "".to_string(),
            split_value: F::zero(),
            impurity_decrease: F::zero(),
            weighted_impurity_decrease: F::zero(),
            weight,
            left_child: None,
            right_child: None,
            leaf_node: true,
            prediction,
            class_freq,
            depth,
        }
    }

    /// Returns true if the node has no children
    pub fn is_leaf(&self) -> bool {
        self.leaf_node
    }

    /// Returns the depth of the node in the decision tree
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the total weight of the training samples which reached this node
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Returns `Some(prediction)` for leaf nodes and `None` for internal nodes.
    pub fn prediction(&self) -> Option<L> {
        if self.is_leaf() {
            Some(self.prediction.clone())
        } else {
            None
        }
    }

    /// Returns the weighted class frequencies of the training samples which reached this node
    pub fn class_frequencies(&self) -> &BTreeMap<L, f32> {
        &self.class_freq
    }

    /// Returns the share of each class among the training samples which reached this node
    pub fn class_probabilities(&self) -> BTreeMap<L, f32> {
        let total = self.class_freq.values().sum::<f32>();
        self.class_freq
            .iter()
            .map(|(label, freq)| {
                let p = if total > 0.0 { *freq / total } else { 0.0 };
                (label.clone(), p)
            })
            .collect()
    }

    /// Returns both children, first left then right
    pub fn children(&self) -> Vec<&Option<Box<TreeNode<F, L>>>> {
        vec![&self.left_child, &self.right_child]
    }

    /// Return the split (feature index, value) and its impurity decrease
    pub fn split(&self) -> (usize, F, F) {
        (self.feature_idx, self.split_value, self.impurity_decrease)
    }

    /// Returns the name of the feature used in the split if the node is internal,
    /// `None` otherwise
    pub fn feature_name(&self) -> Option<&String> {
        if self.leaf_node {
            None
        } else {
            Some(&self.feature_name)
        }
    }

    /// Recursively fits the node
    #[allow(clippy::too_many_arguments)]
    fn fit<D: Data<Elem = F>, T: AsTargets<Elem = L>>(
        data: &DatasetBase<ArrayBase<D, Ix2>, T>,
        mask: &RowMask,
        hyperparameters: &DecisionTreeValidParams<F, L>,
        sorted_indices: &[SortedIndex<F>],
        depth: usize,
        total_weight: f32,
        rng: &mut SmallRng,
    ) -> Result<Self> {
        // compute weighted frequencies for target classes
        let parent_class_freq = data.label_frequencies_with_mask(&mask.mask);
        // set our prediction for this subset to the modal class
        let prediction = find_modal_class(&parent_class_freq).ok_or_else(|| {
            Error::NotEnoughSamples("cannot fit a tree node without samples".to_string())
        })?;
        let class_freq = parent_class_freq
            .iter()
            .map(|(label, freq)| (label.clone(), *freq))
            .collect::<BTreeMap<_, _>>();
        let target = data.targets().as_targets();
        let node_weight = parent_class_freq.values().sum::<f32>();

        // return empty leaf when we don't have enough samples or the maximal depth is reached
        if node_weight < hyperparameters.min_weight_split()
            || hyperparameters
                .max_depth()
                .map(|max_depth| depth >= max_depth)
                .unwrap_or(false)
        {
            return Ok(Self::empty_leaf(prediction, class_freq, depth, node_weight));
        }

        let parent_score = impurity(hyperparameters.split_quality(), &parent_class_freq);
        // pure nodes cannot be improved
        if parent_score <= f32::EPSILON {
            return Ok(Self::empty_leaf(prediction, class_freq, depth, node_weight));
        }

        // draw the features which are considered for this node
        let nfeatures = sorted_indices.len();
        let ncandidates = hyperparameters.max_features().resolve(nfeatures);
        let candidates = if ncandidates == nfeatures {
            (0..nfeatures).collect::<Vec<_>>()
        } else {
            let mut candidates = sample(rng, nfeatures, ncandidates).into_vec();
            candidates.sort_unstable();
            candidates
        };

        // Find best split for current level
        let mut best = None;

        for feature_idx in candidates {
            // (index of the observation, value of its `feature_idx` feature) in this subtree
            let values = sorted_indices[feature_idx]
                .sorted_values
                .iter()
                .filter(|(idx, _)| mask.mask[*idx])
                .collect::<Vec<_>>();

            let mut right_class_freq = parent_class_freq.clone();
            let mut left_class_freq = HashMap::new();

            // We keep a running total of the aggregate weight on both sides
            // to avoid having to sum over the hash maps
            let mut weight_on_right_side = node_weight;
            let mut weight_on_left_side = 0.0;

            // We start by putting all available observations in the right subtree
            // and then move the sorted observations one by one to the left subtree
            // and evaluate the quality of the resulting split.
            for pair in values.windows(2) {
                let (presorted_index, value) = *pair[0];
                let (_, next_value) = *pair[1];

                // Target and weight of the current observation
                let sample_class = &target[presorted_index];
                let sample_weight = data.weight_for(presorted_index);

                // Move the observation from the right subtree to the left subtree
                if let Some(freq) = right_class_freq.get_mut(sample_class) {
                    *freq -= sample_weight;
                }
                weight_on_right_side -= sample_weight;

                *left_class_freq.entry(sample_class.clone()).or_insert(0.0) += sample_weight;
                weight_on_left_side += sample_weight;

                // Continue if the next value is equal, so that equal values end up in the same subtree
                if next_value - value <= F::cast(1e-7) {
                    continue;
                }

                // If the split would result in too few samples in a leaf
                // then skip computing the quality
                if weight_on_right_side < hyperparameters.min_weight_leaf()
                    || weight_on_left_side < hyperparameters.min_weight_leaf()
                {
                    continue;
                }

                let left_score = impurity(hyperparameters.split_quality(), &left_class_freq);
                let right_score = impurity(hyperparameters.split_quality(), &right_class_freq);

                // Weight the qualities based on the number of samples in each subset
                let w = weight_on_left_side / node_weight;
                let score = w * left_score + (1.0 - w) * right_score;

                // Take the midpoint from this value and the next one as split_value
                let mut split_value = (value + next_value) / F::cast(2.0);
                if split_value == next_value {
                    split_value = value;
                }

                // override best indices when score improved
                best = match best.take() {
                    None => Some((feature_idx, split_value, score)),
                    Some((_, _, best_score)) if score < best_score => {
                        Some((feature_idx, split_value, score))
                    }
                    x => x,
                };
            }
        }

        // The impurity decrease is `impurity of the node before splitting - impurity of the split`.
        // Without a split candidate or with too little decrease the node becomes a leaf.
        let (best_feature_idx, best_split_value, impurity_decrease) = match best {
            Some((idx, value, best_score)) => (idx, value, F::cast(parent_score - best_score)),
            None => return Ok(Self::empty_leaf(prediction, class_freq, depth, node_weight)),
        };

        if impurity_decrease < hyperparameters.min_impurity_decrease() {
            return Ok(Self::empty_leaf(prediction, class_freq, depth, node_weight));
        }

        // determine new masks for the left and right subtrees
        let mut left_mask = RowMask::none(data.nsamples());
        let mut right_mask = RowMask::none(data.nsamples());

        for i in 0..data.nsamples() {
            if mask.mask[i] {
                if data.records()[(i, best_feature_idx)] <= best_split_value {
                    left_mask.mark(i);
                } else {
                    right_mask.mark(i);
                }
            }
        }

        if left_mask.nsamples == 0 || right_mask.nsamples == 0 {
            return Ok(Self::empty_leaf(prediction, class_freq, depth, node_weight));
        }

        // Recurse and refit on left and right subtrees
        let left_child = TreeNode::fit(
            data,
            &left_mask,
            hyperparameters,
            sorted_indices,
            depth + 1,
            total_weight,
            rng,
        )?;
        let right_child = TreeNode::fit(
            data,
            &right_mask,
            hyperparameters,
            sorted_indices,
            depth + 1,
            total_weight,
            rng,
        )?;

        Ok(TreeNode {
            feature_idx: best_feature_idx,
            feature_name: sorted_indices[best_feature_idx].feature_name.to_owned(),
            split_value: best_split_value,
            impurity_decrease,
            weighted_impurity_decrease: F::cast(node_weight / total_weight) * impurity_decrease,
            weight: node_weight,
            left_child: Some(Box::new(left_child)),
            right_child: Some(Box::new(right_child)),
            leaf_node: false,
            prediction,
            class_freq,
            depth,
        })
    }
}

/// A fitted decision tree model for classification.
///
/// ### Structure
/// A decision tree structure is a binary tree where:
/// * Each internal node specifies a decision, represented by a choice of a feature and a "split value" such that all observations for which
/// `feature <= split_value` is true fall in the left subtree, while the others fall in the right subtree.
///
/// * leaf nodes make predictions, and their prediction is the most popular label in the node. Ties
///   between equally popular labels go to the smallest label.
///
/// ### Algorithm
///
/// Starting with a single root node, decision trees are trained recursively by applying the following rule to every
/// node considered:
///
/// * Find the best split value for each candidate feature of the observations belonging in the node;
/// * Select the feature (and its best split value) that maximizes the quality of the split;
/// * If the score of the split is sufficiently larger than the score of the unsplit node, then two child nodes are generated, the left one
///   containing all observations with `feature <= split value` and the right one containing the rest.
/// * If no suitable split is found, the node is marked as leaf and its prediction is set to be the most common label in the node;
///
/// The [quality score](enum.SplitQuality.html) used can be specified in the [parameters](struct.DecisionTreeParams.html).
///
/// ### Predictions
///
/// To predict the label of a sample, the tree is traversed from the root to a leaf, choosing between left and right children according to
/// the values of the features of the sample. The final prediction for the sample is the prediction of the reached leaf.
///
/// ### Additional constraints
///
/// In order to avoid overfitting the training data, some additional constraints on the quality/quantity of splits can be added to the tree.
/// A description of these additional rules is provided in the [parameters](struct.DecisionTreeParams.html) page.
///
/// ### Example
///
/// Here is an example on how to train a decision tree from its parameters:
///
/// ```ignore
/// use churnlab_trees::DecisionTree;
/// use churnlab::prelude::*;
///
/// // Fit the tree
/// let tree = DecisionTree::params().max_depth(Some(3)).fit(&dataset)?;
/// // Get accuracy on training set
/// let accuracy = tree.predict(&dataset).confusion_matrix(&dataset)?.accuracy();
/// // Print the learned rules
/// println!("{}", tree.export_text());
/// ```
///
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone)]
pub struct DecisionTree<F: Float, L: Label> {
    root_node: TreeNode<F, L>,
    num_features: usize,
    feature_names: Vec<String>,
}

impl<F: Float, L: Label + Default, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<L>>
    for DecisionTree<F, L>
{
    /// Make predictions for each row of a matrix of features `x`.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<L>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = find_leaf(&row, &self.root_node).prediction.clone();
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<L> {
        Array1::default(x.nrows())
    }
}

impl<F: Float, L: Label, D, T> Fit<ArrayBase<D, Ix2>, T, Error> for DecisionTreeValidParams<F, L>
where
    D: Data<Elem = F>,
    T: AsTargets<Elem = L>,
{
    type Object = DecisionTree<F, L>;

    /// Fit a decision tree using `hyperparamters` on the dataset consisting of
    /// a matrix of features `x` and an array of labels `y`.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let x = dataset.records();
        let (nsamples, ntargets) = (x.nsamples(), dataset.targets().as_targets().len());
        if nsamples != ntargets {
            return Err(Error::MismatchedShapes {
                records: nsamples,
                targets: ntargets,
            });
        }
        if nsamples == 0 {
            return Err(Error::NotEnoughSamples(
                "cannot fit a decision tree on an empty dataset".to_string(),
            ));
        }

        if x.iter().any(|value| !value.is_finite()) {
            return Err(Error::Parameters(
                "records contain infinite or NaN values".to_string(),
            ));
        }

        let feature_names = dataset.feature_names();
        let all_idxs = RowMask::all(nsamples);
        let sorted_indices: Vec<_> = (0..(x.ncols()))
            .map(|feature_idx| {
                SortedIndex::of_array_column(x, feature_idx, &feature_names[feature_idx])
            })
            .collect();

        let total_weight = (0..nsamples).map(|idx| dataset.weight_for(idx)).sum::<f32>();
        let mut rng = SmallRng::seed_from_u64(self.seed());

        let root_node = TreeNode::fit(
            dataset,
            &all_idxs,
            self,
            &sorted_indices,
            0,
            total_weight,
            &mut rng,
        )?;

        Ok(DecisionTree {
            root_node,
            num_features: x.ncols(),
            feature_names,
        })
    }
}

impl<F: Float, L: Label> DecisionTree<F, L> {
    /// Create a node iterator in level-order (BFT)
    pub fn iter_nodes(&self) -> NodeIter<'_, F, L> {
        NodeIter::new(&self.root_node)
    }

    /// Return the indices of all features used in a split, in ascending order
    pub fn features(&self) -> Vec<usize> {
        self.iter_nodes()
            .filter(|node| !node.is_leaf())
            .map(|node| node.feature_idx)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Return the feature importance for each feature
    ///
    /// The importance of a feature is the total impurity decrease of all splits on this feature,
    /// each weighted by the share of training samples reaching the split. The importances are
    /// normalized to sum up to one. A tree without any split has zero importance everywhere.
    pub fn feature_importance(&self) -> Vec<F> {
        let mut importance = vec![F::zero(); self.num_features];

        for node in self.iter_nodes().filter(|node| !node.is_leaf()) {
            importance[node.feature_idx] += node.weighted_impurity_decrease;
        }

        let sum = importance.iter().cloned().sum::<F>();
        if sum > F::zero() {
            importance.iter_mut().for_each(|x| *x /= sum);
        }

        importance
    }

    /// Return the class probabilities for each row of `x`
    ///
    /// The probabilities of a row are the weighted class shares among the training samples in
    /// the leaf the row falls into. Classes absent from the leaf are not listed.
    pub fn predict_proba<D: Data<Elem = F>>(&self, x: &ArrayBase<D, Ix2>) -> Vec<BTreeMap<L, f32>> {
        x.rows()
            .into_iter()
            .map(|row| find_leaf(&row, &self.root_node).class_probabilities())
            .collect()
    }

    /// Return root node of the tree
    pub fn root_node(&self) -> &TreeNode<F, L> {
        &self.root_node
    }

    /// Return max depth of the tree
    pub fn max_depth(&self) -> usize {
        self.iter_nodes()
            .fold(0, |max, node| usize::max(max, node.depth))
    }

    /// Return the number of leaves in this tree
    pub fn num_leaves(&self) -> usize {
        self.iter_nodes().filter(|node| node.is_leaf()).count()
    }

    /// Return the number of features the tree was fitted on
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Return the names of the features the tree was fitted on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Generates an [`ExportText`](struct.ExportText.html) structure to print the
    /// rules of the fitted tree as indented text, with the following default parameters:
    ///
    /// * `decimals=2`
    /// * `max_depth=10`
    ///
    pub fn export_text(&self) -> ExportText<'_, F, L> {
        ExportText::new(self)
    }
}

/// Find the leaf reached by the sample `x` when starting from `node`.
fn find_leaf<'a, F: Float, L: Label>(
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    node: &'a TreeNode<F, L>,
) -> &'a TreeNode<F, L> {
    let child = if x[node.feature_idx] <= node.split_value {
        &node.left_child
    } else {
        &node.right_child
    };

    match child {
        Some(child) if !node.leaf_node => find_leaf(x, child),
        _ => node,
    }
}

/// Finds the most frequent class for a hash map of frequencies. If two
/// classes have the same weight then the smallest class is returned.
fn find_modal_class<L: Label>(class_freq: &HashMap<L, f32>) -> Option<L> {
    let mut classes = class_freq.iter().collect::<Vec<_>>();
    classes.sort_by(|a, b| a.0.cmp(b.0));

    classes
        .into_iter()
        .fold(None, |best: Option<(&L, f32)>, (label, freq)| match best {
            Some((_, best_freq)) if best_freq >= *freq => best,
            _ => Some((label, *freq)),
        })
        .map(|(label, _)| label.clone())
}

fn impurity<L: Label>(split_quality: SplitQuality, class_freq: &HashMap<L, f32>) -> f32 {
    match split_quality {
        SplitQuality::Gini => gini_impurity(class_freq),
        SplitQuality::Entropy => entropy(class_freq),
    }
}

/// Given the class frequencies calculates the gini impurity of the subset.
fn gini_impurity<L: Label>(class_freq: &HashMap<L, f32>) -> f32 {
    let n_samples = class_freq.values().sum::<f32>();
    if n_samples <= 0.0 {
        return 0.0;
    }

    let purity = class_freq
        .values()
        .map(|x| x / n_samples)
        .map(|x| x * x)
        .sum::<f32>();

    1.0 - purity
}

/// Given the class frequencies calculates the entropy of the subset.
fn entropy<L: Label>(class_freq: &HashMap<L, f32>) -> f32 {
    let n_samples = class_freq.values().sum::<f32>();
    if n_samples <= 0.0 {
        return 0.0;
    }

    class_freq
        .values()
        .map(|x| x / n_samples)
        .map(|x| if x > 0.0 { -x * x.log2() } else { 0.0 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use churnlab::{error::Result, metrics::ToConfusionMatrix, Dataset, ParamGuard};
    use ndarray::{array, s, Array, Array1, Array2};
    use rand::rngs::SmallRng;

    use ndarray_rand::{rand::SeedableRng, rand_distr::Uniform, RandomExt};

    #[test]
    fn prediction_for_rows_example() {
        let labels = Array::from(vec![0usize, 0, 0, 0, 0, 0, 1, 1]);
        let row_mask = RowMask::all(labels.len());

        let dataset = DatasetBase::new(Array2::<f64>::zeros((8, 1)), labels);
        let class_freq = dataset.label_frequencies_with_mask(&row_mask.mask);

        assert_eq!(find_modal_class(&class_freq), Some(0));
    }

    #[test]
    fn modal_class_ties_go_to_smallest_label() {
        let class_freq: HashMap<usize, f32> =
            vec![(2, 3.0), (1, 3.0), (0, 1.0)].into_iter().collect();
        assert_eq!(find_modal_class(&class_freq), Some(1));

        let class_freq: HashMap<bool, f32> =
            vec![(true, 2.0), (false, 2.0)].into_iter().collect();
        assert_eq!(find_modal_class(&class_freq), Some(false));

        assert_eq!(find_modal_class::<usize>(&HashMap::new()), None);
    }

    #[test]
    fn gini_impurity_example() {
        let class_freq: HashMap<usize, f32> =
            vec![(0, 6.0), (1, 2.0), (2, 0.0)].into_iter().collect();

        // Class 0 occurs 75% of the time
        // Class 1 occurs 25% of the time
        // Class 2 occurs 0% of the time
        // Gini impurity is 1 - 0.75*0.75 - 0.25*0.25 - 0*0 = 0.375
        assert_abs_diff_eq!(gini_impurity(&class_freq), 0.375, epsilon = 1e-5);
    }

    #[test]
    fn entropy_example() {
        let class_freq: HashMap<usize, f32> =
            vec![(0, 6.0), (1, 2.0), (2, 0.0)].into_iter().collect();

        // Class 0 occurs 75% of the time
        // Class 1 occurs 25% of the time
        // Class 2 occurs 0% of the time
        // Entropy is -0.75*log2(0.75) - 0.25*log2(0.25) - 0*log2(0) = 0.81127812
        assert_abs_diff_eq!(entropy(&class_freq), 0.81127, epsilon = 1e-5);

        // If split is perfect then entropy is zero
        let perfect_class_freq: HashMap<usize, f32> =
            vec![(0, 8.0), (1, 0.0), (2, 0.0)].into_iter().collect();

        assert_abs_diff_eq!(entropy(&perfect_class_freq), 0.0, epsilon = 1e-5);
    }

    #[test]
    /// Single feature test
    ///
    /// Generate a dataset where a single feature perfectly correlates
    /// with the target while the remaining features are random gaussian
    /// noise and do not add any information.
    fn single_feature_random_noise_binary() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);

        // generate data with 9 white noise and a single correlated feature
        let mut data = Array::random_using((50, 10), Uniform::new(-4., 4.), &mut rng);
        data.slice_mut(s![.., 8]).assign(
            &(0..50)
                .map(|x| if x < 25 { 0.0 } else { 1.0 })
                .collect::<Array1<_>>(),
        );

        let targets = (0..50).map(|x| x < 25).collect::<Array1<_>>();
        let dataset = Dataset::new(data, targets);

        let model = DecisionTree::params().max_depth(Some(2)).fit(&dataset)?;

        // we should only use feature index 8 here
        assert_eq!(&model.features(), &[8]);
        assert_eq!(model.root_node().split().1, 0.5);

        let ground_truth = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];

        for (imp, truth) in model.feature_importance().iter().zip(&ground_truth) {
            assert_abs_diff_eq!(imp, truth, epsilon = 1e-15);
        }

        // check for perfect accuracy
        let cm = model
            .predict(dataset.records())
            .confusion_matrix(&dataset)?;
        assert_abs_diff_eq!(cm.accuracy(), 1.0, epsilon = 1e-15);

        Ok(())
    }

    #[test]
    /// Check that for random data the max depth is used
    fn check_max_depth() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);

        // create very sparse data
        let data = Array::random_using((50, 50), Uniform::new(-1., 1.), &mut rng);
        let targets = (0..50).collect::<Array1<usize>>();

        let dataset = Dataset::new(data, targets);

        // every sample has its own class, so shallow trees are always filled up
        for max_depth in &[1, 5] {
            let model = DecisionTree::params()
                .max_depth(Some(*max_depth))
                .min_impurity_decrease(1e-10f64)
                .min_weight_split(1e-10)
                .fit(&dataset)?;
            assert_eq!(model.max_depth(), *max_depth);
        }

        for max_depth in &[10, 20] {
            let model = DecisionTree::params()
                .max_depth(Some(*max_depth))
                .fit(&dataset)?;
            assert!(model.max_depth() <= *max_depth);
            assert!(model.num_leaves() <= 50);
        }

        Ok(())
    }

    #[test]
    /// Small perfectly separable dataset test
    ///
    /// This dataset of three elements is perfectly using the second feature.
    fn perfectly_separable_small() -> Result<()> {
        let data = array![[1., 2., 3.], [1., 2., 4.], [1., 3., 3.5]];
        let targets = array![0, 0, 1];

        let dataset = Dataset::new(data.clone(), targets);
        let model = DecisionTree::params().max_depth(Some(1)).fit(&dataset)?;

        assert_eq!(model.predict(&data), array![0, 0, 1]);
        assert_eq!(model.features(), vec![1]);
        assert_eq!(model.num_leaves(), 2);

        Ok(())
    }

    #[test]
    /// Samples on the threshold follow the left branch
    fn threshold_is_inclusive() -> Result<()> {
        let dataset = Dataset::new(
            array![[0.], [1.], [2.], [3.]],
            array![false, false, true, true],
        );
        let model = DecisionTree::params().fit(&dataset)?;

        assert_eq!(model.root_node().split().1, 1.5);
        assert_eq!(
            model.predict(&array![[1.5], [1.5001], [-10.]]),
            array![false, true, false]
        );

        Ok(())
    }

    #[test]
    /// Small toy dataset from scikit-sklearn
    fn toy_dataset() -> Result<()> {
        let data = array![
            [0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 1.0, -14.0, 0.0, -4.0, 0.0, 0.0, 0.0, 0.0,],
            [0.0, 0.0, 5.0, 3.0, 0.0, -4.0, 0.0, 0.0, 1.0, -5.0, 0.2, 0.0, 4.0, 1.0,],
            [-1.0, -1.0, 0.0, 0.0, -4.5, 0.0, 0.0, 2.1, 1.0, 0.0, 0.0, -4.5, 0.0, 1.0,],
            [-1.0, -1.0, 0.0, -1.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.2, 0.0, 0.0, 1.0,],
            [-1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0,],
            [-1.0, -2.0, 0.0, 4.0, -3.0, 10.0, 4.0, 0.0, -3.2, 0.0, 4.0, 3.0, -4.0, 1.0,],
            [2.11, 0.0, -6.0, -0.5, 0.0, 11.0, 0.0, 0.0, -3.2, 6.0, 0.5, 0.0, -3.0, 1.0,],
            [2.11, 0.0, -6.0, -0.5, 0.0, 11.0, 0.0, 0.0, -3.2, 6.0, 0.0, 0.0, -2.0, 1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 11.0, 0.0, 0.0, -3.2, 6.0, 0.0, 0.0, -2.0, 1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 11.0, 0.0, 0.0, -3.2, 6.0, 0.5, 0.0, -1.0, 0.0,],
            [2.0, 8.0, 5.0, 1.0, 0.5, -4.0, 10.0, 0.0, 1.0, -5.0, 3.0, 0.0, 2.0, 0.0,],
            [2.0, 0.0, 1.0, 1.0, 1.0, -1.0, 1.0, 0.0, 0.0, -2.0, 3.0, 0.0, 1.0, 0.0,],
            [2.0, 0.0, 1.0, 2.0, 3.0, -1.0, 10.0, 2.0, 0.0, -1.0, 1.0, 2.0, 2.0, 0.0,],
            [1.0, 1.0, 0.0, 2.0, 2.0, -1.0, 1.0, 2.0, 0.0, -5.0, 1.0, 2.0, 3.0, 0.0,],
            [3.0, 1.0, 0.0, 3.0, 0.0, -4.0, 10.0, 0.0, 1.0, -5.0, 3.0, 0.0, 3.0, 1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 1.0, 0.0, 0.0, -3.2, 6.0, 0.5, 0.0, -3.0, 1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 1.0, 0.0, 0.0, -3.2, 6.0, 1.5, 1.0, -1.0, -1.0,],
            [2.11, 8.0, -6.0, -0.5, 0.0, 10.0, 0.0, 0.0, -3.2, 6.0, 0.5, 0.0, -1.0, -1.0,],
            [2.0, 0.0, 5.0, 1.0, 0.5, -2.0, 10.0, 0.0, 1.0, -5.0, 3.0, 1.0, 0.0, -1.0,],
            [2.0, 0.0, 1.0, 1.0, 1.0, -2.0, 1.0, 0.0, 0.0, -2.0, 0.0, 0.0, 0.0, 1.0,],
            [2.0, 1.0, 1.0, 1.0, 2.0, -1.0, 10.0, 2.0, 0.0, -1.0, 0.0, 2.0, 1.0, 1.0,],
            [1.0, 1.0, 0.0, 0.0, 1.0, -3.0, 1.0, 2.0, 0.0, -5.0, 1.0, 2.0, 1.0, 1.0,],
            [3.0, 1.0, 0.0, 1.0, 0.0, -4.0, 1.0, 0.0, 1.0, -2.0, 0.0, 0.0, 1.0, 0.0,]
        ];

        let targets = array![1, 1, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0];

        let dataset = Dataset::new(data, targets);
        let model = DecisionTree::params().fit(&dataset)?;
        let prediction = model.predict(&dataset);

        let cm = prediction.confusion_matrix(&dataset)?;
        assert!(cm.accuracy() > 0.95);

        // importances of a tree with splits are normalized
        let importance = model.feature_importance();
        assert_eq!(importance.len(), 14);
        assert_abs_diff_eq!(importance.iter().sum::<f64>(), 1.0, epsilon = 1e-10);
        assert!(importance.iter().all(|x| *x >= 0.0));

        Ok(())
    }

    #[test]
    /// Multilabel classification
    fn multilabel_four_uniform() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut data = Array2::random_using((40, 2), Uniform::new(-1., 1.), &mut rng);

        data.outer_iter_mut().enumerate().for_each(|(i, mut p)| {
            if i < 10 {
                p += &array![-2., -2.]
            } else if i < 20 {
                p += &array![-2., 2.];
            } else if i < 30 {
                p += &array![2., -2.];
            } else {
                p += &array![2., 2.];
            }
        });

        let targets = (0..40)
            .map(|x| match x {
                x if x < 10 => 0,
                x if x < 20 => 1,
                x if x < 30 => 2,
                _ => 3,
            })
            .collect::<Array1<_>>();

        let dataset = Dataset::new(data.clone(), targets);

        let model = DecisionTree::params().fit(&dataset)?;
        let prediction = model.predict(&data);

        let cm = prediction.confusion_matrix(&dataset)?;
        assert!(cm.accuracy() > 0.99);

        Ok(())
    }

    #[test]
    /// A constant target cannot be split
    fn single_leaf_has_zero_importance() -> Result<()> {
        let dataset = Dataset::new(
            array![[1., 2.], [3., 4.], [5., 6.]],
            array![true, true, true],
        );
        let model = DecisionTree::params().fit(&dataset)?;

        assert_eq!(model.num_leaves(), 1);
        assert_eq!(model.max_depth(), 0);
        assert_eq!(model.feature_importance(), vec![0.0, 0.0]);
        assert_eq!(model.root_node().prediction(), Some(true));

        Ok(())
    }

    #[test]
    /// Feature sampling is reproducible for a fixed seed
    fn max_features_with_seed() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(7);
        let data = Array::random_using((60, 9), Uniform::new(-1., 1.), &mut rng);
        let targets = data.column(0).mapv(|x| x > 0.0);
        let dataset = Dataset::new(data, targets);

        let params = DecisionTree::params()
            .max_features(crate::MaxFeatures::Sqrt)
            .seed(3);

        let first = params.fit(&dataset)?;
        let second = params.fit(&dataset)?;

        assert_eq!(first.features(), second.features());
        assert_eq!(first.predict(&dataset), second.predict(&dataset));

        Ok(())
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let dataset = Dataset::new(Array2::<f64>::zeros((0, 2)), Array1::<bool>::from(vec![]));
        assert!(DecisionTree::params().fit(&dataset).is_err());
    }

    #[test]
    fn non_finite_records_are_rejected() {
        let dataset = Dataset::new(
            array![[0.], [f64::NAN], [2.], [3.]],
            array![false, false, true, true],
        );
        assert!(DecisionTree::params().fit(&dataset).is_err());

        let dataset = Dataset::new(array![[0.], [f64::INFINITY]], array![false, true]);
        assert!(DecisionTree::params().fit(&dataset).is_err());
    }

    #[test]
    /// Leaves keep the weighted class shares of their training samples
    fn leaf_probabilities() -> Result<()> {
        let dataset = Dataset::new(
            array![[0.], [0.], [0.], [1.], [1.]],
            array![true, true, false, false, false],
        );
        // the first three rows cannot be separated
        let model = DecisionTree::params().fit(&dataset)?;
        let proba = model.predict_proba(&array![[0.], [1.]]);

        assert_abs_diff_eq!(proba[0][&true], 2. / 3., epsilon = 1e-6);
        assert_abs_diff_eq!(proba[0][&false], 1. / 3., epsilon = 1e-6);
        assert_eq!(proba[1].get(&true), None);
        assert_abs_diff_eq!(proba[1][&false], 1.0, epsilon = 1e-6);
        assert_eq!(model.predict(&array![[0.], [1.]]), array![true, false]);

        Ok(())
    }

    #[test]
    #[should_panic]
    /// Check that a small or negative impurity decrease panics
    fn panic_min_impurity_decrease() {
        DecisionTree::<f64, bool>::params()
            .min_impurity_decrease(0.0)
            .check()
            .unwrap();
    }
}
