use super::{DecisionTree, TreeNode};
use churnlab::{Float, Label};
use std::fmt;

/// Struct to print the rules of a fitted decision tree as indented text
///
/// Every internal node prints two lines, one per branch, followed by the rules of the branch:
///
/// ```text
/// |--- tenure <= 17.50
/// |   |--- class: true
/// |--- tenure >  17.50
/// |   |--- class: false
/// ```
///
/// Branches deeper than `max_depth` are summarized by a single "truncated branch" line.
///
/// ### Usage
///
/// ```ignore
/// use churnlab::prelude::*;
/// use churnlab_trees::DecisionTree;
///
/// // Fit the tree
/// let tree = DecisionTree::params().max_depth(Some(3)).fit(&dataset)?;
/// // Export the rules with three decimals
/// let rules = tree.export_text().decimals(3).to_string();
/// ```
pub struct ExportText<'a, F: Float, L: Label> {
    feature_names: Vec<String>,
    decimals: usize,
    max_depth: usize,
    tree: &'a DecisionTree<F, L>,
}

impl<'a, F: Float, L: Label> ExportText<'a, F, L> {
    pub fn new(tree: &'a DecisionTree<F, L>) -> Self {
        ExportText {
            feature_names: tree.feature_names().to_vec(),
            decimals: 2,
            max_depth: 10,
            tree,
        }
    }

    /// Replace the feature names the tree was fitted with
    pub fn feature_names<I: Into<String>>(mut self, names: Vec<I>) -> Self {
        self.feature_names = names.into_iter().map(|x| x.into()).collect();

        self
    }

    /// The number of decimals printed for thresholds
    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;

        self
    }

    /// The deepest level of the tree which is printed
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;

        self
    }

    fn feature_name(&self, node: &TreeNode<F, L>) -> String {
        let (idx, _, _) = node.split();
        self.feature_names
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("feature_{}", idx))
    }
}

impl<'a, F: Float, L: Label + fmt::Display> ExportText<'a, F, L> {
    fn format_node(&self, f: &mut fmt::Formatter, node: &TreeNode<F, L>) -> fmt::Result {
        // the root prints its branches at level one
        let level = node.depth() + 1;
        let indent = format!("{}|---", "|   ".repeat(level - 1));

        if level > self.max_depth + 1 {
            let depth = subtree_depth(node);
            return match node.prediction() {
                Some(prediction) if depth == 1 => writeln!(f, "{} class: {}", indent, prediction),
                _ => writeln!(f, "{} truncated branch of depth {}", indent, depth),
            };
        }

        match node.prediction() {
            Some(prediction) => writeln!(f, "{} class: {}", indent, prediction),
            None => {
                let name = self.feature_name(node);
                let (_, threshold, _) = node.split();
                let children = node.children();

                writeln!(f, "{} {} <= {:.*}", indent, name, self.decimals, threshold)?;
                if let Some(left) = children[0] {
                    self.format_node(f, left)?;
                }
                writeln!(f, "{} {} >  {:.*}", indent, name, self.decimals, threshold)?;
                if let Some(right) = children[1] {
                    self.format_node(f, right)?;
                }

                Ok(())
            }
        }
    }
}

/// Number of levels below and including `node`
fn subtree_depth<F: Float, L: Label>(node: &TreeNode<F, L>) -> usize {
    1 + node
        .children()
        .into_iter()
        .filter_map(|x| x.as_deref())
        .map(subtree_depth)
        .max()
        .unwrap_or(0)
}

impl<'a, F: Float, L: Label + fmt::Display> fmt::Display for ExportText<'a, F, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.format_node(f, self.tree.root_node())
    }
}
