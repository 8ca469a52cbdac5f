//!
//! # Decision tree learning
//! `churnlab-trees` provides pure Rust implementations of decision tree learning for
//! classification.
//!
//! Decision trees are a non-parametric supervised learning method. They predict the value of a
//! target variable by learning simple decision rules inferred from the data features.
//!
//! # Current state
//!
//! `churnlab-trees` provides an [implementation](DecisionTree) of single-tree fitting with
//! Gini or entropy impurity, a text [export](ExportText) of the learned rules and a bagged
//! [random forest](RandomForest) with per-split feature sampling.
//!

mod decision_trees;

pub use decision_trees::*;

pub use decision_trees::random_forest::{RandomForest, RandomForestParams, RandomForestValidParams};

pub use churnlab::error::Result;
