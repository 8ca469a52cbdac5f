//! # Churn analysis
//!
//! Loads a table of customer records, encodes the categorical columns and compares a decision
//! tree, a tuned decision tree and two random forests on a held out test set.
//!
//! The steps run in a fixed order:
//!
//! 1. load the CSV and one-hot encode `PaymentMethod` and `Contract`
//! 2. split features and labels into a train and a test set
//! 3. report and replace non-finite values
//! 4. fit a shallow decision tree, then tune its depth with a cross-validated grid search
//! 5. correlate every feature with the label
//! 6. fit a random forest on all features and one without the least important ones
//! 7. evaluate the tuned tree and both forests on the test set
//!
//! All constants are part of [`AnalysisConfig`].

pub mod config;
pub mod pipeline;
pub mod report;

pub use config::AnalysisConfig;
pub use pipeline::{encode, run, run_table};
pub use report::{bar_chart, AnalysisReport, Evaluation};
