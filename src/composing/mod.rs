//! Composition models
//!
//! This module contains models composed of other models:
//!  * `GridSearch`: select the best value of a hyperparameter by stratified cross-validation
mod grid_search;

pub use grid_search::{CandidateScore, GridSearch, GridSearchResult};
