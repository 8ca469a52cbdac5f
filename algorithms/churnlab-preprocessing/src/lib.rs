//! # Preprocessing
//!
//! `churnlab-preprocessing` turns raw customer tables into purely numeric features.
//!
//! ## Current state
//!
//! * [`OneHotEncoder`]: appends a 0/1 dummy column for every category of a textual column
//! * [`Factorizer`] and [`factorize`]: replaces values by integer codes in order of first appearance
//! * [`NonFiniteReport`]: lists infinite and missing values in a record matrix
//! * [`NonFiniteImputer`]: learns per-feature fill values on training data and replaces every
//!   non-finite entry with them
pub mod error;
mod factorize;
mod non_finite;
mod one_hot;

pub use error::{PreprocessingError, Result};
pub use factorize::{factorize, Factorizer};
pub use non_finite::{FittedNonFiniteImputer, NonFiniteImputer, NonFiniteReport};
pub use one_hot::OneHotEncoder;
