//! `churnlab-datasets` loads tabular data into the `churnlab` ecosystem.
//!
//! ## The Big Picture
//!
//! Raw customer data arrives as CSV with a mix of numeric and textual columns. This crate reads
//! such a file into a [`Table`] of typed columns, which can be reshaped (columns appended,
//! replaced or dropped) by the preprocessing crate and finally converted into a
//! [`churnlab::Dataset`] with named features and boolean labels.
//!
//! ## Using a table
//!
//! ```ignore
//! let table = churnlab_datasets::read_csv("prepped_churn_data.csv")?;
//! let dataset = table.into_dataset("Churn")?;
//! let (train, test) = dataset.train_test_split(0.2, &mut rng)?;
//! ```

mod error;
mod table;

pub use error::{DatasetError, Result};
pub use table::{read_csv, Column, Table};
