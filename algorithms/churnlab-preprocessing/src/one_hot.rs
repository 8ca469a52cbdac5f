//! One-hot encoding of categorical table columns

use std::collections::BTreeSet;

use churnlab::traits::Transformer;
use churnlab_datasets::{Column, Table};
use tracing::debug;

use crate::error::{PreprocessingError, Result};

/// Creates dummy columns for categorical values
///
/// For every encoded column a numeric indicator column is appended per distinct category, in
/// sorted category order. The dummy column is named after the category and holds `1.0` where
/// the row has that category and `0.0` elsewhere. Empty cells are treated as missing and have
/// no dummy column. The source columns stay in the table.
///
/// ### Example
///
/// ```ignore
/// let table = OneHotEncoder::new(&["PaymentMethod", "Contract"]).transform(table)?;
/// ```
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    columns: Vec<String>,
}

impl OneHotEncoder {
    pub fn new<N: AsRef<str>>(columns: &[N]) -> Self {
        OneHotEncoder {
            columns: columns.iter().map(|x| x.as_ref().to_string()).collect(),
        }
    }

    /// Names of the columns which are encoded
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Transformer<Table, Result<Table>> for OneHotEncoder {
    fn transform(&self, mut table: Table) -> Result<Table> {
        for name in &self.columns {
            let values = table
                .column(name)?
                .as_categorical()
                .ok_or_else(|| PreprocessingError::NotCategorical(name.clone()))?
                .to_vec();

            let categories = values
                .iter()
                .filter(|x| !x.trim().is_empty())
                .collect::<BTreeSet<_>>();
            debug!("{} has {} categories", name, categories.len());

            for category in categories {
                let dummy = values
                    .iter()
                    .map(|x| if x == category { 1.0 } else { 0.0 })
                    .collect();
                table.push_column(category.clone(), Column::Numeric(dummy))?;
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use churnlab_datasets::DatasetError;

    fn table() -> Table {
        let csv = "\
tenure,Contract,PaymentMethod
1,Month-to-month,Mailed check
2,Two year,Electronic check
3,One year,
4,Month-to-month,Mailed check
";
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn appends_sorted_dummy_columns() -> Result<()> {
        let encoded = OneHotEncoder::new(&["Contract", "PaymentMethod"]).transform(table())?;

        assert_eq!(
            encoded.column_names(),
            &[
                "tenure",
                "Contract",
                "PaymentMethod",
                "Month-to-month",
                "One year",
                "Two year",
                "Electronic check",
                "Mailed check"
            ]
        );
        assert_eq!(
            encoded.column("Month-to-month")?,
            &Column::Numeric(vec![1., 0., 0., 1.])
        );
        // the missing payment method has no dummy set
        assert_eq!(
            encoded.column("Mailed check")?,
            &Column::Numeric(vec![1., 0., 0., 1.])
        );
        assert_eq!(
            encoded.column("Electronic check")?,
            &Column::Numeric(vec![0., 1., 0., 0.])
        );

        Ok(())
    }

    #[test]
    fn rejects_numeric_and_missing_columns() {
        let result = OneHotEncoder::new(&["tenure"]).transform(table());
        assert!(matches!(result, Err(PreprocessingError::NotCategorical(name)) if name == "tenure"));

        let result = OneHotEncoder::new(&["gender"]).transform(table());
        assert!(matches!(
            result,
            Err(PreprocessingError::Table(DatasetError::MissingColumn(_)))
        ));
    }
}
