//! Integer encoding of column values

use std::collections::HashMap;

use churnlab::traits::Transformer;
use churnlab_datasets::{Column, Table};

use crate::error::Result;

/// Encode the values of a column as integer codes
///
/// Codes are assigned in order of first appearance, starting at zero. Missing values (NaN or
/// empty cells) receive the code `-1`.
pub fn factorize(column: &Column) -> Vec<i64> {
    match column {
        Column::Numeric(values) => {
            // -0.0 and 0.0 share a code
            let keys = values
                .iter()
                .map(|x| if x.is_nan() { None } else { Some((x + 0.0).to_bits()) });
            codes(keys)
        }
        Column::Categorical(values) => {
            let keys = values
                .iter()
                .map(|x| if x.trim().is_empty() { None } else { Some(x.as_str()) });
            codes(keys)
        }
    }
}

fn codes<K: Eq + std::hash::Hash, I: Iterator<Item = Option<K>>>(keys: I) -> Vec<i64> {
    let mut uniques = HashMap::new();

    keys.map(|key| match key {
        Some(key) => {
            let next = uniques.len() as i64;
            *uniques.entry(key).or_insert(next)
        }
        None => -1,
    })
    .collect()
}

/// Replaces table columns by their factorized codes
///
/// The replaced columns are numeric and keep their position in the table.
#[derive(Debug, Clone)]
pub struct Factorizer {
    columns: Vec<String>,
}

impl Factorizer {
    pub fn new<N: AsRef<str>>(columns: &[N]) -> Self {
        Factorizer {
            columns: columns.iter().map(|x| x.as_ref().to_string()).collect(),
        }
    }
}

impl Transformer<Table, Result<Table>> for Factorizer {
    fn transform(&self, mut table: Table) -> Result<Table> {
        for name in &self.columns {
            let codes = factorize(table.column(name)?);
            let codes = codes.into_iter().map(|x| x as f64).collect();

            table.replace_column(name, Column::Numeric(codes))?;
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PreprocessingError;

    #[test]
    fn codes_follow_first_appearance() {
        let column = Column::Numeric(vec![1., 0., 1., f64::NAN, 0., -0.]);
        assert_eq!(factorize(&column), vec![0, 1, 0, -1, 1, 1]);

        let column = Column::Categorical(
            ["b", "a", "", "b", "c"].iter().map(|x| x.to_string()).collect(),
        );
        assert_eq!(factorize(&column), vec![0, 1, -1, 0, 2]);
    }

    #[test]
    fn factorizes_table_columns() -> Result<()> {
        let csv = "\
One year,Contract,tenure
1,Two year,5
0,One year,7
1,Two year,5
";
        let table = Table::from_reader(csv.as_bytes())?;
        let table = Factorizer::new(&["One year", "Contract"]).transform(table)?;

        // a dummy column starting with 1 maps 1 to code 0
        assert_eq!(
            table.column("One year")?,
            &Column::Numeric(vec![0., 1., 0.])
        );
        assert_eq!(table.column("Contract")?, &Column::Numeric(vec![0., 1., 0.]));
        assert_eq!(table.column("tenure")?, &Column::Numeric(vec![5., 7., 5.]));
        assert_eq!(table.column_names(), &["One year", "Contract", "tenure"]);

        let result = Factorizer::new(&["gender"]).transform(table);
        assert!(matches!(result, Err(PreprocessingError::Table(_))));

        Ok(())
    }
}
