use std::fs::File;
use std::io::Read;
use std::path::Path;

use churnlab::Dataset;
use csv::ReaderBuilder;
use ndarray::{Array1, Array2};
use tracing::debug;

use crate::error::{DatasetError, Result};

/// Values of a single table column
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating point values, missing cells are NaN
    Numeric(Vec<f64>),
    /// Textual values, kept as they appear in the file
    Categorical(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[String]> {
        match self {
            Column::Categorical(values) => Some(values),
            Column::Numeric(_) => None,
        }
    }

    /// Infer the column type from raw cells
    ///
    /// A column is numeric when every non-empty cell parses as a float. Empty cells of a numeric
    /// column become NaN.
    fn infer(cells: Vec<String>) -> Column {
        let parsed = cells
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                if cell.is_empty() {
                    Some(f64::NAN)
                } else {
                    cell.parse::<f64>().ok()
                }
            })
            .collect::<Option<Vec<_>>>();

        match parsed {
            Some(values) => Column::Numeric(values),
            None => Column::Categorical(cells),
        }
    }
}

/// An ordered collection of named, equally long columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

/// Read a table from a CSV file with a header row
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = File::open(path.as_ref())?;
    let table = Table::from_reader(file)?;
    debug!(
        "read {} rows and {} columns from {}",
        table.nrows(),
        table.ncolumns(),
        path.as_ref().display()
    );

    Ok(table)
}

impl Table {
    /// Create an empty table
    pub fn new() -> Table {
        Table::default()
    }

    /// Read comma separated values with a header row
    ///
    /// Rows with a different number of cells than the header are rejected.
    pub fn from_reader<R: Read>(reader: R) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .from_reader(reader);

        let names = reader
            .headers()?
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>();

        let mut cells = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record?;
            for (column, cell) in cells.iter_mut().zip(record.iter()) {
                column.push(cell.to_string());
            }
        }

        let mut table = Table::new();
        for (name, column) in names.into_iter().zip(cells) {
            table.push_column(name, Column::infer(column))?;
        }

        Ok(table)
    }

    /// Number of rows, zero for a table without columns
    pub fn nrows(&self) -> usize {
        self.columns.first().map(|x| x.len()).unwrap_or(0)
    }

    pub fn ncolumns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.position(name)
            .map(|idx| &self.columns[idx])
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|x| x == name)
    }

    fn check_length(&self, name: &str, column: &Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.nrows() {
            return Err(DatasetError::LengthMismatch {
                name: name.to_string(),
                expected: self.nrows(),
                found: column.len(),
            });
        }

        Ok(())
    }

    /// Append a column at the end of the table
    pub fn push_column<N: Into<String>>(&mut self, name: N, column: Column) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(DatasetError::DuplicateColumn(name));
        }
        self.check_length(&name, &column)?;

        self.names.push(name);
        self.columns.push(column);

        Ok(())
    }

    /// Replace the values of an existing column, keeping its position
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))?;
        self.check_length(name, &column)?;

        self.columns[idx] = column;

        Ok(())
    }

    /// Remove the named columns
    ///
    /// Fails without modifying the table if one of the columns does not exist.
    pub fn drop_columns<N: AsRef<str>>(&mut self, names: &[N]) -> Result<()> {
        if let Some(missing) = names.iter().find(|x| !self.has_column(x.as_ref())) {
            return Err(DatasetError::MissingColumn(missing.as_ref().to_string()));
        }

        let (names_kept, columns_kept): (Vec<_>, Vec<_>) = self
            .names
            .drain(..)
            .zip(self.columns.drain(..))
            .filter(|(name, _)| !names.iter().any(|x| x.as_ref() == name))
            .unzip();

        self.names = names_kept;
        self.columns = columns_kept;

        Ok(())
    }

    /// Convert the table into a dataset with boolean labels
    ///
    /// The `target` column is parsed into labels (`1`/`0`, `yes`/`no` or `true`/`false`, case
    /// insensitive), all other columns become features in table order. Every feature column has
    /// to be numeric.
    pub fn into_dataset(mut self, target: &str) -> Result<Dataset<f64, bool>> {
        let idx = self
            .position(target)
            .ok_or_else(|| DatasetError::MissingColumn(target.to_string()))?;
        let name = self.names.remove(idx);
        let labels = parse_labels(&name, &self.columns.remove(idx))?;

        let features = self
            .names
            .iter()
            .zip(self.columns.iter())
            .map(|(name, column)| {
                column
                    .as_numeric()
                    .ok_or_else(|| DatasetError::CategoricalFeature(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let records =
            Array2::from_shape_fn((labels.len(), features.len()), |(i, j)| features[j][i]);

        Ok(Dataset::new(records, labels).with_feature_names(self.names))
    }
}

fn parse_labels(name: &str, column: &Column) -> Result<Array1<bool>> {
    let invalid = |row: usize, value: String| DatasetError::InvalidLabel {
        column: name.to_string(),
        row,
        value,
    };

    match column {
        Column::Numeric(values) => values
            .iter()
            .enumerate()
            .map(|(row, value)| match *value {
                x if x == 1.0 => Ok(true),
                x if x == 0.0 => Ok(false),
                x => Err(invalid(row, x.to_string())),
            })
            .collect(),
        Column::Categorical(values) => values
            .iter()
            .enumerate()
            .map(|(row, value)| match value.trim().to_lowercase().as_str() {
                "1" | "1.0" | "yes" | "true" => Ok(true),
                "0" | "0.0" | "no" | "false" => Ok(false),
                _ => Err(invalid(row, value.clone())),
            })
            .collect(),
    }
}
