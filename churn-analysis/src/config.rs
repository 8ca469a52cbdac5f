//! Configuration of the analysis
//!
//! Every constant of the pipeline can be overridden from a TOML file. Keys which are missing
//! from the file keep their default value.

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column holding the binary churn label
    pub target: String,
    /// Categorical columns expanded into one dummy column per category
    pub one_hot_columns: Vec<String>,
    /// Dummy columns replaced by their factorized codes
    pub factorize_columns: Vec<String>,
    /// Columns removed after encoding
    pub drop_columns: Vec<String>,
    /// Fraction of the rows held out for evaluation
    pub test_size: f64,
    /// Seed of the train/test split and of the random forests
    pub seed: u64,
    /// Depth of the first decision tree
    pub tree_max_depth: usize,
    /// Candidate depths of the grid search
    pub max_depth_grid: Vec<usize>,
    /// Number of cross-validation folds of the grid search
    pub n_folds: usize,
    pub n_trees: usize,
    /// Features removed before fitting the filtered forest
    pub less_important_features: Vec<String>,
    /// Decimals of the thresholds in printed tree rules
    pub export_decimals: usize,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|x| x.to_string()).collect()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target: "Churn".to_string(),
            one_hot_columns: strings(&["PaymentMethod", "Contract"]),
            factorize_columns: strings(&[
                "Electronic check",
                "Mailed check",
                "Bank transfer (automatic)",
                "Credit card (automatic)",
                "Month-to-month",
                "One year",
                "Two year",
            ]),
            drop_columns: strings(&["PaymentMethod", "Contract"]),
            test_size: 0.2,
            seed: 42,
            tree_max_depth: 3,
            max_depth_grid: vec![3, 5, 7, 10],
            n_folds: 5,
            n_trees: 100,
            less_important_features: strings(&[
                "PhoneService",
                "Bank transfer (automatic)",
                "Credit card (automatic)",
                "Mailed check",
                "One year",
            ]),
            export_decimals: 2,
        }
    }
}

impl AnalysisConfig {
    /// Read a configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AnalysisConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.test_size > 0.0 && self.test_size < 1.0,
            "test_size must lie in (0, 1), got {}",
            self.test_size
        );
        ensure!(!self.max_depth_grid.is_empty(), "max_depth_grid is empty");
        ensure!(
            self.max_depth_grid.iter().all(|depth| *depth > 0),
            "max_depth_grid must only contain positive depths"
        );
        ensure!(
            self.n_folds >= 2,
            "at least 2 folds are required, got {}",
            self.n_folds
        );
        ensure!(self.n_trees > 0, "n_trees must be positive");
        ensure!(!self.target.is_empty(), "target column name is empty");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.factorize_columns.len(), 7);
        assert_eq!(config.max_depth_grid, vec![3, 5, 7, 10]);
    }

    #[test]
    fn partial_file_keeps_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "seed = 7\nn_trees = 10\nmax_depth_grid = [2, 4]")?;

        let config = AnalysisConfig::load(file.path())?;
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_trees, 10);
        assert_eq!(config.max_depth_grid, vec![2, 4]);
        assert_eq!(config.target, "Churn");
        assert_eq!(config.test_size, 0.2);

        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = AnalysisConfig {
            test_size: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            max_depth_grid: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            n_folds: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unparsable_file_names_the_path() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "seed = \"not a number\"")?;

        let err = AnalysisConfig::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config file"));

        Ok(())
    }
}
