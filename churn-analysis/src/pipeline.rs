//! The analysis steps, from loading the CSV to the test set evaluation

use std::path::Path;

use anyhow::{Context, Result};
use churnlab::prelude::*;
use churnlab::GridSearchResult;
use churnlab_datasets::{read_csv, Table};
use churnlab_preprocessing::{Factorizer, NonFiniteImputer, NonFiniteReport, OneHotEncoder};
use churnlab_trees::{DecisionTree, RandomForest};
use rand::{rngs::SmallRng, SeedableRng};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::report::{AnalysisReport, Evaluation};

/// Expand the categorical columns into factorized dummy columns and drop the originals
pub fn encode(table: Table, config: &AnalysisConfig) -> Result<Table> {
    let table = OneHotEncoder::new(&config.one_hot_columns)
        .transform(table)
        .context("failed to one-hot encode the categorical columns")?;
    let mut table = Factorizer::new(&config.factorize_columns)
        .transform(table)
        .context("failed to factorize the dummy columns")?;
    table
        .drop_columns(&config.drop_columns)
        .context("failed to drop the encoded columns")?;

    debug!("encoded columns: {:?}", table.column_names());
    Ok(table)
}

/// Pair every feature name with its importance
fn named(names: &[String], importance: Vec<f64>) -> Vec<(String, f64)> {
    names.iter().cloned().zip(importance).collect()
}

/// Run all steps on an already loaded table
pub fn run_table(table: Table, config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;

    let table = encode(table, config)?;
    let dataset = table
        .into_dataset(&config.target)
        .with_context(|| format!("failed to separate features and `{}`", config.target))?;
    info!(
        samples = dataset.nsamples(),
        features = dataset.nfeatures(),
        "encoded dataset"
    );

    // computed over the whole encoded table
    let correlation = TargetCorrelation::from_dataset(&dataset);

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let (train, test) = dataset
        .train_test_split(config.test_size, &mut rng)
        .context("failed to split into train and test set")?;
    info!(
        train = train.nsamples(),
        test = test.nsamples(),
        "split dataset"
    );

    let non_finite = NonFiniteReport::inspect(train.records(), &train.feature_names());
    let imputer = NonFiniteImputer
        .fit(&train)
        .context("failed to learn fill values for non-finite entries")?;
    let train = imputer.transform(train)?;
    let test = imputer.transform(test)?;
    let train_shape = train.records().dim();

    let tree = DecisionTree::params()
        .max_depth(Some(config.tree_max_depth))
        .fit(&train)
        .context("failed to fit the decision tree")?;
    let tree_rules = tree
        .export_text()
        .decimals(config.export_decimals)
        .to_string();
    info!(
        depth = tree.max_depth(),
        leaves = tree.num_leaves(),
        "fitted decision tree"
    );

    let grid_search: GridSearchResult<usize> = GridSearch::new(
        "max_depth",
        config.max_depth_grid.clone(),
        |depth: &usize| DecisionTree::<f64, bool>::params().max_depth(Some(*depth)),
    )
    .n_folds(config.n_folds)
    .fit::<f64, bool, _, Error>(&train)
    .context("grid search over max_depth failed")?;
    let best_depth = *grid_search.best_value();
    info!(
        max_depth = best_depth,
        accuracy = grid_search.best_score(),
        "grid search finished"
    );

    let tuned_tree = DecisionTree::params()
        .max_depth(Some(best_depth))
        .fit(&train)
        .context("failed to fit the tuned decision tree")?;
    let tuned_tree_rules = tuned_tree
        .export_text()
        .decimals(config.export_decimals)
        .to_string();

    let forest = RandomForest::params()
        .n_trees(config.n_trees)
        .seed(config.seed)
        .fit(&train)
        .context("failed to fit the random forest")?;
    let forest_importance = named(forest.feature_names(), forest.feature_importance());
    info!(trees = forest.trees().len(), "fitted random forest");

    let train_filtered = train
        .drop_features(&config.less_important_features)
        .context("failed to remove the less important features")?;
    let test_filtered = test.drop_features(&config.less_important_features)?;
    let forest_filtered = RandomForest::params()
        .n_trees(config.n_trees)
        .seed(config.seed)
        .fit(&train_filtered)
        .context("failed to fit the filtered random forest")?;
    let filtered_importance = named(
        forest_filtered.feature_names(),
        forest_filtered.feature_importance(),
    );
    info!(
        features = train_filtered.nfeatures(),
        "fitted random forest on filtered features"
    );

    let evaluations = vec![
        Evaluation {
            model: "Decision Tree Model".to_string(),
            scores: tuned_tree.predict(&test).confusion_matrix(&test)?.scores(),
        },
        Evaluation {
            model: "Random Forest Model".to_string(),
            scores: forest.predict(&test).confusion_matrix(&test)?.scores(),
        },
        Evaluation {
            model: "Random Forest Model after Removing Less Important Features".to_string(),
            scores: forest_filtered
                .predict(&test_filtered)
                .confusion_matrix(&test_filtered)?
                .scores(),
        },
    ];

    Ok(AnalysisReport {
        non_finite,
        train_shape,
        train_labels: train.targets().len(),
        tree_depth: config.tree_max_depth,
        tree_rules,
        grid_search,
        tuned_tree_rules,
        correlation,
        forest_importance,
        filtered_importance,
        evaluations,
    })
}

/// Load the CSV at `path` and run the analysis
pub fn run<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let path = path.as_ref();
    let table =
        read_csv(path).with_context(|| format!("failed to load data from {}", path.display()))?;
    info!(
        rows = table.nrows(),
        columns = table.ncolumns(),
        "loaded {}",
        path.display()
    );

    run_table(table, config)
}
