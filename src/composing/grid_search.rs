//! Exhaustive hyperparameter search
//!
//! A grid search fits one model per candidate value and fold, scores every model on the held-out
//! fold and keeps the candidate with the highest mean score.
use std::fmt;

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::dataset::{Dataset, Float, Label};
use crate::error::Error;
use crate::metrics_classification::ToConfusionMatrix;
use crate::traits::{Fit, PredictInplace};

/// Grid search over the values of a single hyperparameter
///
/// Every candidate value is turned into a set of hyperparameters by the `build` closure. The
/// candidates are scored by their mean accuracy over stratified k-folds of the training data.
///
/// ### Example
///
/// ```ignore
/// let search = GridSearch::new("max_depth", vec![3, 5, 7, 10], |depth| {
///     DecisionTree::params().max_depth(Some(*depth))
/// });
/// let result = search.fit(&train)?;
/// println!("best depth: {}", result.best_value());
/// ```
pub struct GridSearch<V, B> {
    name: String,
    values: Vec<V>,
    build: B,
    n_folds: usize,
}

impl<V, B> GridSearch<V, B> {
    /// Search the candidate `values` of the hyperparameter `name`
    pub fn new<N: Into<String>>(name: N, values: Vec<V>, build: B) -> Self {
        GridSearch {
            name: name.into(),
            values,
            build,
            n_folds: 5,
        }
    }

    /// Sets the number of stratified folds, defaults to 5
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    /// Run the search on a dataset
    ///
    /// Returns an error if there are no candidates, if the folds cannot be created or if fitting
    /// any of the candidates fails.
    pub fn fit<F, L, P, E>(
        &self,
        dataset: &Dataset<F, L>,
    ) -> std::result::Result<GridSearchResult<V>, E>
    where
        F: Float,
        L: Label,
        V: Clone + fmt::Debug,
        B: Fn(&V) -> P,
        P: Fit<Array2<F>, Array1<L>, E>,
        P::Object: PredictInplace<Array2<F>, Array1<L>>,
        E: std::error::Error + From<Error>,
    {
        if self.values.is_empty() {
            return Err(Error::Parameters(format!(
                "grid search over {} has no candidate values",
                self.name
            ))
            .into());
        }

        let folds = dataset.stratified_fold(self.n_folds)?;
        let mut scores = Vec::with_capacity(self.values.len());

        for value in &self.values {
            let params = (self.build)(value);
            let mut fold_scores = Vec::with_capacity(folds.len());

            for (train, validation) in &folds {
                let model = params.fit(train)?;

                let mut prediction = model.default_target(validation.records());
                model.predict_inplace(validation.records(), &mut prediction);

                fold_scores.push(prediction.confusion_matrix(validation)?.accuracy());
            }

            let mean = fold_scores.iter().sum::<f32>() / fold_scores.len() as f32;
            debug!(
                "{} = {:?}: mean accuracy {:.4} over {} folds",
                self.name,
                value,
                mean,
                fold_scores.len()
            );

            scores.push(CandidateScore {
                value: value.clone(),
                mean_score: mean,
                fold_scores,
            });
        }

        // keep the first candidate with the highest mean score
        let best = scores
            .iter()
            .enumerate()
            .fold(0, |best, (idx, candidate)| {
                if candidate.mean_score > scores[best].mean_score {
                    idx
                } else {
                    best
                }
            });

        Ok(GridSearchResult {
            name: self.name.clone(),
            scores,
            best,
        })
    }
}

/// Score of a single candidate value
#[derive(Debug, Clone)]
pub struct CandidateScore<V> {
    pub value: V,
    pub mean_score: f32,
    pub fold_scores: Vec<f32>,
}

/// Outcome of a grid search
#[derive(Debug, Clone)]
pub struct GridSearchResult<V> {
    name: String,
    scores: Vec<CandidateScore<V>>,
    best: usize,
}

impl<V> GridSearchResult<V> {
    /// The name of the searched hyperparameter
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The best scoring candidate value
    pub fn best_value(&self) -> &V {
        &self.scores[self.best].value
    }

    /// The mean score of the best candidate
    pub fn best_score(&self) -> f32 {
        self.scores[self.best].mean_score
    }

    /// Scores of all candidates in the order they were searched
    pub fn scores(&self) -> &[CandidateScore<V>] {
        &self.scores
    }
}

impl<V: fmt::Debug> fmt::Display for GridSearchResult<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, candidate) in self.scores.iter().enumerate() {
            writeln!(
                f,
                "{} = {:?}: {:.4}{}",
                self.name,
                candidate.value,
                candidate.mean_score,
                if idx == self.best { " (best)" } else { "" }
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetBase;
    use crate::error::Result;
    use ndarray::{Array1, Array2};

    /// Predicts `true` whenever the first feature exceeds a threshold
    struct ThresholdParams {
        threshold: f64,
    }

    struct ThresholdModel {
        threshold: f64,
    }

    impl Fit<Array2<f64>, Array1<bool>, Error> for ThresholdParams {
        type Object = ThresholdModel;

        fn fit(&self, dataset: &DatasetBase<Array2<f64>, Array1<bool>>) -> Result<ThresholdModel> {
            if dataset.nsamples() == 0 {
                return Err(Error::NotEnoughSamples("empty".to_string()));
            }
            Ok(ThresholdModel {
                threshold: self.threshold,
            })
        }
    }

    impl PredictInplace<Array2<f64>, Array1<bool>> for ThresholdModel {
        fn predict_inplace<'a>(&'a self, x: &'a Array2<f64>, y: &mut Array1<bool>) {
            for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
                *target = row[0] > self.threshold;
            }
        }

        fn default_target(&self, x: &Array2<f64>) -> Array1<bool> {
            Array1::from_elem(x.nrows(), false)
        }
    }

    fn dataset() -> Dataset<f64, bool> {
        let records = Array2::from_shape_fn((20, 1), |(i, _)| i as f64);
        let targets = (0..20).map(|i| i >= 10).collect::<Array1<_>>();
        Dataset::new(records, targets)
    }

    #[test]
    fn finds_best_threshold() -> Result<()> {
        let search = GridSearch::new("threshold", vec![2.5, 9.5, 15.5], |threshold: &f64| {
            ThresholdParams {
                threshold: *threshold,
            }
        });

        let result: Result<GridSearchResult<f64>> = search.fit(&dataset());
        let result = result?;

        assert_eq!(*result.best_value(), 9.5);
        assert!((result.best_score() - 1.0).abs() < 1e-6);
        assert_eq!(result.scores().len(), 3);
        assert!(result
            .scores()
            .iter()
            .all(|x| x.fold_scores.len() == 5 && (0.0..=1.0).contains(&x.mean_score)));

        Ok(())
    }

    #[test]
    fn ties_keep_the_first_candidate() -> Result<()> {
        let search = GridSearch::new("threshold", vec![9.2, 9.5, 9.7], |threshold: &f64| {
            ThresholdParams {
                threshold: *threshold,
            }
        })
        .n_folds(4);

        let result: GridSearchResult<f64> = search.fit::<_, _, _, Error>(&dataset())?;
        assert_eq!(*result.best_value(), 9.2);

        Ok(())
    }

    #[test]
    fn empty_grid_is_rejected() {
        let search = GridSearch::new("threshold", Vec::<f64>::new(), |threshold: &f64| {
            ThresholdParams {
                threshold: *threshold,
            }
        });

        let result: Result<GridSearchResult<f64>> = search.fit(&dataset());
        assert!(result.is_err());
    }
}
