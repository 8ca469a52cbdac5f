//! Common metrics for performance evaluation of classifiers
//!
//! Scoring is essential for classification tasks. This module implements a confusion matrix
//! from which accuracy, precision, recall and the F1-score are derived. Every score lies in
//! `[0, 1]`; a score with a zero denominator (e.g. precision without any positive prediction)
//! is reported as zero.
use std::collections::HashMap;
use std::fmt;

use ndarray::prelude::*;
use ndarray::Data;

use crate::dataset::{AsTargets, DatasetBase, Label};
use crate::error::{Error, Result};

/// Confusion matrix for multi-label evaluation
///
/// A confusion matrix shows predictions in a matrix, where rows correspond to the ground truth
/// and columns to the prediction. The diagonal entries are correct predictions.
#[derive(Clone, PartialEq)]
pub struct ConfusionMatrix<A> {
    matrix: Array2<usize>,
    members: Array1<A>,
}

impl<A: Label> ConfusionMatrix<A> {
    /// Labels of the matrix, in ascending order
    pub fn members(&self) -> ArrayView1<'_, A> {
        self.members.view()
    }

    /// Number of samples with ground truth `truth` which were predicted as `predicted`
    pub fn count(&self, truth: &A, predicted: &A) -> usize {
        match (self.index_of(truth), self.index_of(predicted)) {
            (Some(i), Some(j)) => self.matrix[(i, j)],
            _ => 0,
        }
    }

    fn index_of(&self, label: &A) -> Option<usize> {
        self.members.iter().position(|x| x == label)
    }

    /// Return mean accuracy
    pub fn accuracy(&self) -> f32 {
        ratio(self.matrix.diag().sum(), self.matrix.sum())
    }

    /// Fraction of samples predicted as `label` which actually belong to `label`
    pub fn precision_for(&self, label: &A) -> f32 {
        match self.index_of(label) {
            Some(idx) => ratio(self.matrix[(idx, idx)], self.matrix.column(idx).sum()),
            None => 0.0,
        }
    }

    /// Fraction of samples belonging to `label` which were predicted as `label`
    pub fn recall_for(&self, label: &A) -> f32 {
        match self.index_of(label) {
            Some(idx) => ratio(self.matrix[(idx, idx)], self.matrix.row(idx).sum()),
            None => 0.0,
        }
    }

    /// Weighted harmonic mean of precision and recall for `label`
    pub fn f_score_for(&self, label: &A, beta: f32) -> f32 {
        let sb = beta * beta;
        let (p, r) = (self.precision_for(label), self.recall_for(label));

        if p + r == 0.0 {
            0.0
        } else {
            (1.0 + sb) * (p * r) / (sb * p + r)
        }
    }

    /// Harmonic mean of precision and recall for `label`
    pub fn f1_for(&self, label: &A) -> f32 {
        self.f_score_for(label, 1.0)
    }

    /// Calculate precision for every class
    pub fn precision_per_class(&self) -> Array1<f32> {
        self.members.iter().map(|x| self.precision_for(x)).collect()
    }

    /// Calculate recall for every class
    pub fn recall_per_class(&self) -> Array1<f32> {
        self.members.iter().map(|x| self.recall_for(x)).collect()
    }
}

/// Shorthands for binary tasks, `true` being the positive label
impl ConfusionMatrix<bool> {
    pub fn precision(&self) -> f32 {
        self.precision_for(&true)
    }

    pub fn recall(&self) -> f32 {
        self.recall_for(&true)
    }

    pub fn f1_score(&self) -> f32 {
        self.f1_for(&true)
    }

    /// Collect the four standard scores of a binary classifier
    pub fn scores(&self) -> BinaryClassificationScores {
        BinaryClassificationScores {
            accuracy: self.accuracy(),
            precision: self.precision(),
            recall: self.recall(),
            f1_score: self.f1_score(),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

/// Print a confusion matrix
impl<A: fmt::Debug> fmt::Debug for ConfusionMatrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self.matrix.len_of(Axis(0));
        writeln!(f)?;
        write!(f, "{:<10} |", "classes")?;
        for j in 0..len {
            write!(f, " {:<10?}", self.members[j])?;
        }
        writeln!(f)?;

        for i in 0..len {
            write!(f, "{:<10?} |", self.members[i])?;

            for j in 0..len {
                write!(f, " {:<10}", self.matrix[(i, j)])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Accuracy, precision, recall and F1-score of a binary classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryClassificationScores {
    pub accuracy: f32,
    pub precision: f32,
    pub recall: f32,
    pub f1_score: f32,
}

impl fmt::Display for BinaryClassificationScores {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Accuracy: {:.4}, Precision: {:.4}, Recall: {:.4}, F1 Score: {:.4}",
            self.accuracy, self.precision, self.recall, self.f1_score
        )
    }
}

/// Classification functions
///
/// Contains only routine for Confusion Matrix, as all other current metrics can be derived from
/// the entries in the matrix.
pub trait ToConfusionMatrix<A, T> {
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<A>>;
}

impl<A: Label, S: Data<Elem = A>, T: Data<Elem = A>> ToConfusionMatrix<A, &ArrayBase<T, Ix1>>
    for ArrayBase<S, Ix1>
{
    fn confusion_matrix(&self, ground_truth: &ArrayBase<T, Ix1>) -> Result<ConfusionMatrix<A>> {
        if self.len() != ground_truth.len() {
            return Err(Error::MismatchedShapes {
                records: self.len(),
                targets: ground_truth.len(),
            });
        }

        // create a sorted set of all labels appearing in prediction or ground truth
        let mut classes = ground_truth
            .iter()
            .chain(self.iter())
            .cloned()
            .collect::<Vec<_>>();
        classes.sort();
        classes.dedup();

        let indices = classes
            .iter()
            .enumerate()
            .map(|(idx, label)| (label, idx))
            .collect::<HashMap<_, _>>();

        // count each index tuple in the confusion matrix
        let mut matrix = Array2::zeros((classes.len(), classes.len()));
        for (truth, prediction) in ground_truth.iter().zip(self.iter()) {
            matrix[(indices[truth], indices[prediction])] += 1;
        }

        Ok(ConfusionMatrix {
            matrix,
            members: Array1::from(classes),
        })
    }
}

impl<A: Label, S: Data<Elem = A>, R, T: AsTargets<Elem = A>>
    ToConfusionMatrix<A, &DatasetBase<R, T>> for ArrayBase<S, Ix1>
{
    fn confusion_matrix(&self, ground_truth: &DatasetBase<R, T>) -> Result<ConfusionMatrix<A>> {
        self.confusion_matrix(&ground_truth.targets.as_targets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_confusion_matrix() -> Result<()> {
        let ground_truth = array![1usize, 1, 0, 1, 0, 1];
        let predicted = array![0usize, 1, 0, 1, 0, 1];

        let cm = predicted.confusion_matrix(&ground_truth)?;

        assert_eq!(cm.members(), array![0, 1]);
        assert_eq!(cm.count(&1, &0), 1);
        assert_eq!(cm.count(&0, &1), 0);
        assert_eq!(cm.count(&1, &1), 3);
        assert_eq!(cm.count(&0, &0), 2);

        Ok(())
    }

    #[test]
    fn test_binary_scores() -> Result<()> {
        let ground_truth = array![true, true, false, true, false, false, true, false];
        let predicted = array![true, false, true, true, false, false, true, false];

        let cm = predicted.confusion_matrix(&ground_truth)?;

        // tp = 3, fp = 1, fn = 1, tn = 3
        assert_abs_diff_eq!(cm.accuracy(), 0.75);
        assert_abs_diff_eq!(cm.precision(), 0.75);
        assert_abs_diff_eq!(cm.recall(), 0.75);
        assert_abs_diff_eq!(cm.f1_score(), 0.75);

        assert_abs_diff_eq!(cm.precision_for(&false), 0.75);
        assert_abs_diff_eq!(cm.recall_per_class(), array![0.75, 0.75]);

        Ok(())
    }

    #[test]
    fn test_unbalanced_scores() -> Result<()> {
        let ground_truth = array![true, true, true, true, false];
        let predicted = array![true, false, false, false, false];

        let scores = predicted.confusion_matrix(&ground_truth)?.scores();

        assert_abs_diff_eq!(scores.accuracy, 0.4);
        assert_abs_diff_eq!(scores.precision, 1.0);
        assert_abs_diff_eq!(scores.recall, 0.25);
        assert_abs_diff_eq!(scores.f1_score, 0.4);

        Ok(())
    }

    #[test]
    fn test_zero_denominators() -> Result<()> {
        // no positive predictions and no positive samples at all
        let ground_truth = array![false, false, false];
        let predicted = array![false, false, false];

        let scores = predicted.confusion_matrix(&ground_truth)?.scores();

        assert_abs_diff_eq!(scores.accuracy, 1.0);
        assert_abs_diff_eq!(scores.precision, 0.0);
        assert_abs_diff_eq!(scores.recall, 0.0);
        assert_abs_diff_eq!(scores.f1_score, 0.0);

        Ok(())
    }

    #[test]
    fn test_scores_are_in_unit_interval() -> Result<()> {
        let ground_truth = array![true, false, true, false, true, true, false];
        for shift in 0..ground_truth.len() {
            let predicted = (0..ground_truth.len())
                .map(|i| ground_truth[(i + shift) % ground_truth.len()])
                .collect::<Array1<_>>();
            let scores = predicted.confusion_matrix(&ground_truth)?.scores();

            for score in &[
                scores.accuracy,
                scores.precision,
                scores.recall,
                scores.f1_score,
            ] {
                assert!((0.0..=1.0).contains(score));
            }
        }

        Ok(())
    }

    #[test]
    fn test_confusion_matrix_from_dataset() -> Result<()> {
        let dataset = Dataset::new(array![[0.], [1.], [2.]], array![false, true, true]);
        let predicted = array![false, true, false];

        let cm = predicted.confusion_matrix(&dataset)?;
        assert_abs_diff_eq!(cm.accuracy(), 2.0 / 3.0);

        assert!(array![true].confusion_matrix(&dataset).is_err());

        Ok(())
    }

    #[test]
    fn test_scores_display() {
        let scores = BinaryClassificationScores {
            accuracy: 0.8,
            precision: 0.65,
            recall: 0.5,
            f1_score: 0.56521,
        };

        assert_eq!(
            scores.to_string(),
            "Accuracy: 0.8000, Precision: 0.6500, Recall: 0.5000, F1 Score: 0.5652"
        );
    }
}
