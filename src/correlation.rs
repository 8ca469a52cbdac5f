//! Correlation analysis for dataset features
//!
//! Computes the Pearson correlation between every feature and a binary target. This is the
//! column of a correlation matrix which belongs to the target, e.g. to find features which move
//! together with churn.
use std::fmt;

use ndarray::{Array1, ArrayBase, Axis, Data, Ix2};

use crate::dataset::{AsTargets, DatasetBase};
use crate::Float;

/// Pearson correlation of each column in `records` with `target`
///
/// Rows with a missing (NaN) feature value are left out of that feature's coefficient. Columns
/// without variance or with fewer than two observed values have no defined correlation and
/// result in NaN.
fn pearson_with_target<F: Float, D: Data<Elem = F>>(
    records: &ArrayBase<D, Ix2>,
    target: &Array1<F>,
) -> Array1<F> {
    records
        .axis_iter(Axis(1))
        .map(|column| {
            let pairs = column
                .iter()
                .zip(target.iter())
                .filter(|(x, _)| !x.is_nan())
                .map(|(x, y)| (*x, *y))
                .collect::<Vec<_>>();
            if pairs.len() < 2 {
                return F::nan();
            }

            let nobs = F::cast(pairs.len());
            let mean_x = pairs.iter().map(|(x, _)| *x).sum::<F>() / nobs;
            let mean_y = pairs.iter().map(|(_, y)| *y).sum::<F>() / nobs;

            let (mut cov, mut var_x, mut var_y) = (F::zero(), F::zero(), F::zero());
            for (x, y) in pairs {
                let (dx, dy) = (x - mean_x, y - mean_y);
                cov += dx * dy;
                var_x += dx * dx;
                var_y += dy * dy;
            }

            if var_x == F::zero() || var_y == F::zero() {
                F::nan()
            } else {
                cov / (var_x.sqrt() * var_y.sqrt())
            }
        })
        .collect()
}

/// Correlation of every feature with a binary target
#[derive(Debug, Clone)]
pub struct TargetCorrelation<F> {
    feature_names: Vec<String>,
    coefficients: Array1<F>,
}

impl<F: Float> TargetCorrelation<F> {
    /// Calculate the correlation coefficients of a dataset with boolean targets
    ///
    /// The target is encoded as `1` for `true` and `0` for `false`.
    pub fn from_dataset<D: Data<Elem = F>, T: AsTargets<Elem = bool>>(
        dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
    ) -> Self {
        let target = dataset
            .targets()
            .as_targets()
            .mapv(|x| if x { F::one() } else { F::zero() });

        TargetCorrelation {
            feature_names: dataset.feature_names(),
            coefficients: pearson_with_target(dataset.records(), &target),
        }
    }

    /// Return the correlation coefficients, one per feature
    pub fn get_coeffs(&self) -> &Array1<F> {
        &self.coefficients
    }

    /// Return the feature names in the order of the coefficients
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Pairs of feature name and coefficient, strongest absolute correlation first
    ///
    /// Undefined coefficients (NaN) are placed last.
    pub fn ranked(&self) -> Vec<(&str, F)> {
        let mut pairs = self
            .feature_names
            .iter()
            .map(|x| x.as_str())
            .zip(self.coefficients.iter().copied())
            .collect::<Vec<_>>();

        pairs.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => b
                .1
                .abs()
                .partial_cmp(&a.1.abs())
                .unwrap_or(std::cmp::Ordering::Equal),
        });

        pairs
    }
}

impl<F: Float> fmt::Display for TargetCorrelation<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self
            .feature_names
            .iter()
            .map(|x| x.len())
            .max()
            .unwrap_or(0);

        for (name, coefficient) in self.feature_names.iter().zip(self.coefficients.iter()) {
            writeln!(f, "{:<width$} {:>8.4}", name, coefficient, width = width)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dataset;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use ndarray_rand::{rand::SeedableRng, rand_distr::Uniform, RandomExt};
    use rand::rngs::SmallRng;

    #[test]
    fn perfectly_correlated_features() {
        let dataset = Dataset::new(
            array![[0., 5., 1.], [1., 3., 1.], [0., 5., 1.], [1., 3., 1.]],
            array![false, true, false, true],
        )
        .with_feature_names(vec!["same", "inverse", "constant"]);

        let corr: TargetCorrelation<f64> = TargetCorrelation::from_dataset(&dataset);
        let coeffs = corr.get_coeffs();

        assert_abs_diff_eq!(coeffs[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(coeffs[1], -1.0, epsilon = 1e-12);
        assert!(coeffs[2].is_nan());

        let ranked = corr.ranked();
        assert_eq!(ranked.last().map(|x| x.0), Some("constant"));
    }

    #[test]
    fn uncorrelated_noise_is_weak() {
        let mut rng = SmallRng::seed_from_u64(42);
        let records = Array2::random_using((2000, 1), Uniform::new(-1., 1.), &mut rng);
        let targets = (0..2000).map(|i| i % 2 == 0).collect::<Array1<_>>();

        let corr: TargetCorrelation<f64> =
            TargetCorrelation::from_dataset(&Dataset::new(records, targets));
        assert!(corr.get_coeffs()[0].abs() < 0.1);
    }

    #[test]
    fn missing_values_are_skipped_per_feature() {
        let dataset = Dataset::new(
            array![[0., 1.], [1., f64::NAN], [0., f64::NAN], [1., f64::NAN], [f64::NAN, f64::NAN]],
            array![false, true, false, true, true],
        );

        let corr: TargetCorrelation<f64> = TargetCorrelation::from_dataset(&dataset);
        let coeffs = corr.get_coeffs();

        // only the first four rows are observed for the first feature
        assert_abs_diff_eq!(coeffs[0], 1.0, epsilon = 1e-12);
        // a single observation has no correlation
        assert!(coeffs[1].is_nan());
    }
}
