//! Detection and replacement of infinite and missing values

use std::fmt;

use churnlab::dataset::{DatasetBase, Records};
use churnlab::traits::{Fit, Transformer};
use churnlab::Float;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2, Zip};
use tracing::debug;

use crate::error::{PreprocessingError, Result};

/// Summary of the non-finite values in a record matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonFiniteReport {
    pub has_infinite: bool,
    pub has_nan: bool,
    /// Names of the features holding at least one infinite value
    pub infinite_columns: Vec<String>,
}

impl NonFiniteReport {
    pub fn inspect<F: Float, D: Data<Elem = F>>(
        records: &ArrayBase<D, Ix2>,
        feature_names: &[String],
    ) -> NonFiniteReport {
        let infinite_columns = records
            .axis_iter(Axis(1))
            .zip(feature_names.iter())
            .filter(|(column, _)| column.iter().any(|x| x.is_infinite()))
            .map(|(_, name)| name.clone())
            .collect::<Vec<_>>();

        NonFiniteReport {
            has_infinite: !infinite_columns.is_empty(),
            has_nan: records.iter().any(|x| x.is_nan()),
            infinite_columns,
        }
    }

    /// Whether every value is finite
    pub fn is_clean(&self) -> bool {
        !self.has_infinite && !self.has_nan
    }
}

impl fmt::Display for NonFiniteReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Infinity values: {}", self.has_infinite)?;
        writeln!(f, "NaN values: {}", self.has_nan)?;
        write!(f, "Columns with infinity values: {:?}", self.infinite_columns)
    }
}

/// Replaces infinite and missing values
///
/// Fitting learns one fill value per feature, the mean of its finite values in the training
/// records, or zero for a feature without any finite value.
///
/// ### Example
///
/// ```ignore
/// let imputer = NonFiniteImputer.fit(&train)?;
/// let train = imputer.transform(train)?;
/// let test = imputer.transform(test)?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NonFiniteImputer;

impl<F: Float, D: Data<Elem = F>, T> Fit<ArrayBase<D, Ix2>, T, PreprocessingError>
    for NonFiniteImputer
{
    type Object = FittedNonFiniteImputer<F>;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let records = dataset.records();
        if records.nsamples() == 0 {
            return Err(PreprocessingError::NotEnoughSamples);
        }

        let fill_values = records.map_axis(Axis(0), |column| {
            let (sum, count) = column
                .iter()
                .filter(|x| x.is_finite())
                .fold((F::zero(), 0usize), |(sum, count), x| (sum + *x, count + 1));

            if count == 0 {
                F::zero()
            } else {
                sum / F::cast(count)
            }
        });

        Ok(FittedNonFiniteImputer { fill_values })
    }
}

/// Fill values learned by [`NonFiniteImputer`]
#[derive(Debug, Clone)]
pub struct FittedNonFiniteImputer<F> {
    fill_values: Array1<F>,
}

impl<F: Float> FittedNonFiniteImputer<F> {
    /// One fill value per feature
    pub fn fill_values(&self) -> &Array1<F> {
        &self.fill_values
    }
}

impl<F: Float> Transformer<Array2<F>, Result<Array2<F>>> for FittedNonFiniteImputer<F> {
    fn transform(&self, mut x: Array2<F>) -> Result<Array2<F>> {
        if x.ncols() != self.fill_values.len() {
            return Err(PreprocessingError::MismatchedFeatures {
                expected: self.fill_values.len(),
                found: x.ncols(),
            });
        }

        let mut replaced = 0;
        Zip::from(x.columns_mut())
            .and(&self.fill_values)
            .for_each(|mut column, fill| {
                for value in column.iter_mut().filter(|x| !x.is_finite()) {
                    *value = *fill;
                    replaced += 1;
                }
            });
        debug!("replaced {} non-finite values", replaced);

        Ok(x)
    }
}

impl<F: Float, T> Transformer<DatasetBase<Array2<F>, T>, Result<DatasetBase<Array2<F>, T>>>
    for FittedNonFiniteImputer<F>
{
    fn transform(&self, mut x: DatasetBase<Array2<F>, T>) -> Result<DatasetBase<Array2<F>, T>> {
        x.records = self.transform(x.records)?;

        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use churnlab::Dataset;
    use ndarray::array;

    fn names() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    #[test]
    fn reports_infinite_columns() {
        let records = array![[1., f64::INFINITY, 0.], [2., 3., f64::NAN]];
        let report = NonFiniteReport::inspect(&records, &names());

        assert!(report.has_infinite);
        assert!(report.has_nan);
        assert_eq!(report.infinite_columns, vec!["b"]);
        assert!(!report.is_clean());

        let report = NonFiniteReport::inspect(&array![[1., 2., 3.]], &names());
        assert!(report.is_clean());
        assert!(report.infinite_columns.is_empty());
    }

    #[test]
    fn imputes_with_training_means() -> Result<()> {
        let train = Dataset::new(
            array![
                [1., f64::NEG_INFINITY, f64::NAN],
                [3., 4., f64::INFINITY],
                [f64::NAN, 8., f64::NAN]
            ],
            array![true, false, true],
        );

        let imputer = NonFiniteImputer.fit(&train)?;
        assert_abs_diff_eq!(*imputer.fill_values(), array![2., 6., 0.]);

        let train = imputer.transform(train)?;
        assert!(train.records().iter().all(|x| x.is_finite()));
        assert_abs_diff_eq!(
            train.records,
            array![[1., 6., 0.], [3., 4., 0.], [2., 8., 0.]]
        );

        // unseen data is filled with the training statistics
        let test = imputer.transform(array![[f64::INFINITY, 1., 5.]])?;
        assert_abs_diff_eq!(test, array![[2., 1., 5.]]);

        assert!(matches!(
            imputer.transform(array![[1., 2.]]),
            Err(PreprocessingError::MismatchedFeatures {
                expected: 3,
                found: 2
            })
        ));

        Ok(())
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let empty = Dataset::new(Array2::<f64>::zeros((0, 2)), Array1::<bool>::from(vec![]));
        let result: Result<FittedNonFiniteImputer<f64>> = NonFiniteImputer.fit(&empty);
        assert!(result.is_err());
    }
}
