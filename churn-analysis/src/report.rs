//! Console rendering of the analysis results

use std::fmt;

use churnlab::correlation::TargetCorrelation;
use churnlab::metrics::BinaryClassificationScores;
use churnlab::GridSearchResult;
use churnlab_preprocessing::NonFiniteReport;

/// Width of the longest bar in a chart
const BAR_WIDTH: usize = 40;

/// Test set scores of one model
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub model: String,
    pub scores: BinaryClassificationScores,
}

/// Everything the pipeline prints, in order of the steps
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub non_finite: NonFiniteReport,
    /// Shape of the training records after cleanup
    pub train_shape: (usize, usize),
    pub train_labels: usize,
    pub tree_depth: usize,
    pub tree_rules: String,
    pub grid_search: GridSearchResult<usize>,
    pub tuned_tree_rules: String,
    pub correlation: TargetCorrelation<f64>,
    pub forest_importance: Vec<(String, f64)>,
    pub filtered_importance: Vec<(String, f64)>,
    pub evaluations: Vec<Evaluation>,
}

/// Render named values as a horizontal bar chart
///
/// Bars are scaled relative to the largest value. Entries keep their order.
pub fn bar_chart(title: &str, entries: &[(String, f64)]) -> String {
    let label_width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let max = entries
        .iter()
        .map(|(_, value)| *value)
        .filter(|x| x.is_finite())
        .fold(0.0, f64::max);

    let mut out = format!("{}\n", title);
    for (name, value) in entries {
        let len = if max > 0.0 && value.is_finite() && *value > 0.0 {
            (value / max * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };

        out.push_str(&format!(
            "{:<label_width$} | {:<bar_width$} {:.4}\n",
            name,
            "█".repeat(len),
            value,
            label_width = label_width,
            bar_width = BAR_WIDTH
        ));
    }

    out
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.non_finite)?;
        writeln!(f, "Shape of X_train: {:?}", self.train_shape)?;
        writeln!(f, "Shape of y_train: ({},)", self.train_labels)?;
        writeln!(f)?;

        writeln!(f, "Decision tree with max_depth = {}", self.tree_depth)?;
        writeln!(f, "{}", self.tree_rules)?;

        writeln!(f, "Grid search, mean cross-validated accuracy")?;
        writeln!(f, "{}", self.grid_search)?;
        writeln!(
            f,
            "Decision tree with max_depth = {}",
            self.grid_search.best_value()
        )?;
        writeln!(f, "{}", self.tuned_tree_rules)?;

        writeln!(f, "Correlations between features and Churn")?;
        writeln!(f, "{}", self.correlation)?;

        writeln!(
            f,
            "{}",
            bar_chart("Random Forest Feature Importances", &self.forest_importance)
        )?;
        writeln!(
            f,
            "{}",
            bar_chart(
                "Random Forest Feature Importances after Removing Less Important Features",
                &self.filtered_importance
            )
        )?;

        for (idx, evaluation) in self.evaluations.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            writeln!(f, "Evaluation of {}:", evaluation.model)?;
            writeln!(f, "{}", evaluation.scores)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_with_the_largest_value() {
        let chart = bar_chart(
            "Importances",
            &[
                ("tenure".to_string(), 0.5),
                ("MonthlyCharges".to_string(), 0.25),
                ("PhoneService".to_string(), 0.0),
            ],
        );
        let lines = chart.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "Importances");
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(lines[3].matches('█').count(), 0);
        assert!(lines[1].starts_with("tenure         | "));
        assert!(lines[1].ends_with(" 0.5000"));
    }

    #[test]
    fn empty_chart_only_has_a_title() {
        assert_eq!(bar_chart("Nothing", &[]), "Nothing\n");
    }
}
