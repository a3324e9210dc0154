//! Views of the prepared data: summary statistics, histograms, scatter
//! comparisons against the min-max scaled values, and correlations.
//!
//! Views are computed here and handed to the choice provider for display.
//! `Display` renders them as plain text.

use std::fmt;
use tracing::info;

use crate::dataset::DatasetHandle;
use crate::error::Result;
use crate::prompt::{ChoiceProvider, Prompt, ask_option};
use crate::scaling::min_max_scale;
use crate::types::Resolution;
use crate::utils::{mean, median, numeric_values, sample_std};

/// Descriptive statistics of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation (N - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub fn from_values(column: impl Into<String>, values: &[Option<f64>]) -> Self {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        Self {
            column: column.into(),
            count: present.len(),
            mean: mean(&present),
            median: median(&present),
            std: sample_std(&present),
            min: present.iter().copied().reduce(f64::min),
            max: present.iter().copied().reduce(f64::max),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Bin the non-null values into `bins` equal-width bins over [min, max].
    /// The last bin includes its upper edge.
    pub fn from_values(column: impl Into<String>, values: &[Option<f64>], bins: usize) -> Self {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let column = column.into();
        let (Some(min), Some(max)) = (
            present.iter().copied().reduce(f64::min),
            present.iter().copied().reduce(f64::max),
        ) else {
            return Self {
                column,
                bins: Vec::new(),
            };
        };

        let bins = bins.max(1);
        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for value in &present {
            let index = if width > 0.0 {
                (((value - min) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[index] += 1;
        }

        Self {
            column,
            bins: counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| HistogramBin {
                    lower: min + width * i as f64,
                    upper: min + width * (i + 1) as f64,
                    count,
                })
                .collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// A column's values next to their min-max scaled counterparts.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterComparison {
    pub column: String,
    /// (row index, original value, scaled value)
    pub points: Vec<(usize, f64, f64)>,
}

impl ScatterComparison {
    pub fn from_values(column: impl Into<String>, values: &[Option<f64>]) -> Self {
        let scaled = min_max_scale(values);
        let points = values
            .iter()
            .zip(scaled)
            .enumerate()
            .filter_map(|(row, (original, scaled))| Some((row, (*original)?, scaled?)))
            .collect();
        Self {
            column: column.into(),
            points,
        }
    }
}

/// Pearson correlations between columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; NaN where the correlation is undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn from_columns(columns: &[(String, Vec<Option<f64>>)]) -> Self {
        let values = columns
            .iter()
            .map(|(_, a)| columns.iter().map(|(_, b)| pearson(a, b)).collect())
            .collect();
        Self {
            columns: columns.iter().map(|(name, _)| name.clone()).collect(),
            values,
        }
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        Some(self.values[i][j])
    }
}

/// Pearson correlation over the rows where both values are present.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// A computed view ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    Summary(Vec<ColumnSummary>),
    Histograms(Vec<Histogram>),
    Scatter(Vec<ScatterComparison>),
    Correlation(CorrelationMatrix),
}

impl Visualization {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Summary(_) => "Statistical summary",
            Self::Histograms(_) => "Histograms",
            Self::Scatter(_) => "Original vs normalized",
            Self::Correlation(_) => "Correlation matrix",
        }
    }
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_nan() => "NaN".to_string(),
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.title())?;
        match self {
            Self::Summary(rows) => {
                writeln!(
                    f,
                    "{:<20} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12}",
                    "column", "count", "mean", "median", "std", "min", "max"
                )?;
                for s in rows {
                    writeln!(
                        f,
                        "{:<20} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12}",
                        s.column,
                        s.count,
                        cell(s.mean),
                        cell(s.median),
                        cell(s.std),
                        cell(s.min),
                        cell(s.max)
                    )?;
                }
            }
            Self::Histograms(histograms) => {
                for h in histograms {
                    writeln!(f, "{} ({} values)", h.column, h.total())?;
                    let peak = h.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
                    for bin in &h.bins {
                        let bar = "#".repeat(bin.count * 40 / peak);
                        writeln!(
                            f,
                            "  [{:>10.3}, {:>10.3}] {:>5} {}",
                            bin.lower, bin.upper, bin.count, bar
                        )?;
                    }
                }
            }
            Self::Scatter(comparisons) => {
                for c in comparisons {
                    writeln!(f, "{}", c.column)?;
                    writeln!(f, "  {:>6} {:>14} {:>10}", "row", "original", "scaled")?;
                    for (row, original, scaled) in &c.points {
                        writeln!(f, "  {:>6} {:>14.4} {:>10.4}", row, original, scaled)?;
                    }
                }
            }
            Self::Correlation(matrix) => {
                write!(f, "{:<16}", "")?;
                for c in &matrix.columns {
                    write!(f, " {:>12}", c)?;
                }
                writeln!(f)?;
                for (name, row) in matrix.columns.iter().zip(&matrix.values) {
                    write!(f, "{:<16}", name)?;
                    for v in row {
                        write!(f, " {:>12}", cell(Some(*v)))?;
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}

/// Offers the views over a set of scope columns.
pub struct Visualizer {
    pub histogram_bins: usize,
}

impl Visualizer {
    const MENU: &'static str = "visualization";

    pub fn new(histogram_bins: usize) -> Self {
        Self { histogram_bins }
    }

    /// Interactive entry point. `scope` lists the candidate columns; only
    /// the numeric ones present in the dataset are shown.
    pub fn resolve(
        &self,
        data: &DatasetHandle,
        scope: &[String],
        choices: &mut dyn ChoiceProvider,
    ) -> Result<Resolution> {
        let numeric = data.numeric_among(scope);
        if numeric.is_empty() {
            choices.notify("No numeric columns left to visualize");
            return Ok(Resolution::Cancelled);
        }

        let prompt = Prompt::menu("Data visualization")
            .line(format!("Columns: {}", numeric.join(", ")))
            .option("Statistical summary")
            .option("Histograms")
            .option("Original vs normalized scatter")
            .option("Correlation heatmap")
            .option("Back");

        let option = ask_option(choices, Self::MENU, &prompt)?;
        if option == 5 {
            return Ok(Resolution::Cancelled);
        }

        let mut columns = Vec::with_capacity(numeric.len());
        for name in &numeric {
            columns.push((name.clone(), numeric_values(data.series(name)?)?));
        }

        let view = match option {
            1 => Visualization::Summary(
                columns
                    .iter()
                    .map(|(name, values)| ColumnSummary::from_values(name, values))
                    .collect(),
            ),
            2 => Visualization::Histograms(
                columns
                    .iter()
                    .map(|(name, values)| {
                        Histogram::from_values(name, values, self.histogram_bins)
                    })
                    .collect(),
            ),
            3 => Visualization::Scatter(
                columns
                    .iter()
                    .map(|(name, values)| ScatterComparison::from_values(name, values))
                    .collect(),
            ),
            _ => Visualization::Correlation(CorrelationMatrix::from_columns(&columns)),
        };

        choices.render(&view)?;
        info!(view = view.title(), columns = numeric.len(), "Rendered visualization");
        Ok(Resolution::Applied(format!("Showed {}", view.title().to_lowercase())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedChoices;
    use crate::types::LoadFormat;
    use polars::prelude::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_summary_uses_sample_std() {
        let summary = ColumnSummary::from_values("x", &[Some(1.0), None, Some(3.0)]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, Some(2.0));
        assert_eq!(summary.median, Some(2.0));
        assert!((summary.std.unwrap() - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(3.0));
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let h = Histogram::from_values("x", &some(&[0.0, 1.0, 2.0, 3.0, 4.0]), 4);
        assert_eq!(h.bins.len(), 4);
        assert_eq!(h.total(), 5);
        assert_eq!(h.bins[3].count, 2);
        assert_eq!(h.bins[0].lower, 0.0);
        assert_eq!(h.bins[3].upper, 4.0);
    }

    #[test]
    fn test_histogram_of_constant_column() {
        let h = Histogram::from_values("x", &some(&[2.0, 2.0]), 20);
        assert_eq!(h.bins[0].count, 2);
        assert_eq!(h.total(), 2);
    }

    #[test]
    fn test_scatter_skips_nulls() {
        let s = ScatterComparison::from_values("x", &[Some(0.0), None, Some(10.0)]);
        assert_eq!(s.points, vec![(0, 0.0, 0.0), (2, 10.0, 1.0)]);
    }

    #[test]
    fn test_pearson() {
        let a = some(&[1.0, 2.0, 3.0]);
        let b = some(&[2.0, 4.0, 6.0]);
        let c = some(&[3.0, 2.0, 1.0]);
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c) + 1.0).abs() < 1e-12);
        assert!(pearson(&a, &some(&[5.0, 5.0, 5.0])).is_nan());
    }

    #[test]
    fn test_visualizer_renders_view() {
        let df = df!["a" => [1.0, 2.0, 3.0], "b" => [3.0, 1.0, 2.0], "c" => ["x", "y", "z"]]
            .unwrap();
        let data = DatasetHandle::new(df, "t.csv", LoadFormat::Csv);
        let scope = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut choices = ScriptedChoices::new(["4"]);

        let resolution = Visualizer::new(20)
            .resolve(&data, &scope, &mut choices)
            .unwrap();

        assert!(resolution.completes());
        match &choices.renders()[0] {
            Visualization::Correlation(matrix) => {
                assert_eq!(matrix.columns, vec!["a", "b"]);
                assert!((matrix.get("a", "a").unwrap() - 1.0).abs() < 1e-12);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn test_visualizer_without_numeric_scope() {
        let df = df!["c" => ["x"]].unwrap();
        let data = DatasetHandle::new(df, "t.csv", LoadFormat::Csv);
        let mut choices = ScriptedChoices::new(Vec::<String>::new());
        let resolution = Visualizer::new(20)
            .resolve(&data, &["c".to_string()], &mut choices)
            .unwrap();
        assert_eq!(resolution, Resolution::Cancelled);
        assert!(choices.renders().is_empty());
    }

    #[test]
    fn test_text_rendering() {
        let view = Visualization::Summary(vec![ColumnSummary::from_values("x", &some(&[1.0]))]);
        let text = view.to_string();
        assert!(text.starts_with("=== Statistical summary ==="));
        assert!(text.contains("1.0000"));
    }
}
