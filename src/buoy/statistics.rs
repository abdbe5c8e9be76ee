/// Descriptive statistics for a parsed feed, one entry per column.
///
/// Mirrors the usual "describe" summary: count of present values, mean,
/// sample standard deviation, min, quartiles (linear interpolation) and max.
/// Missing values are skipped; a column with no values reports only its
/// count.
use serde::Serialize;
use utoipa::ToSchema;

use super::reading::{BuoyColumn, BuoyReading};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

pub fn describe(readings: &[BuoyReading]) -> Vec<ColumnStatistics> {
    BuoyColumn::ALL
        .into_iter()
        .map(|column| {
            let values: Vec<f64> = readings.iter().filter_map(|r| column.value(r)).collect();
            summarize(column.header(), values)
        })
        .collect()
}

fn summarize(name: &str, mut values: Vec<f64>) -> ColumnStatistics {
    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();

    let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
    let std = mean.filter(|_| count > 1).map(|m| {
        let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    });

    ColumnStatistics {
        column: name.to_string(),
        count,
        mean,
        std,
        min: values.first().copied(),
        p25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        p75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

/// Linear-interpolated quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
