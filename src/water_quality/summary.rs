/// Summary views over water-quality samples: overall averages and monthly
/// averages for comparing months against each other.
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::samples::{SampleColumn, WaterSample};

/// Mean of each measurement, skipping missing cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SampleAverages {
    pub odo_mg_l: Option<f64>,
    pub temp_c: Option<f64>,
    pub ph: Option<f64>,
    pub depth_m: Option<f64>,
}

impl SampleAverages {
    pub fn from_samples(samples: &[WaterSample]) -> Self {
        Self {
            odo_mg_l: column_mean(samples, SampleColumn::DissolvedOxygen),
            temp_c: column_mean(samples, SampleColumn::Temperature),
            ph: column_mean(samples, SampleColumn::Ph),
            depth_m: column_mean(samples, SampleColumn::Depth),
        }
    }
}

/// Averages for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyAverage {
    /// e.g. "October 2024"
    pub month: String,
    pub sample_count: usize,
    pub odo_mg_l: Option<f64>,
    pub ph: Option<f64>,
    pub temp_c: Option<f64>,
}

/// Group dated samples by month, oldest first.
///
/// Samples without a date, and samples with a negative depth (sensor
/// artefacts), are left out.
pub fn monthly_averages(samples: &[WaterSample]) -> Vec<MonthlyAverage> {
    let mut by_month: BTreeMap<(i32, u32), Vec<WaterSample>> = BTreeMap::new();

    for sample in samples {
        let Some(date) = sample.date else { continue };
        if sample.depth_m.is_some_and(|d| d < 0.0) {
            continue;
        }
        by_month
            .entry((date.year(), date.month()))
            .or_default()
            .push(sample.clone());
    }

    by_month
        .into_iter()
        .map(|((year, month), group)| MonthlyAverage {
            month: month_label(year, month),
            sample_count: group.len(),
            odo_mg_l: column_mean(&group, SampleColumn::DissolvedOxygen),
            ph: column_mean(&group, SampleColumn::Ph),
            temp_c: column_mean(&group, SampleColumn::Temperature),
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{month:02}/{year}"))
}

fn column_mean(samples: &[WaterSample], column: SampleColumn) -> Option<f64> {
    let values: Vec<f64> = samples.iter().filter_map(|s| column.value(s)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
