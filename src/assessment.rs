//! Fish-kill risk assessment: predict ODO for each sample, then classify.

use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::prediction::{mean_squared_error, predict_samples, ModelError, PredictionTable, Predictor};
use crate::risk::{CriticalConditions, RiskLevel, RiskSummary, Severity};
use crate::water_quality::{SampleColumn, WaterSample};

/// Target name the ODO model must predict.
pub const ODO_TARGET: &str = "ODO mg/L";
pub const TEMPERATURE_TARGET: &str = "Temp °C";
pub const PH_TARGET: &str = "pH";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AssessedSample {
    pub sample: WaterSample,
    pub predicted_odo_mg_l: Option<f64>,
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RiskAssessment {
    pub rows: Vec<AssessedSample>,
    pub summary: RiskSummary,
    pub severity: Severity,
    pub message: String,
    /// Error of the predicted ODO against the measured ODO, where both exist.
    pub mean_squared_error: Option<f64>,
}

/// Predict ODO with `model` and classify every sample.
///
/// Samples the model cannot score (missing features, non-finite output) are
/// kept with no level and counted as unclassified.
#[instrument(skip(model, samples), fields(samples = samples.len()))]
pub fn assess_risk(
    model: &dyn Predictor,
    samples: &[WaterSample],
) -> Result<RiskAssessment, ModelError> {
    let table = predict_samples(model, samples)?;
    let odo_idx = table
        .target_index(ODO_TARGET)
        .ok_or_else(|| ModelError::MissingTarget(ODO_TARGET.to_string()))?;

    let rows: Vec<AssessedSample> = table
        .rows
        .into_iter()
        .map(|row| {
            let predicted = row.predictions[odo_idx];
            AssessedSample {
                risk_level: predicted.and_then(RiskLevel::try_from_odo),
                predicted_odo_mg_l: predicted,
                sample: row.sample,
            }
        })
        .collect();

    let summary = RiskSummary::from_levels(rows.iter().map(|r| r.risk_level));
    let severity = summary.severity();
    let actual: Vec<Option<f64>> = rows.iter().map(|r| r.sample.odo_mg_l).collect();
    let predicted: Vec<Option<f64>> = rows.iter().map(|r| r.predicted_odo_mg_l).collect();

    info!(
        "Assessed {} samples: {} high, {} moderate, {} low, {} unclassified",
        rows.len(),
        summary.high,
        summary.moderate,
        summary.low,
        summary.unclassified
    );

    Ok(RiskAssessment {
        mean_squared_error: mean_squared_error(&actual, &predicted),
        message: severity.message().to_string(),
        severity,
        summary,
        rows,
    })
}

/// Error of one predicted target against its measured column.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TargetError {
    pub target: String,
    pub mean_squared_error: Option<f64>,
}

/// Output of a multi-target water-quality prediction run.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WaterQualityForecast {
    pub table: PredictionTable,
    pub critical_conditions: CriticalConditions,
    pub errors: Vec<TargetError>,
}

/// Predict every target the model offers and count critical zones.
#[instrument(skip(model, samples), fields(samples = samples.len()))]
pub fn forecast_water_quality(
    model: &dyn Predictor,
    samples: &[WaterSample],
) -> Result<WaterQualityForecast, ModelError> {
    let table = predict_samples(model, samples)?;

    let odo = table.column(ODO_TARGET);
    let temp = table.column(TEMPERATURE_TARGET);
    let ph = table.column(PH_TARGET);
    let at = |column: &Option<Vec<Option<f64>>>, i: usize| column.as_ref().and_then(|c| c[i]);
    let critical_conditions = CriticalConditions::tally(
        (0..table.rows.len()).map(|i| (at(&odo, i), at(&temp, i), at(&ph, i))),
    );

    let errors = table
        .targets
        .iter()
        .enumerate()
        .filter_map(|(idx, target)| {
            let column = SampleColumn::from_header(target)?;
            let actual: Vec<Option<f64>> = table.rows.iter().map(|r| column.value(&r.sample)).collect();
            let predicted: Vec<Option<f64>> = table.rows.iter().map(|r| r.predictions[idx]).collect();
            Some(TargetError {
                target: target.clone(),
                mean_squared_error: mean_squared_error(&actual, &predicted),
            })
        })
        .collect();

    Ok(WaterQualityForecast {
        table,
        critical_conditions,
        errors,
    })
}
