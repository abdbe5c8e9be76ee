use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::assessment::{self, RiskAssessment, WaterQualityForecast};
use crate::export;
use crate::prediction::LinearModel;
use crate::risk::{RiskLevel, RiskSummary, Severity};
use crate::water_quality::{self, MonthlyAverage, SampleAverages, SampleTable};

use super::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Classification {
    pub levels: Vec<Option<RiskLevel>>,
    pub summary: RiskSummary,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SampleSummary {
    pub row_count: usize,
    pub has_missing_values: bool,
    pub averages: SampleAverages,
    pub monthly: Vec<MonthlyAverage>,
}

/// Risk assessment and prediction over uploaded sample tables.
///
/// Model artifacts are read from disk on every call so a retrained model is
/// picked up without a restart.
#[derive(Clone)]
pub struct RiskService {
    odo_model_path: PathBuf,
    multi_output_model_path: PathBuf,
}

impl RiskService {
    pub fn new(odo_model_path: impl Into<PathBuf>, multi_output_model_path: impl Into<PathBuf>) -> Self {
        Self {
            odo_model_path: odo_model_path.into(),
            multi_output_model_path: multi_output_model_path.into(),
        }
    }

    /// Classify ODO values directly. `None` and non-finite values are
    /// unclassified.
    pub fn classify(&self, values: &[Option<f64>]) -> Classification {
        let levels: Vec<Option<RiskLevel>> = values
            .iter()
            .map(|v| v.and_then(RiskLevel::try_from_odo))
            .collect();
        let summary = RiskSummary::from_levels(levels.iter().copied());
        let severity = summary.severity();
        Classification {
            levels,
            message: severity.message().to_string(),
            severity,
            summary,
        }
    }

    fn read_table(&self, csv_text: &str) -> Result<SampleTable, ServiceError> {
        let table = water_quality::read_samples(csv_text)?;
        if table.has_missing_values() {
            warn!("Sample table contains missing values; affected rows are not scored");
        }
        Ok(table)
    }

    #[instrument(skip(self, csv_text), fields(size = csv_text.len()))]
    pub fn assess_csv(&self, csv_text: &str) -> Result<RiskAssessment, ServiceError> {
        let table = self.read_table(csv_text)?;
        let model = LinearModel::load(&self.odo_model_path)?;
        let result = assessment::assess_risk(&model, &table.samples)?;
        info!("Risk assessment severity: {:?}", result.severity);
        Ok(result)
    }

    /// Assess and render the result as CSV with `Predicted ODO mg/L` and
    /// `Risk Level` columns.
    pub fn assess_csv_export(&self, csv_text: &str) -> Result<String, ServiceError> {
        let result = self.assess_csv(csv_text)?;
        Ok(export::assessment_to_csv(&result.rows)?)
    }

    #[instrument(skip(self, csv_text), fields(size = csv_text.len()))]
    pub fn forecast_csv(&self, csv_text: &str) -> Result<WaterQualityForecast, ServiceError> {
        let table = self.read_table(csv_text)?;
        let model = LinearModel::load(&self.multi_output_model_path)?;
        let forecast = assessment::forecast_water_quality(&model, &table.samples)?;
        info!(
            "Forecast {} rows, {} zones at risk",
            forecast.table.rows.len(),
            forecast.critical_conditions.at_risk_zones
        );
        Ok(forecast)
    }

    /// Averages and month-by-month comparison of an uploaded table.
    pub fn summarize_csv(&self, csv_text: &str) -> Result<SampleSummary, ServiceError> {
        let table = self.read_table(csv_text)?;
        Ok(SampleSummary {
            row_count: table.len(),
            has_missing_values: table.has_missing_values(),
            averages: SampleAverages::from_samples(&table.samples),
            monthly: water_quality::monthly_averages(&table.samples),
        })
    }
}
