//! Prediction collaborator seam.
//!
//! Models are trained offline and arrive as artifacts on disk. The service
//! only needs "given feature rows, return target rows", expressed by the
//! [`Predictor`] trait. [`LinearModel`] is the artifact format the service
//! loads itself: a JSON document with per-target coefficients.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::water_quality::{SampleColumn, WaterSample};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model file {0} not found. Train the model first.")]
    ArtifactMissing(String),

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Model feature '{0}' is not a known sample column")]
    UnknownFeature(String),

    #[error("Expected {expected} features per row, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("Model does not predict '{0}'")]
    MissingTarget(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::InvalidArtifact(err.to_string())
    }
}

/// A trained model that maps feature rows to target rows.
pub trait Predictor: Send + Sync {
    /// Sample column names the model expects, in input order.
    fn feature_names(&self) -> &[String];

    /// Names of the predicted quantities, in output order.
    fn target_names(&self) -> &[String];

    /// Predict one output row per input row.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError>;
}

/// Multi-output linear regression: `y[t] = intercepts[t] + coefficients[t] . x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    features: Vec<String>,
    targets: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearModel {
    pub fn new(
        features: Vec<String>,
        targets: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            features,
            targets,
            coefficients,
            intercepts,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a model artifact from a JSON file.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            warn!("Model artifact {} does not exist", path.display());
            return Err(ModelError::ArtifactMissing(path.display().to_string()));
        }

        let text = std::fs::read_to_string(path)?;
        let model: LinearModel = serde_json::from_str(&text)?;
        model.validate()?;

        info!(
            "Loaded model with {} features and {} targets from {}",
            model.features.len(),
            model.targets.len(),
            path.display()
        );
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.features.is_empty() || self.targets.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "model needs at least one feature and one target".to_string(),
            ));
        }
        if self.coefficients.len() != self.targets.len() || self.intercepts.len() != self.targets.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "{} targets but {} coefficient rows and {} intercepts",
                self.targets.len(),
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        if let Some(row) = self.coefficients.iter().find(|row| row.len() != self.features.len()) {
            return Err(ModelError::InvalidArtifact(format!(
                "coefficient row has {} entries for {} features",
                row.len(),
                self.features.len()
            )));
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn target_names(&self) -> &[String] {
        &self.targets
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        rows.iter()
            .map(|row| {
                if row.len() != self.features.len() {
                    return Err(ModelError::FeatureCount {
                        expected: self.features.len(),
                        actual: row.len(),
                    });
                }
                Ok(self
                    .coefficients
                    .iter()
                    .zip(&self.intercepts)
                    .map(|(coefs, intercept)| {
                        intercept + coefs.iter().zip(row).map(|(c, x)| c * x).sum::<f64>()
                    })
                    .collect())
            })
            .collect()
    }
}

/// A sample and the model's output for it. `predictions` is parallel to the
/// table's targets; a row with any missing feature has no predictions.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PredictedSample {
    pub sample: WaterSample,
    pub predictions: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PredictionTable {
    pub targets: Vec<String>,
    pub rows: Vec<PredictedSample>,
}

impl PredictionTable {
    /// Output column name for a target, e.g. "Predicted ODO mg/L".
    pub fn column_name(target: &str) -> String {
        format!("Predicted {target}")
    }

    pub fn target_index(&self, target: &str) -> Option<usize> {
        self.targets.iter().position(|t| t == target)
    }

    /// The predicted column for `target`, parallel to `rows`.
    pub fn column(&self, target: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.target_index(target)?;
        Some(self.rows.iter().map(|r| r.predictions[idx]).collect())
    }
}

/// Run `model` over `samples`, producing a parallel column per target.
#[instrument(skip(model, samples), fields(samples = samples.len()))]
pub fn predict_samples(
    model: &dyn Predictor,
    samples: &[WaterSample],
) -> Result<PredictionTable, ModelError> {
    let columns = model
        .feature_names()
        .iter()
        .map(|name| SampleColumn::from_header(name).ok_or_else(|| ModelError::UnknownFeature(name.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let feature_rows: Vec<Option<Vec<f64>>> = samples
        .iter()
        .map(|sample| columns.iter().map(|c| c.value(sample)).collect())
        .collect();
    let complete: Vec<Vec<f64>> = feature_rows.iter().flatten().cloned().collect();
    debug!(
        "{} of {} samples have every feature",
        complete.len(),
        samples.len()
    );

    let mut outputs = model.predict(&complete)?.into_iter();
    let target_count = model.target_names().len();

    let mut rows = Vec::with_capacity(samples.len());
    for (sample, features) in samples.iter().zip(&feature_rows) {
        let predictions = match features {
            Some(_) => {
                let output = outputs.next().ok_or_else(|| {
                    ModelError::InvalidArtifact("model returned fewer rows than requested".to_string())
                })?;
                if output.len() != target_count {
                    return Err(ModelError::InvalidArtifact(format!(
                        "model returned {} values for {} targets",
                        output.len(),
                        target_count
                    )));
                }
                output.into_iter().map(|v| v.is_finite().then_some(v)).collect()
            }
            None => vec![None; target_count],
        };
        rows.push(PredictedSample {
            sample: sample.clone(),
            predictions,
        });
    }

    Ok(PredictionTable {
        targets: model.target_names().to_vec(),
        rows,
    })
}

/// Mean squared error over the pairs where both values are present.
pub fn mean_squared_error(actual: &[Option<f64>], predicted: &[Option<f64>]) -> Option<f64> {
    let squared: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .filter_map(|(a, p)| Some((a.as_ref()? - p.as_ref()?).powi(2)))
        .collect();
    if squared.is_empty() {
        None
    } else {
        Some(squared.iter().sum::<f64>() / squared.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn odo_model() -> LinearModel {
        LinearModel::new(
            vec!["Depth m".into(), "Temp °C".into(), "pH".into(), "ODO mg/L".into()],
            vec!["ODO mg/L".into()],
            vec![vec![-0.1, 0.0, 0.0, 1.0]],
            vec![0.5],
        )
        .unwrap()
    }

    fn sample(depth: Option<f64>, odo: Option<f64>) -> WaterSample {
        WaterSample {
            depth_m: depth,
            temp_c: Some(25.0),
            ph: Some(8.0),
            odo_mg_l: odo,
            ..Default::default()
        }
    }

    #[test]
    fn test_linear_predict() {
        let model = odo_model();
        let out = model.predict(&[vec![10.0, 25.0, 8.0, 6.0]]).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0][0] - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let err = odo_model().predict(&[vec![1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, ModelError::FeatureCount { expected: 4, actual: 2 }));
    }

    #[test]
    fn test_new_rejects_mismatched_shapes() {
        let err = LinearModel::new(
            vec!["pH".into()],
            vec!["ODO mg/L".into()],
            vec![vec![1.0, 2.0]],
            vec![0.0],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidArtifact(_)));

        let err = LinearModel::new(vec!["pH".into()], vec!["ODO mg/L".into()], vec![], vec![]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArtifact(_)));
    }

    #[test]
    fn test_load_missing_artifact() {
        let err = LinearModel::load(Path::new("/nonexistent/models/odo_model.json")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Model file /nonexistent/models/odo_model.json not found. Train the model first."
        );
    }

    #[test]
    fn test_predict_samples_parallel_column() {
        let samples = vec![
            sample(Some(0.0), Some(7.0)),
            sample(None, Some(7.0)),
            sample(Some(10.0), Some(3.0)),
        ];
        let table = predict_samples(&odo_model(), &samples).unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.targets, vec!["ODO mg/L".to_string()]);
        let column = table.column("ODO mg/L").unwrap();
        assert!((column[0].unwrap() - 7.5).abs() < 1e-9);
        assert_eq!(column[1], None);
        assert!((column[2].unwrap() - 2.5).abs() < 1e-9);
        assert_eq!(PredictionTable::column_name("ODO mg/L"), "Predicted ODO mg/L");
    }

    #[test]
    fn test_predict_samples_unknown_feature() {
        let model = LinearModel::new(
            vec!["Salinity".into()],
            vec!["ODO mg/L".into()],
            vec![vec![1.0]],
            vec![0.0],
        )
        .unwrap();
        let err = predict_samples(&model, &[sample(Some(1.0), Some(1.0))]).unwrap_err();
        assert!(matches!(err, ModelError::UnknownFeature(name) if name == "Salinity"));
    }

    #[test]
    fn test_mean_squared_error() {
        let actual = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        let predicted = vec![Some(2.0), Some(2.0), Some(9.0), Some(2.0)];
        assert_eq!(mean_squared_error(&actual, &predicted), Some(5.0 / 3.0));
        assert_eq!(mean_squared_error(&[None], &[Some(1.0)]), None);
    }
}
