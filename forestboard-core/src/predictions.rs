use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::summary::lenient;

/// One predicted/actual pair as the dashboard renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedPrediction {
    /// 1-based position in the sample.
    pub index: usize,
    pub predicted: Value,
    pub actual: Value,
    pub correct: bool,
}

/// The prediction sample zipped into rows, plus the true test-set size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionTable {
    pub predictions: Vec<FormattedPrediction>,
    pub total_predictions: u64,
    pub sample_size: usize,
}

impl PredictionTable {
    /// Zip `predicted_values` with `actual_values`, stopping at the shorter
    /// sequence or at `limit`. A missing or mistyped `predictions` section
    /// gives an empty table.
    pub fn from_document(doc: &Value, limit: usize) -> Self {
        let view: PredictionsView = doc
            .get("predictions")
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .unwrap_or_default();

        let predictions: Vec<FormattedPrediction> = view
            .predicted_values
            .unwrap_or_default()
            .into_iter()
            .zip(view.actual_values.unwrap_or_default())
            .take(limit)
            .enumerate()
            .map(|(i, (predicted, actual))| FormattedPrediction {
                index: i + 1,
                correct: predicted == actual,
                predicted,
                actual,
            })
            .collect();

        Self {
            sample_size: predictions.len(),
            total_predictions: view.total_predictions.unwrap_or(0),
            predictions,
        }
    }
}

#[derive(Deserialize, Default)]
struct PredictionsView {
    #[serde(default, deserialize_with = "lenient")]
    predicted_values: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    actual_values: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    total_predictions: Option<u64>,
}
