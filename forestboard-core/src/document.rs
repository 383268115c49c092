use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Algorithm name recorded in `model_info.algorithm`.
pub const ALGORITHM_NAME: &str = "Random Forest";

/// Value of `evaluation.model_type`; the job only ever trains classifiers.
pub const MODEL_TYPE: &str = "classification";

/// Number of aligned prediction pairs kept in the document.
pub const DEFAULT_SAMPLE_LIMIT: usize = 10;

/// The artifact written by the training job and read by the query service.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsDocument {
    pub model_info: ModelInfo,
    pub predictions: PredictionSample,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub algorithm: String,
    /// Fraction of held-out samples predicted correctly (0.0–1.0).
    pub accuracy: f64,
    /// `[rows, columns]` of the full input table, label column included.
    pub data_shape: [usize; 2],
    pub features_count: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub train_test_ratio: TrainTestRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainTestRatio {
    pub train: f64,
    pub test: f64,
}

impl TrainTestRatio {
    pub fn from_test_ratio(test: f64) -> Self {
        Self {
            train: 1.0 - test,
            test,
        }
    }
}

impl Default for TrainTestRatio {
    fn default() -> Self {
        Self {
            train: 0.8,
            test: 0.2,
        }
    }
}

/// Index-aligned head of the test-set predictions.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionSample {
    pub predicted_values: Vec<f64>,
    pub actual_values: Vec<f64>,
    /// Size of the whole test set, not of the sample.
    pub total_predictions: usize,
}

impl PredictionSample {
    /// Keep the first `limit` pairs. Both sequences are cut to the same
    /// length so `predicted_values[i]` and `actual_values[i]` stay aligned.
    pub fn head(predicted: &[f64], actual: &[f64], limit: usize) -> Self {
        let n = predicted.len().min(actual.len()).min(limit);
        Self {
            predicted_values: predicted[..n].to_vec(),
            actual_values: actual[..n].to_vec(),
            total_predictions: predicted.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy_score: f64,
    pub model_type: String,
    pub classification_report: ClassificationReport,
    /// Rows are true classes, columns predicted classes.
    pub confusion_matrix: Vec<Vec<u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class scores followed by the aggregate rows.
///
/// Serializes as a flat object keyed by class label, then `"accuracy"`,
/// `"macro avg"` and `"weighted avg"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationReport {
    pub classes: Vec<(String, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn class(&self, key: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|(k, _)| k == key).map(|(_, m)| m)
    }
}

impl Serialize for ClassificationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len() + 3))?;
        for (label, metrics) in &self.classes {
            map.serialize_entry(label, metrics)?;
        }
        map.serialize_entry("accuracy", &self.accuracy)?;
        map.serialize_entry("macro avg", &self.macro_avg)?;
        map.serialize_entry("weighted avg", &self.weighted_avg)?;
        map.end()
    }
}

/// Written in place of a [`ResultsDocument`] when training could not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub error: String,
}

/// Render a label the way report keys spell it: integral values keep one
/// decimal (`1` → `"1.0"`), everything else uses the shortest form.
pub fn class_key(label: f64) -> String {
    if label.is_finite() && label.fract() == 0.0 {
        format!("{label:.1}")
    } else {
        label.to_string()
    }
}
