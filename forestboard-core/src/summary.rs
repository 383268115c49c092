//! Dashboard summary derived from a loaded results document.
//!
//! The document may come from any producer, so every field is read through
//! an optional view and falls back to a fixed default when it is absent or
//! has the wrong shape:
//!
//! | field                | default                      |
//! |----------------------|------------------------------|
//! | `algorithm`          | `"Unknown"`                  |
//! | `accuracy`           | `0`                          |
//! | `data_shape`         | `[0, 0]`                     |
//! | `features_count`     | `0`                          |
//! | `train_size`         | `0`                          |
//! | `test_size`          | `0`                          |
//! | `train_test_ratio`   | `{train: 0.8, test: 0.2}`    |
//! | `total_predictions`  | `0`                          |
//! | report scores        | `0` per missing class/metric |
//! | `confusion_matrix`   | `[]`                         |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::document::TrainTestRatio;

const CLASS_0: &str = "0.0";
const CLASS_1: &str = "1.0";
const WEIGHTED_AVG: &str = "weighted avg";

/// Convert a 0–1 fraction to a percentage rounded to two decimals.
/// Exact halves round to the even neighbour.
pub fn percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub algorithm: String,
    pub accuracy: f64,
    pub data_shape: [u64; 2],
    pub features_count: u64,
    pub train_size: u64,
    pub test_size: u64,
    pub train_test_ratio: TrainTestRatio,
    pub total_predictions: u64,
    pub precision: ClassScores,
    pub recall: ClassScores,
    pub f1_score: ClassScores,
    pub confusion_matrix: Value,
}

/// One metric as a percentage for class 0, class 1 and the weighted average.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClassScores {
    pub class_0: f64,
    pub class_1: f64,
    pub weighted_avg: f64,
}

impl MetricsSummary {
    /// Derive the summary from a raw document. Never fails.
    pub fn from_document(doc: &Value) -> Self {
        let source: SourceView = serde_json::from_value(doc.clone()).unwrap_or_default();
        let info = source.model_info.unwrap_or_default();
        let evaluation = source.evaluation.unwrap_or_default();
        let predictions = source.predictions.unwrap_or_default();
        let report = evaluation.classification_report.unwrap_or_default();

        Self {
            algorithm: info.algorithm.unwrap_or_else(|| "Unknown".to_string()),
            accuracy: percent(info.accuracy.unwrap_or(0.0)),
            data_shape: info.data_shape.unwrap_or([0, 0]),
            features_count: info.features_count.unwrap_or(0),
            train_size: info.train_size.unwrap_or(0),
            test_size: info.test_size.unwrap_or(0),
            train_test_ratio: info.train_test_ratio.unwrap_or_default(),
            total_predictions: predictions.total_predictions.unwrap_or(0),
            precision: ClassScores::collect(&report, |m| m.precision),
            recall: ClassScores::collect(&report, |m| m.recall),
            f1_score: ClassScores::collect(&report, |m| m.f1_score),
            confusion_matrix: evaluation
                .confusion_matrix
                .unwrap_or_else(|| Value::Array(Vec::new())),
        }
    }
}

impl ClassScores {
    fn collect(report: &Map<String, Value>, pick: impl Fn(&ScoreView) -> Option<f64>) -> Self {
        let score = |key: &str| {
            let row: ScoreView = report
                .get(key)
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();
            percent(pick(&row).unwrap_or(0.0))
        };
        Self {
            class_0: score(CLASS_0),
            class_1: score(CLASS_1),
            weighted_avg: score(WEIGHTED_AVG),
        }
    }
}

// ---------------------------------------------------------------------------
// Optional views over the raw document
// ---------------------------------------------------------------------------

/// Deserialize a field as `Some(T)` when it has the expected shape and
/// `None` otherwise, so one bad field never rejects its parent.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Deserialize, Default)]
struct SourceView {
    #[serde(default, deserialize_with = "lenient")]
    model_info: Option<InfoView>,
    #[serde(default, deserialize_with = "lenient")]
    evaluation: Option<EvaluationView>,
    #[serde(default, deserialize_with = "lenient")]
    predictions: Option<TotalsView>,
}

#[derive(Deserialize, Default)]
struct InfoView {
    #[serde(default, deserialize_with = "lenient")]
    algorithm: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    data_shape: Option<[u64; 2]>,
    #[serde(default, deserialize_with = "lenient")]
    features_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    train_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    test_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    train_test_ratio: Option<TrainTestRatio>,
}

#[derive(Deserialize, Default)]
struct EvaluationView {
    #[serde(default, deserialize_with = "lenient")]
    classification_report: Option<Map<String, Value>>,
    #[serde(default)]
    confusion_matrix: Option<Value>,
}

#[derive(Deserialize, Default)]
struct TotalsView {
    #[serde(default, deserialize_with = "lenient")]
    total_predictions: Option<u64>,
}

#[derive(Deserialize, Default)]
struct ScoreView {
    #[serde(default, deserialize_with = "lenient")]
    precision: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    recall: Option<f64>,
    #[serde(default, rename = "f1-score", deserialize_with = "lenient")]
    f1_score: Option<f64>,
}
