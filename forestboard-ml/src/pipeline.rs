use std::path::{Path, PathBuf};

use serde::Serialize;

use forestboard_core::config::{Config, TrainingSection};
use forestboard_core::document::{
    ErrorDocument, Evaluation, ModelInfo, PredictionSample, ResultsDocument, TrainTestRatio,
    ALGORITHM_NAME, MODEL_TYPE,
};

use crate::dataset::{self, DatasetError, Table};
use crate::forest::{Classifier, ForestParams, RandomForest};
use crate::metrics::{accuracy, ConfusionMatrix};

/// Message of the error-tagged document written when the input is missing.
pub const DATA_UNAVAILABLE_MESSAGE: &str = "Data could not be loaded";

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("model fitting failed: {0}")]
    Fit(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// What a training run hands back: results, or an error report to be
/// stored in their place.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TrainOutcome {
    Trained(ResultsDocument),
    Failed(ErrorDocument),
}

impl TrainOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, TrainOutcome::Failed(_))
    }
}

/// Load → split → fit → evaluate → document.
pub struct TrainingJob {
    input: PathBuf,
    training: TrainingSection,
}

impl TrainingJob {
    pub fn new(input: impl Into<PathBuf>, training: TrainingSection) -> Self {
        Self {
            input: input.into(),
            training,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data.input, config.training.clone())
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Run the job against the configured input. A missing input file is
    /// not an error: it yields [`TrainOutcome::Failed`].
    pub fn run(&self) -> Result<TrainOutcome, TrainError> {
        let table = match dataset::load_csv(&self.input) {
            Ok(table) => table,
            Err(DatasetError::NotFound { path }) => {
                log::error!("no dataset at {}", path.display());
                return Ok(TrainOutcome::Failed(ErrorDocument {
                    error: DATA_UNAVAILABLE_MESSAGE.to_string(),
                }));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(TrainOutcome::Trained(self.train(&table)?))
    }

    /// Fit and evaluate on an already loaded table.
    pub fn train(&self, table: &Table) -> Result<ResultsDocument, TrainError> {
        let n = table.n_rows();
        if n < 2 {
            return Err(DatasetError::TooFewRows(n).into());
        }

        let cfg = &self.training;
        let (train_idx, test_idx) = if cfg.stratify {
            dataset::stratified_split(&table.labels, cfg.test_ratio, cfg.seed)
        } else {
            dataset::shuffle_split(n, cfg.test_ratio, cfg.seed)
        };
        log::info!(
            "split {} rows into {} train / {} test",
            n,
            train_idx.len(),
            test_idx.len()
        );

        let (x_train, y_train) = table.select(&train_idx);
        let (x_test, y_test) = table.select(&test_idx);

        let forest = RandomForest::train(&x_train, &y_train, &ForestParams::from(cfg))
            .map_err(TrainError::Fit)?;
        log::info!("trained {} with {} trees", forest.name(), forest.n_trees());

        let predicted = forest.predict(&x_test);
        let acc = accuracy(&y_test, &predicted);
        let confusion = ConfusionMatrix::new(&y_test, &predicted);
        log::info!("held-out accuracy {:.4}", acc);

        Ok(ResultsDocument {
            model_info: ModelInfo {
                algorithm: ALGORITHM_NAME.to_string(),
                accuracy: acc,
                data_shape: table.shape(),
                features_count: table.n_features(),
                train_size: train_idx.len(),
                test_size: test_idx.len(),
                train_test_ratio: TrainTestRatio::from_test_ratio(cfg.test_ratio),
            },
            predictions: PredictionSample::head(&predicted, &y_test, cfg.sample_limit),
            evaluation: Evaluation {
                accuracy_score: acc,
                model_type: MODEL_TYPE.to_string(),
                classification_report: confusion.report(),
                confusion_matrix: confusion.counts().to_vec(),
            },
        })
    }
}
