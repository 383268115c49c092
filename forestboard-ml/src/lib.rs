pub mod dataset;
pub mod forest;
pub mod metrics;
pub mod pipeline;

pub use pipeline::{TrainError, TrainOutcome, TrainingJob};
