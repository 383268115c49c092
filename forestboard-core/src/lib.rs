#![deny(dead_code)]

pub mod config;
pub mod document;
pub mod predictions;
pub mod store;
pub mod summary;

use std::path::Path;

use store::{DataUnavailable, ResultsStore};
use summary::MetricsSummary;

/// Load the results document at `path` and derive its dashboard summary.
pub fn load_summary(path: &Path) -> Result<MetricsSummary, DataUnavailable> {
    let doc = ResultsStore::new(path).load()?;
    Ok(MetricsSummary::from_document(&doc))
}
