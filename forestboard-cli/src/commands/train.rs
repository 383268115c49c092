use anyhow::{Context, Result};

use forestboard_core::config::Config;
use forestboard_core::store::ResultsStore;
use forestboard_ml::{TrainOutcome, TrainingJob};

use crate::output::{self, OutputFormat};

/// Train, store the outcome, and print it. A missing dataset still writes
/// the error document but ends the command with an error.
pub fn run(config: &Config, format: &str) -> Result<()> {
    let fmt = output::parse_format(format)?;
    let job = TrainingJob::from_config(config);
    let store = ResultsStore::new(&config.data.output);

    let outcome = job
        .run()
        .with_context(|| format!("training on {} failed", job.input().display()))?;
    store
        .write(&outcome)
        .with_context(|| format!("failed to write {}", store.path().display()))?;

    match (&outcome, fmt) {
        (_, OutputFormat::Json) => println!("{}", output::format_json(&outcome)?),
        (TrainOutcome::Trained(_), OutputFormat::Pretty) => {
            let summary = forestboard_core::load_summary(store.path())
                .context("failed to read back the results")?;
            print!("{}", output::format_pretty(&summary, store.path()));
        }
        (TrainOutcome::Failed(doc), OutputFormat::Pretty) => {
            print!("{}", output::format_failure(&doc.error, store.path()));
        }
    }

    if let TrainOutcome::Failed(doc) = &outcome {
        anyhow::bail!("{} ({} not found)", doc.error, job.input().display());
    }
    Ok(())
}
