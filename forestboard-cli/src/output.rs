use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use forestboard_core::summary::{ClassScores, MetricsSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Pretty,
}

pub fn parse_format(s: &str) -> anyhow::Result<OutputFormat> {
    match s {
        "json" => Ok(OutputFormat::Json),
        "pretty" => Ok(OutputFormat::Pretty),
        other => anyhow::bail!("unknown format: {other} (expected json or pretty)"),
    }
}

/// Pretty JSON, exactly as written to the results file.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn bar(pct: f64) -> String {
    let len = (pct.clamp(0.0, 100.0) / 100.0 * 30.0) as usize;
    "█".repeat(len)
}

fn score_line(label: &str, scores: &ClassScores) -> String {
    format!(
        "  {:<10} {:>7.2}% {:>7.2}% {:>7.2}%\n",
        label, scores.class_0, scores.class_1, scores.weighted_avg
    )
}

/// Terminal summary of a finished training run.
pub fn format_pretty(summary: &MetricsSummary, results: &Path) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", "Results:".bold(), results.display()));
    out.push_str(&format!("{} {}\n", "Algorithm:".bold(), summary.algorithm));
    let acc = format!("{:.2}%", summary.accuracy);
    let acc = if summary.accuracy >= 80.0 {
        acc.green()
    } else if summary.accuracy >= 60.0 {
        acc.yellow()
    } else {
        acc.red()
    };
    out.push_str(&format!(
        "{} {} {}\n",
        "Accuracy:".bold(),
        bar(summary.accuracy).cyan(),
        acc.bold()
    ));
    out.push_str(&format!(
        "{} {} rows x {} columns | {} {} | {} {}/{} ({:.0}%/{:.0}%)\n",
        "Data:".dimmed(),
        summary.data_shape[0],
        summary.data_shape[1],
        "Features:".dimmed(),
        summary.features_count,
        "Split:".dimmed(),
        summary.train_size,
        summary.test_size,
        summary.train_test_ratio.train * 100.0,
        summary.train_test_ratio.test * 100.0,
    ));

    out.push_str(&format!(
        "\n{}\n  {:<10} {:>8} {:>8} {:>8}\n",
        "Scores:".bold(),
        "",
        "class 0",
        "class 1",
        "weighted"
    ));
    out.push_str(&score_line("precision", &summary.precision));
    out.push_str(&score_line("recall", &summary.recall));
    out.push_str(&score_line("f1", &summary.f1_score));

    if let Some(rows) = summary.confusion_matrix.as_array().filter(|r| !r.is_empty()) {
        out.push_str(&format!("\n{}\n", "Confusion matrix:".bold()));
        for row in rows {
            let cells: Vec<String> = row
                .as_array()
                .map(|cells| cells.iter().map(|c| format!("{:>6}", c.to_string())).collect())
                .unwrap_or_default();
            out.push_str(&format!("  {}\n", cells.join("")));
        }
    }

    out.push_str(&format!(
        "\n{} {} predictions on the held-out set\n",
        "Test:".dimmed(),
        summary.total_predictions
    ));
    out
}

/// One-line report for a run that stored an error document instead.
pub fn format_failure(message: &str, results: &Path) -> String {
    format!(
        "{} {}\n{} {}\n",
        "Training failed:".red().bold(),
        message,
        "Wrote:".dimmed(),
        results.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary() -> MetricsSummary {
        MetricsSummary::from_document(&json!({
            "model_info": {"algorithm": "Random Forest", "accuracy": 0.9, "data_shape": [50, 4], "features_count": 3},
            "predictions": {"total_predictions": 10},
            "evaluation": {
                "classification_report": {
                    "0.0": {"precision": 1.0, "recall": 0.8, "f1-score": 0.8889},
                    "1.0": {"precision": 0.8333, "recall": 1.0, "f1-score": 0.9091}
                },
                "confusion_matrix": [[4, 1], [0, 5]]
            }
        }))
    }

    #[test]
    fn parse_known_formats() {
        assert_eq!(parse_format("json").unwrap(), OutputFormat::Json);
        assert_eq!(parse_format("pretty").unwrap(), OutputFormat::Pretty);
        assert!(parse_format("yaml").is_err());
    }

    #[test]
    fn pretty_contains_headline_numbers() {
        colored::control::set_override(false);
        let text = format_pretty(&summary(), Path::new("artifacts/model_results.json"));
        assert!(text.contains("Algorithm: Random Forest"));
        assert!(text.contains("90.00%"));
        assert!(text.contains("50 rows x 4 columns"));
        assert!(text.contains("83.33%"));
        assert!(text.contains("Confusion matrix:"));
        assert!(text.contains("     4     1"));
    }

    #[test]
    fn json_is_pretty_printed() {
        let text = format_json(&json!({"error": "Data could not be loaded"})).unwrap();
        assert_eq!(text, "{\n  \"error\": \"Data could not be loaded\"\n}");
    }

    #[test]
    fn failure_names_message() {
        colored::control::set_override(false);
        let text = format_failure("Data could not be loaded", Path::new("out.json"));
        assert!(text.contains("Training failed: Data could not be loaded"));
        assert!(text.contains("out.json"));
    }
}
