//! End-to-end runs of `forestboard train` against the loans fixture.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn fixture_csv() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../forestboard-ml/tests/fixtures/loans.csv")
}

fn forestboard(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_forestboard"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run forestboard")
}

#[test]
fn train_writes_and_prints_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture_csv();
    let out = forestboard(
        dir.path(),
        &[
            "train",
            "--input",
            input.to_str().unwrap(),
            "--output",
            "artifacts/model_results.json",
            "--trees",
            "20",
        ],
    );
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let printed: Value = serde_json::from_slice(&out.stdout).unwrap();
    let written = std::fs::read_to_string(dir.path().join("artifacts/model_results.json")).unwrap();
    let written: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(printed, written);
    assert_eq!(written["model_info"]["data_shape"], serde_json::json!([60, 5]));
    assert_eq!(written["predictions"]["total_predictions"], 12);
}

#[test]
fn missing_input_writes_error_document_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = forestboard(
        dir.path(),
        &["train", "--input", "absent.csv", "--output", "results.json"],
    );
    assert!(!out.status.success());

    let written = std::fs::read_to_string(dir.path().join("results.json")).unwrap();
    let written: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(written, serde_json::json!({"error": "Data could not be loaded"}));

    let printed: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(printed, written);
}

#[test]
fn config_file_and_pretty_format() {
    let dir = tempfile::tempdir().unwrap();
    let config = format!(
        "[data]\ninput = {:?}\noutput = \"out/model_results.json\"\n\n[training]\nn_trees = 15\nseed = 7\n",
        fixture_csv().to_str().unwrap()
    );
    std::fs::write(dir.path().join("forestboard.toml"), config).unwrap();

    let out = forestboard(dir.path(), &["train", "--format", "pretty"]);
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Algorithm: Random Forest"), "{stdout}");
    assert!(stdout.contains("60 rows x 5 columns"), "{stdout}");
    assert!(dir.path().join("out/model_results.json").is_file());
}

#[test]
fn unknown_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture_csv();
    let out = forestboard(
        dir.path(),
        &["train", "--input", input.to_str().unwrap(), "--format", "yaml"],
    );
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown format"));
}
