//! Integration tests for the `nightrate predict` command.

use assert_cmd::Command;
use ndarray::{Array1, Array2};
use nightrate_core::{ForestParams, ForestRegressor, ModelArtifact};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Save a per-person wrapped forest for the tests to load.
fn saved_model(dir: &Path) -> PathBuf {
    let x = Array2::from_shape_vec(
        (8, 2),
        vec![
            1.0, 1.0, 2.0, 1.0, 3.0, 2.0, 4.0, 2.0, 5.0, 1.0, 6.0, 1.0, 7.0, 2.0, 8.0, 2.0,
        ],
    )
    .unwrap();
    let y = Array1::from_vec(vec![80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0, 220.0]);
    let names = vec!["accommodates".to_string(), "beds".to_string()];
    let params = ForestParams { n_trees: 5, max_depth: 4, ..ForestParams::default() };
    let model = ModelArtifact::per_person(
        ModelArtifact::Forest(ForestRegressor::fit(x.view(), y.view(), &names, &params).unwrap()),
        "accommodates",
    );
    let path = dir.join("model.json");
    model.save(&path).unwrap();
    path
}

#[test]
fn test_predict_writes_one_row_per_input() {
    let temp_dir = TempDir::new().unwrap();
    let model_path = saved_model(temp_dir.path());
    let input_path = temp_dir.path().join("input.csv");
    std::fs::write(&input_path, "accommodates,beds\n1,1\n2,2\n4,1\n").unwrap();
    let output_path = temp_dir.path().join("predictions.csv");

    let mut cmd = Command::cargo_bin("nightrate").unwrap();
    cmd.arg("predict")
        .arg("--model-path")
        .arg(&model_path)
        .arg("--input-path")
        .arg(&input_path)
        .arg("--output-path")
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 predictions"));

    let written = std::fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = written.trim_end().lines().collect();
    assert_eq!(lines.len(), 4, "header plus exactly 3 prediction rows");
    assert_eq!(lines[0], "prediction", "single column, no index");
    for line in &lines[1..] {
        line.parse::<f64>().unwrap();
    }
}

#[test]
fn test_predict_fails_without_occupancy_column() {
    let temp_dir = TempDir::new().unwrap();
    let model_path = saved_model(temp_dir.path());
    let input_path = temp_dir.path().join("input.csv");
    std::fs::write(&input_path, "beds\n1\n2\n").unwrap();
    let output_path = temp_dir.path().join("predictions.csv");

    let mut cmd = Command::cargo_bin("nightrate").unwrap();
    cmd.arg("predict")
        .arg("--model-path")
        .arg(&model_path)
        .arg("--input-path")
        .arg(&input_path)
        .arg("--output-path")
        .arg(&output_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("occupancy"));
    assert!(!output_path.exists());
}

#[test]
fn test_predict_fails_on_missing_model() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("input.csv");
    std::fs::write(&input_path, "accommodates\n1\n").unwrap();

    let mut cmd = Command::cargo_bin("nightrate").unwrap();
    cmd.arg("predict")
        .arg("--model-path")
        .arg(temp_dir.path().join("nope.json"))
        .arg("--input-path")
        .arg(&input_path)
        .arg("--output-path")
        .arg(temp_dir.path().join("out.csv"))
        .assert()
        .failure();
}

#[test]
fn test_predict_requires_all_three_options() {
    let mut cmd = Command::cargo_bin("nightrate").unwrap();
    cmd.arg("predict").assert().failure().stderr(predicate::str::contains("--model-path"));
}
