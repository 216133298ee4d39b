//! The inference entry point shared by the CLI command and the runner.

use crate::error::ProjectResult;
use nightrate_core::{Frame, ModelArtifact, Predictor};
use std::path::Path;

/// Load a packaged model, predict over the input CSV, and write a single
/// `prediction` column to the output CSV (no index column). Returns the
/// number of prediction rows written.
pub fn predict_to_csv(
    model_path: &Path,
    input_path: &Path,
    output_path: &Path,
) -> ProjectResult<usize> {
    let model = ModelArtifact::load(model_path)?;
    let input = Frame::read_csv(input_path)?;
    let predictions = model.predict(&input)?;
    let n = predictions.len();

    Frame::single_numeric("prediction", predictions).write_csv(output_path)?;
    tracing::info!(
        rows = n,
        input = %input_path.display(),
        output = %output_path.display(),
        "wrote predictions"
    );
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use nightrate_core::{ForestParams, ForestRegressor};
    use tempfile::TempDir;

    fn saved_model(dir: &Path) -> std::path::PathBuf {
        let x = Array2::from_shape_vec(
            (6, 2),
            vec![1.0, 1.0, 2.0, 1.0, 3.0, 2.0, 4.0, 2.0, 5.0, 3.0, 6.0, 3.0],
        )
        .unwrap();
        let y = Array1::from_vec(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
        let names = vec!["accommodates".to_string(), "beds".to_string()];
        let params = ForestParams { n_trees: 4, max_depth: 4, ..ForestParams::default() };
        let model = ModelArtifact::per_person(
            ModelArtifact::Forest(
                ForestRegressor::fit(x.view(), y.view(), &names, &params).unwrap(),
            ),
            "accommodates",
        );
        let path = dir.join("model.json");
        model.save(&path).unwrap();
        path
    }

    #[test]
    fn test_predict_to_csv_writes_one_row_per_input() {
        let dir = TempDir::new().unwrap();
        let model_path = saved_model(dir.path());
        let input_path = dir.path().join("input.csv");
        std::fs::write(&input_path, "accommodates,beds\n1,1\n2,2\n4,3\n").unwrap();
        let output_path = dir.path().join("predictions.csv");

        let n = predict_to_csv(&model_path, &input_path, &output_path).unwrap();
        assert_eq!(n, 3);

        let written = std::fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = written.trim_end().lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "prediction");
        for line in &lines[1..] {
            line.parse::<f64>().unwrap();
        }
    }

    #[test]
    fn test_predict_to_csv_fails_without_occupancy_column() {
        let dir = TempDir::new().unwrap();
        let model_path = saved_model(dir.path());
        let input_path = dir.path().join("input.csv");
        std::fs::write(&input_path, "beds\n1\n2\n").unwrap();
        let output_path = dir.path().join("predictions.csv");

        let result = predict_to_csv(&model_path, &input_path, &output_path);
        assert!(result.is_err());
        assert!(!output_path.exists());
    }

    #[test]
    fn test_predict_to_csv_missing_model() {
        let dir = TempDir::new().unwrap();
        let result = predict_to_csv(
            &dir.path().join("nope.json"),
            &dir.path().join("input.csv"),
            &dir.path().join("out.csv"),
        );
        assert!(result.is_err());
    }
}
