//! The multistep handoff unit.
//!
//! One self-contained pipeline: log a raw data file as an artifact of a new
//! run, download it back by (run id, sub-path) into a scratch directory,
//! train a gradient-boosted model on the downloaded copy, record the second
//! run, and hand a structured outcome back to the caller.

use crate::error::{ProjectError, ProjectResult};
use nightrate_core::{
    evaluate, prepare, train_test_split, BoostedParams, BoostedRegressor, Frame, ModelArtifact,
    PrepareOptions,
};
use nightrate_tracking::{ModelUri, TrackingStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Artifact sub-path the raw data is logged under.
pub const DATA_ARTIFACT: &str = "data-csv";
/// Artifact sub-path the trained model is logged under.
pub const MODEL_ARTIFACT: &str = "boosted-model";

const SPLIT_SEED: u64 = 42;
const TEST_FRACTION: f64 = 0.25;

/// The three externally supplied training parameters.
///
/// They arrive as strings; `from_strings` is the one place they are parsed,
/// so a malformed value fails the whole unit immediately with an error
/// naming the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
}

impl StepParams {
    pub const DEFAULT_N_ESTIMATORS: &'static str = "100";
    pub const DEFAULT_LEARNING_RATE: &'static str = ".1";
    pub const DEFAULT_MAX_DEPTH: &'static str = "1";

    pub fn from_strings(
        n_estimators: &str,
        learning_rate: &str,
        max_depth: &str,
    ) -> ProjectResult<Self> {
        let n_estimators = parse_param("n_estimators", n_estimators, str::parse::<usize>)?;
        let learning_rate = parse_param("learning_rate", learning_rate, parse_float)?;
        let max_depth = parse_param("max_depth", max_depth, str::parse::<usize>)?;
        if n_estimators == 0 {
            return Err(ProjectError::Parameter {
                name: "n_estimators".to_string(),
                reason: "must be >= 1".to_string(),
            });
        }
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ProjectError::Parameter {
                name: "learning_rate".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if max_depth == 0 {
            return Err(ProjectError::Parameter {
                name: "max_depth".to_string(),
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(Self { n_estimators, learning_rate, max_depth })
    }

    #[must_use]
    pub fn to_boosted(self) -> BoostedParams {
        BoostedParams {
            n_stages: self.n_estimators,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            ..BoostedParams::default()
        }
    }
}

impl Default for StepParams {
    fn default() -> Self {
        Self { n_estimators: 100, learning_rate: 0.1, max_depth: 1 }
    }
}

fn parse_float(raw: &str) -> Result<f64, std::num::ParseFloatError> {
    // Accept the ".1" shorthand the defaults use.
    raw.parse::<f64>()
}

fn parse_param<T, E: std::fmt::Display>(
    name: &str,
    raw: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> ProjectResult<T> {
    parse(raw.trim()).map_err(|e| ProjectError::Parameter {
        name: name.to_string(),
        reason: format!("{:?} is not valid: {e}", raw.trim()),
    })
}

/// What the unit reports back to its caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub status: String,
    pub model_uri: ModelUri,
    pub data_path: PathBuf,
}

/// Run the whole handoff: log → download → train → log → report.
pub fn run_multistep(
    store: &TrackingStore,
    raw_csv: &Path,
    params: &StepParams,
    scratch_dir: &Path,
) -> ProjectResult<StepOutcome> {
    // First run: the raw data becomes a tracked artifact.
    let mut data_run = store.start_run("multistep")?;
    data_run.log_artifact(raw_csv, DATA_ARTIFACT)?;
    let data_run_id = data_run.finish()?;

    // Pull it back out by (run id, sub-path), as a downstream step would.
    let local_dir = store.download_artifacts(&data_run_id, DATA_ARTIFACT, scratch_dir)?;
    let data_path = first_file(&local_dir)?;
    tracing::info!(data = %data_path.display(), "training input resolved from artifacts");

    let frame = Frame::read_csv(&data_path)?;
    let options = PrepareOptions {
        label_column: "price".to_string(),
        currency_columns: vec!["price".to_string()],
        drop_columns: vec![],
    };
    let prepared = prepare(&frame, &options)?;
    let split = train_test_split(&prepared, TEST_FRACTION, SPLIT_SEED)?;

    let boosted_params = params.to_boosted();
    let model = BoostedRegressor::fit(
        split.x_train.view(),
        split.y_train.view(),
        &prepared.feature_names,
        &boosted_params,
    )?;
    let predictions = model.predict(split.x_test.view())?;
    let eval = evaluate(&split.y_test.to_vec(), &predictions);

    // Second run: model, params, metrics.
    let mut train_run = store.start_run("gradient-boosted")?;
    let model_uri = train_run.log_model(&ModelArtifact::Boosted(model), MODEL_ARTIFACT)?;
    train_run.log_param("n_estimators", params.n_estimators);
    train_run.log_param("learning_rate", params.learning_rate);
    train_run.log_param("max_depth", params.max_depth);
    train_run.log_metric("mse", eval.mse);
    train_run.log_metric("mae", eval.mae);
    train_run.log_metric("r2", eval.r2);
    train_run.finish()?;

    Ok(StepOutcome { status: "OK".to_string(), model_uri, data_path })
}

/// The first regular file of a directory, in lexicographic order, so the
/// training input choice is deterministic.
fn first_file(dir: &Path) -> ProjectResult<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files.into_iter().next().ok_or_else(|| {
        ProjectError::Descriptor(format!("no files downloaded into {}", dir.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightrate_core::Predictor;
    use tempfile::TempDir;

    fn cleaned_csv(path: &Path) {
        let mut csv = String::from("price,accommodates,beds\n");
        for i in 0..24 {
            csv.push_str(&format!(
                "{},{},{}\n",
                100 + 10 * (i % 5),
                1 + i % 4,
                1 + i % 2
            ));
        }
        std::fs::write(path, csv).unwrap();
    }

    #[test]
    fn test_from_strings_accepts_defaults() {
        let params = StepParams::from_strings(
            StepParams::DEFAULT_N_ESTIMATORS,
            StepParams::DEFAULT_LEARNING_RATE,
            StepParams::DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        assert_eq!(params, StepParams::default());
    }

    #[test]
    fn test_from_strings_names_the_bad_parameter() {
        let err = StepParams::from_strings("100", "fast", "1").unwrap_err();
        match err {
            ProjectError::Parameter { name, .. } => assert_eq!(name, "learning_rate"),
            other => panic!("unexpected error: {other:?}"),
        }
        let err = StepParams::from_strings("many", ".1", "1").unwrap_err();
        match err {
            ProjectError::Parameter { name, .. } => assert_eq!(name, "n_estimators"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_strings_rejects_zero_learning_rate() {
        assert!(StepParams::from_strings("100", "0", "1").is_err());
    }

    #[test]
    fn test_run_multistep_end_to_end() {
        let dir = TempDir::new().unwrap();
        let store = TrackingStore::open(dir.path().join("store")).unwrap();
        let raw = dir.path().join("listings.csv");
        cleaned_csv(&raw);

        let params = StepParams { n_estimators: 20, ..StepParams::default() };
        let outcome =
            run_multistep(&store, &raw, &params, &dir.path().join("scratch")).unwrap();

        assert_eq!(outcome.status, "OK");
        assert!(outcome.data_path.exists());

        // The model URI resolves to a usable model.
        let model = store.load_model(&outcome.model_uri).unwrap();
        let frame = Frame::from_reader("accommodates,beds\n2,1\n".as_bytes()).unwrap();
        assert_eq!(model.predict(&frame).unwrap().len(), 1);

        // Both runs are sealed with the expected records.
        let manifest = store.read_manifest(&outcome.model_uri.run_id).unwrap();
        assert_eq!(manifest.params["n_estimators"], "20");
        assert!(manifest.metrics.contains_key("mse"));
        assert!(manifest.metrics.contains_key("mae"));
        assert!(manifest.metrics.contains_key("r2"));

        let runs = store.list_runs().unwrap();
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn test_outcome_serializes_for_the_caller() {
        let outcome = StepOutcome {
            status: "OK".to_string(),
            model_uri: "runs:/abc/boosted-model".parse().unwrap(),
            data_path: PathBuf::from("/tmp/scratch/data-csv/listings.csv"),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"OK\""));
        assert!(json.contains("runs:/abc/boosted-model"));
    }
}
