//! Train command implementation.

use colored::Colorize;
use nightrate_core::{
    evaluate, prepare, train_test_split, ForestParams, ForestRegressor, Frame, ModelArtifact,
    PrepareOptions,
};
use nightrate_tracking::TrackingStore;
use std::path::Path;

/// Artifact name the trained forest is logged under.
pub const MODEL_NAME: &str = "rf-model";

/// Execute the train command.
///
/// Featurizes the CSV, fits a forest on the training partition, evaluates
/// on the held-out partition, and records model, params, and metrics as a
/// new tracking run.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    data: &Path,
    store_root: &Path,
    label: &str,
    drop: Vec<String>,
    n_trees: usize,
    max_depth: usize,
    seed: u64,
    test_fraction: f64,
) -> anyhow::Result<()> {
    let frame = Frame::read_csv(data)?;
    println!(
        "Loaded {} rows x {} columns from {}",
        frame.n_rows(),
        frame.n_cols(),
        data.display()
    );

    let drop = if drop.is_empty() { vec!["zipcode".to_string()] } else { drop };
    let options = PrepareOptions {
        label_column: label.to_string(),
        currency_columns: vec![label.to_string()],
        drop_columns: drop,
    };
    let prepared = prepare(&frame, &options)?;
    let split = train_test_split(&prepared, test_fraction, seed)?;

    let params = ForestParams { n_trees, max_depth, seed, ..ForestParams::default() };
    let forest = ForestRegressor::fit(
        split.x_train.view(),
        split.y_train.view(),
        &prepared.feature_names,
        &params,
    )?;
    let predictions = forest.predict(split.x_test.view())?;
    let eval = evaluate(&split.y_test.to_vec(), &predictions);

    let store = TrackingStore::open(store_root)?;
    let mut run = store.start_run(MODEL_NAME)?;
    let uri = run.log_model(&ModelArtifact::Forest(forest), MODEL_NAME)?;
    run.log_param("n_trees", n_trees);
    run.log_param("max_depth", max_depth);
    run.log_param("seed", seed);
    run.log_metric("mse", eval.mse);
    run.log_metric("mae", eval.mae);
    run.log_metric("r2", eval.r2);
    let run_id = run.finish()?;

    println!();
    println!("{}", "✓ Training run recorded".green().bold());
    println!("Run ID:    {run_id}");
    println!("Model URI: {uri}");
    println!("mse: {:.4}  mae: {:.4}  r2: {:.4}", eval.mse, eval.mae, eval.r2);
    Ok(())
}
