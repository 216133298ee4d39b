//! Wrap command implementation.

use colored::Colorize;
use nightrate_core::ModelArtifact;
use nightrate_tracking::{ModelUri, TrackingStore};
use std::path::Path;

/// Artifact name the wrapped model is logged under.
pub const MODEL_NAME: &str = "final-model";

/// Execute the wrap command.
///
/// Loads a recorded model, decorates it with the per-person step, and
/// records the wrapped model as a new run so it has its own URI.
pub fn execute(store_root: &Path, model_uri: &str, occupancy_column: &str) -> anyhow::Result<()> {
    let store = TrackingStore::open(store_root)?;
    let uri: ModelUri = model_uri.parse()?;
    let base = store.load_model(&uri)?;

    let wrapped = ModelArtifact::per_person(base, occupancy_column);

    let mut run = store.start_run(MODEL_NAME)?;
    let wrapped_uri = run.log_model(&wrapped, MODEL_NAME)?;
    run.log_param("base_model_uri", uri);
    run.log_param("occupancy_column", occupancy_column);
    run.finish()?;

    println!("{}", "✓ Wrapped model recorded".green().bold());
    println!("Model URI: {wrapped_uri}");
    Ok(())
}
