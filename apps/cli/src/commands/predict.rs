//! Predict command implementation: the packaged project's entry point.

use nightrate_project::predict_to_csv;
use std::path::Path;

/// Execute the predict command. Any failure propagates and exits non-zero.
pub fn execute(model_path: &Path, input_path: &Path, output_path: &Path) -> anyhow::Result<()> {
    let rows = predict_to_csv(model_path, input_path, output_path)?;
    println!("Wrote {rows} predictions to {}", output_path.display());
    Ok(())
}
