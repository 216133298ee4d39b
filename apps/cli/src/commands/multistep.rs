//! Multistep command implementation.

use nightrate_project::{run_multistep, StepParams};
use nightrate_tracking::TrackingStore;
use std::path::{Path, PathBuf};

/// Execute the multistep command and print the structured outcome as JSON
/// for whatever invoked this unit.
pub fn execute(
    data: &Path,
    store_root: &Path,
    scratch: Option<PathBuf>,
    n_estimators: &str,
    learning_rate: &str,
    max_depth: &str,
) -> anyhow::Result<()> {
    // The three parameters arrive as strings; this is their one validation
    // point.
    let params = StepParams::from_strings(n_estimators, learning_rate, max_depth)?;

    let scratch =
        scratch.unwrap_or_else(|| std::env::temp_dir().join("nightrate_artifact_downloads"));
    let store = TrackingStore::open(store_root)?;
    let outcome = run_multistep(&store, data, &params, &scratch)?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
