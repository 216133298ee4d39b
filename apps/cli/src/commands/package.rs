//! Package command implementation.

use colored::Colorize;
use nightrate_project::{package_model, PackageOptions};
use nightrate_tracking::{ModelUri, TrackingStore};
use std::path::Path;

/// Execute the package command.
pub fn execute(
    store_root: &Path,
    model_uri: &str,
    target: &Path,
    overwrite: bool,
    name: &str,
) -> anyhow::Result<()> {
    let store = TrackingStore::open(store_root)?;
    let uri: ModelUri = model_uri.parse()?;
    let model = store.load_model(&uri)?;

    let options = PackageOptions { name: name.to_string(), overwrite };
    package_model(&model, target, &options)?;

    println!("{}", "✓ Project packaged".green().bold());
    println!("Target: {}", target.display());
    Ok(())
}
