//! Run-project command implementation.

use anyhow::Context;
use colored::Colorize;
use nightrate_project::run_project;
use std::collections::BTreeMap;
use std::path::Path;

/// Execute the run-project command: out-of-process invocation of a
/// packaged project with key=value parameters.
pub fn execute(project_dir: &Path, params: &[String]) -> anyhow::Result<()> {
    let mut map = BTreeMap::new();
    for pair in params {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("parameter {pair:?} is not of the form key=value"))?;
        map.insert(key.to_string(), value.to_string());
    }

    let outcome = run_project(project_dir, &map)?;
    println!(
        "{}",
        format!("✓ Project run finished (exit code {})", outcome.exit_code).green().bold()
    );
    Ok(())
}
