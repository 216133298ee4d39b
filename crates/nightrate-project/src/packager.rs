//! Model packaging.
//!
//! A packaged project is a directory a separate process can use without the
//! training code:
//!
//! ```text
//! <target>/model.json      serialized ModelArtifact
//! <target>/project.toml    descriptor: entry point, parameters, command
//! <target>/runtime.toml    tool/version/format pins from packaging time
//! <target>/predict.sh      self-contained entry script
//! ```
//!
//! Packaging owns the target directory: it must be absent or empty, unless
//! the caller explicitly opts into overwriting prior contents.

use crate::error::{ProjectError, ProjectResult};
use nightrate_core::ModelArtifact;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const MODEL_FILE: &str = "model.json";
pub const PROJECT_FILE: &str = "project.toml";
pub const RUNTIME_FILE: &str = "runtime.toml";
pub const SCRIPT_FILE: &str = "predict.sh";

/// Name of the entry point every packaged project exposes.
pub const ENTRY_POINT: &str = "predict";

/// The tool token the command template starts with; the runner resolves it
/// to the running executable.
pub const TOOL_NAME: &str = "nightrate";

/// Current on-disk model format. Bumped when `model.json` changes shape.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub name: String,
    /// Remove prior contents of a non-empty target instead of failing.
    pub overwrite: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self { name: "nightrate-project".to_string(), overwrite: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub kind: String,
    #[serde(default)]
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Shell-style command template with `{param}` placeholders.
    pub command: String,
    pub parameters: BTreeMap<String, ParameterSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub name: String,
    pub entry_points: BTreeMap<String, EntryPoint>,
}

impl ProjectDescriptor {
    pub fn entry_point(&self, name: &str) -> ProjectResult<&EntryPoint> {
        self.entry_points.get(name).ok_or_else(|| {
            ProjectError::Descriptor(format!("no entry point {name:?} in descriptor"))
        })
    }
}

/// Version pins recorded at packaging time, checked before running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeManifest {
    pub tool: String,
    pub version: String,
    pub model_format: u32,
}

impl RuntimeManifest {
    #[must_use]
    pub fn current() -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_format: MODEL_FORMAT_VERSION,
        }
    }
}

fn string_param() -> ParameterSpec {
    ParameterSpec { kind: "string".to_string(), default: String::new() }
}

fn predict_entry_point() -> EntryPoint {
    EntryPoint {
        command: format!(
            "{TOOL_NAME} predict --model-path {{model_path}} --input-path {{input_path}} --output-path {{output_path}}"
        ),
        parameters: BTreeMap::from([
            ("model_path".to_string(), string_param()),
            ("input_path".to_string(), string_param()),
            ("output_path".to_string(), string_param()),
        ]),
    }
}

fn entry_script() -> String {
    format!(
        "#!/bin/sh\n\
         # Predict nightly rates with the packaged model.\n\
         # Usage: predict.sh <model-path> <input-csv> <output-csv>\n\
         set -eu\n\
         exec {TOOL_NAME} predict --model-path \"$1\" --input-path \"$2\" --output-path \"$3\"\n"
    )
}

/// Serialize `model` and its sidecar files into `target`.
pub fn package_model(
    model: &ModelArtifact,
    target: &Path,
    options: &PackageOptions,
) -> ProjectResult<()> {
    prepare_target_dir(target, options.overwrite)?;

    model.save(&target.join(MODEL_FILE))?;

    let descriptor = ProjectDescriptor {
        name: options.name.clone(),
        entry_points: BTreeMap::from([(ENTRY_POINT.to_string(), predict_entry_point())]),
    };
    std::fs::write(target.join(PROJECT_FILE), toml::to_string_pretty(&descriptor)?)?;
    std::fs::write(
        target.join(RUNTIME_FILE),
        toml::to_string_pretty(&RuntimeManifest::current())?,
    )?;
    std::fs::write(target.join(SCRIPT_FILE), entry_script())?;

    tracing::info!(target = %target.display(), name = %options.name, "packaged model");
    Ok(())
}

fn prepare_target_dir(target: &Path, overwrite: bool) -> ProjectResult<()> {
    if target.exists() {
        let occupied = std::fs::read_dir(target)?.next().is_some();
        if occupied {
            if !overwrite {
                return Err(ProjectError::TargetDirNotEmpty(target.to_path_buf()));
            }
            std::fs::remove_dir_all(target)?;
        }
    }
    std::fs::create_dir_all(target)?;
    Ok(())
}

pub fn read_descriptor(project_dir: &Path) -> ProjectResult<ProjectDescriptor> {
    let path = project_dir.join(PROJECT_FILE);
    if !path.exists() {
        return Err(ProjectError::Descriptor(format!(
            "{} not found in {}",
            PROJECT_FILE,
            project_dir.display()
        )));
    }
    Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
}

pub fn read_runtime_manifest(project_dir: &Path) -> ProjectResult<RuntimeManifest> {
    let path = project_dir.join(RUNTIME_FILE);
    if !path.exists() {
        return Err(ProjectError::Descriptor(format!(
            "{} not found in {}",
            RUNTIME_FILE,
            project_dir.display()
        )));
    }
    Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
}
