//! Nightrate Project
//!
//! Packaging and execution of trained models:
//! - `packager`: serialize a model plus descriptor, runtime manifest, and
//!   entry script into a self-contained project directory
//! - `infer`: the load/read/predict/write entry point
//! - `runner`: invoke a packaged project in-process or out-of-process
//! - `multistep`: the two-run artifact handoff unit

pub mod error;
pub mod infer;
pub mod multistep;
pub mod packager;
pub mod runner;

pub use error::{ProjectError, ProjectResult};
pub use infer::predict_to_csv;
pub use multistep::{run_multistep, StepOutcome, StepParams};
pub use packager::{
    package_model, read_descriptor, read_runtime_manifest, EntryPoint, PackageOptions,
    ParameterSpec, ProjectDescriptor, RuntimeManifest, MODEL_FILE, PROJECT_FILE, RUNTIME_FILE,
    SCRIPT_FILE,
};
pub use runner::{run_in_process, run_project, RunOutcome, RunParams};
