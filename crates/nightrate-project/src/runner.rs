//! Running a packaged project.
//!
//! Two invocation styles with equivalent output:
//! - in-process: call the inference entry point directly and capture the
//!   outcome for assertion-style checks;
//! - out-of-process: resolve the descriptor's command template and spawn it,
//!   blocking until the child exits.

use crate::error::{ProjectError, ProjectResult};
use crate::infer::predict_to_csv;
use crate::packager::{read_descriptor, EntryPoint, ENTRY_POINT, TOOL_NAME};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The three parameters of the `predict` entry point.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub model_path: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl RunParams {
    /// Key/value form, as the out-of-process runner passes them.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("model_path".to_string(), self.model_path.display().to_string()),
            ("input_path".to_string(), self.input_path.display().to_string()),
            ("output_path".to_string(), self.output_path.display().to_string()),
        ])
    }
}

/// What an invocation did: exit code zero on success, otherwise the error
/// text that would have reached the terminal.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub error: Option<String>,
}

impl RunOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Invoke the entry point directly, capturing failure instead of
/// propagating it.
#[must_use]
pub fn run_in_process(params: &RunParams) -> RunOutcome {
    match predict_to_csv(&params.model_path, &params.input_path, &params.output_path) {
        Ok(_) => RunOutcome { exit_code: 0, error: None },
        Err(e) => RunOutcome { exit_code: 1, error: Some(e.to_string()) },
    }
}

/// Run a packaged project out-of-process: substitute the parameters into
/// the descriptor's command template, spawn it, and block until it exits.
pub fn run_project(
    project_dir: &Path,
    params: &BTreeMap<String, String>,
) -> ProjectResult<RunOutcome> {
    let descriptor = read_descriptor(project_dir)?;
    let entry = descriptor.entry_point(ENTRY_POINT)?;
    let argv = substitute_command(entry, params)?;

    let (program, args) = argv.split_first().ok_or_else(|| {
        ProjectError::Descriptor("entry point command is empty".to_string())
    })?;
    let program = resolve_tool(program);
    let command_line = argv.join(" ");

    tracing::info!(command = %command_line, project = %project_dir.display(), "running project");
    let output = std::process::Command::new(&program)
        .args(args)
        .current_dir(project_dir)
        .output()?;

    if !output.status.success() {
        return Err(ProjectError::CommandFailed {
            command: command_line,
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(RunOutcome { exit_code: 0, error: None })
}

/// Expand the command template into argv tokens. The template is tokenized
/// first and `{param}` placeholders substituted per token, so a parameter
/// value containing spaces stays a single argument.
fn substitute_command(
    entry: &EntryPoint,
    params: &BTreeMap<String, String>,
) -> ProjectResult<Vec<String>> {
    for name in params.keys() {
        if !entry.parameters.contains_key(name) {
            return Err(ProjectError::Parameter {
                name: name.clone(),
                reason: "not declared by the entry point".to_string(),
            });
        }
    }

    let argv = entry
        .command
        .split_whitespace()
        .map(|token| {
            let mut token = token.to_string();
            for (name, spec) in &entry.parameters {
                let placeholder = format!("{{{name}}}");
                let value = params.get(name).map_or(spec.default.as_str(), String::as_str);
                token = token.replace(&placeholder, value);
            }
            token
        })
        .collect();
    Ok(argv)
}

/// Resolve the tool token of a command template. When the running
/// executable is the tool itself, use its concrete path so packaged
/// projects work without an installed binary on PATH.
fn resolve_tool(program: &str) -> PathBuf {
    if program == TOOL_NAME {
        if let Ok(exe) = std::env::current_exe() {
            if is_tool_exe(&exe) {
                return exe;
            }
        }
    }
    PathBuf::from(program)
}

/// True only for an executable whose file stem is exactly the tool name;
/// a prefix match would also capture unrelated binaries such as test
/// harnesses.
fn is_tool_exe(exe: &Path) -> bool {
    exe.file_stem() == Some(std::ffi::OsStr::new(TOOL_NAME))
}
