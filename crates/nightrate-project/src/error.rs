use std::path::PathBuf;
use thiserror::Error;

pub type ProjectResult<T> = std::result::Result<T, ProjectError>;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("target directory {0:?} is not empty (pass overwrite to replace it)")]
    TargetDirNotEmpty(PathBuf),

    #[error("project descriptor error: {0}")]
    Descriptor(String),

    #[error("invalid parameter {name:?}: {reason}")]
    Parameter { name: String, reason: String },

    #[error("command {command:?} exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error(transparent)]
    Core(#[from] nightrate_core::CoreError),

    #[error(transparent)]
    Tracking(#[from] nightrate_tracking::TrackingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("toml serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
