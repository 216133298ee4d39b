use thiserror::Error;

pub type TrackingResult<T> = std::result::Result<T, TrackingError>;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("artifact not found: {0}")]
    ArtifactMissing(String),

    #[error("invalid model uri {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error(transparent)]
    Core(#[from] nightrate_core::CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
