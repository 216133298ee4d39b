use thiserror::Error;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid currency value {value:?} in column {column:?}: {reason}")]
    Currency {
        column: String,
        value: String,
        reason: String,
    },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("occupancy error: {0}")]
    Occupancy(String),

    #[error("dataset is empty after preparation")]
    EmptyDataset,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
