use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors raised by the table, dataset and matching layers.
#[derive(Debug, Error)]
pub enum ZtError {
    /// Unexpected or missing column, or input tables that do not line up.
    #[error("schema error: {0}")]
    Schema(String),

    /// A column lookup on a table that does not carry it.
    #[error("schema error: missing column '{0}'")]
    MissingColumn(String),

    /// Table rows do not form a complete, duplicate-free n x t grid.
    #[error("data shape error: {0}")]
    DataShape(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, ZtError>;
