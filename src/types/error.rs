use thiserror::Error;

/// tokdash error types
#[derive(Error, Debug)]
pub enum TokdashError {
    /// Input had no header/data rows, or every data row was rejected
    #[error("no valid records found")]
    NoValidRecords,

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Date range with start after end
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Failed to parse a user-supplied value
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type alias for tokdash
pub type Result<T> = std::result::Result<T, TokdashError>;
