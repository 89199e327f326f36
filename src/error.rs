use thiserror::Error;

/// Convenient result alias for the distance analyzer library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The header row did not match the expected columns (after trimming).
    #[error("{table} header mismatch.\nExpected:\n{expected:?}\nGot:\n{actual:?}")]
    HeaderMismatch {
        table: &'static str,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// The input had no header row at all.
    #[error("{table} has no headers.")]
    EmptyHeaders { table: &'static str },

    /// A scan was requested before one of its input tables was loaded.
    #[error("{table} is not loaded")]
    MissingTable { table: &'static str },

    /// The scan observed a cancellation request at a chunk boundary.
    #[error("analysis cancelled")]
    Cancelled,

    /// The background worker died before producing a result.
    #[error("analysis aborted: {0}")]
    ScanAborted(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
