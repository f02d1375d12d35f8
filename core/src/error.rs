use thiserror::Error;

use crate::types::Msisdn;

#[derive(Error, Debug)]
pub enum RecError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("MSISDN {msisdn} not found in dataset")]
    NotFound { msisdn: Msisdn },

    #[error("No subscriber records available for selection")]
    EmptyDataset,

    #[error("Model service error: {0}")]
    ExternalService(String),

    #[error("Model call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RecError {
    /// True for failures caused by operator input rather than the environment.
    /// The runner uses this to decide between a usage hint and a plain error.
    pub fn is_operator_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::NotFound { .. } | Self::EmptyDataset
        )
    }
}

pub type RecResult<T> = Result<T, RecError>;
