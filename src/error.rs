//! Error types for the report pipeline.
//!
//! Every stage of the pipeline returns [`ReportError`]; the binary wraps it in
//! `anyhow` at the edge. Nothing recovers locally: any error aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by one of the pipeline stages.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The sales data file could not be read.
    #[error("failed to read sales data from {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sales data file is not a valid list of records.
    #[error("sales data in {} is malformed", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// There are no records to summarize.
    #[error("sales dataset contains no records")]
    EmptyDataset,

    /// A price string could not be read as a currency amount.
    #[error("record {id} has an invalid price: {raw:?}")]
    Format { id: u64, raw: String },

    /// The PDF report could not be produced.
    #[error("failed to render report to {}: {message}", path.display())]
    Render { path: PathBuf, message: String },

    /// A sender or receiver address is not a valid mailbox.
    #[error("invalid email address {address:?}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// The attachment could not be read or typed.
    #[error("failed to attach {}: {message}", path.display())]
    Attachment { path: PathBuf, message: String },

    /// The message builder rejected the email.
    #[error("failed to compose report email")]
    Compose(#[from] lettre::error::Error),

    /// The SMTP transport failed to deliver the email.
    #[error("failed to send report email to {receiver}")]
    Send {
        receiver: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

impl ReportError {
    /// Returns true for failures that happen while loading the dataset.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ReportError::Load { .. } | ReportError::Parse { .. } | ReportError::EmptyDataset
        )
    }
}
