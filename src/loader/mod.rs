//! Sales dataset loading.
//!
//! Reads a JSON array of sales records into memory, preserving the order
//! they appear in the file.

use crate::error::ReportError;
use crate::models::SaleRecord;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the sales records stored at `path`.
pub fn load_data(path: &Path) -> Result<Vec<SaleRecord>, ReportError> {
    debug!("Reading sales data from {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| ReportError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_data(&content).map_err(|source| ReportError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse sales records from an in-memory JSON document.
pub fn parse_data(content: &str) -> Result<Vec<SaleRecord>, serde_json::Error> {
    serde_json::from_str(content)
}
